// SPDX-License-Identifier: MIT
//! Project file/version store (SQLite, WAL mode).
//!
//! The pipeline itself only ever *reads* — one [`ProjectSource::get_project_files`]
//! call per inbound message.  The write helpers exist for the surrounding web
//! application (and for tests) to seed and update project state.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::project::{FileInfo, ProjectSnapshot};

/// How many recent version descriptions are replayed to the classifier as
/// `previous_prompts`.
pub const DEFAULT_PROMPT_LIMIT: i64 = 5;

// ─── Row types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    /// Legacy single-blob code column.  Empty string when the project uses
    /// discrete file records instead.
    pub code: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectFileRow {
    pub id: String,
    pub project_id: String,
    pub path: String,
    pub content: String,
    pub updated_at: i64,
}

// ─── ProjectSource ────────────────────────────────────────────────────────────

/// The one external capability the classifier depends on.
///
/// Implemented by [`Storage`]; tests substitute an in-memory fake so the
/// classifier can be exercised without SQLite.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Return the project's current file snapshot plus the most recent
    /// version descriptions (newest first, capped), or `None` if the
    /// project does not exist.
    async fn get_project_files(&self, project_id: &str) -> Result<Option<ProjectSnapshot>>;
}

// ─── Storage ──────────────────────────────────────────────────────────────────

pub struct Storage {
    pool: SqlitePool,
    prompt_limit: i64,
}

impl Storage {
    /// Open (or create) the database at `db_path` and run migrations.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self {
            pool,
            prompt_limit: DEFAULT_PROMPT_LIMIT,
        })
    }

    /// In-memory database for tests.  A single connection is pinned —
    /// every pooled connection to `sqlite::memory:` would otherwise get
    /// its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self {
            pool,
            prompt_limit: DEFAULT_PROMPT_LIMIT,
        })
    }

    /// Override the `previous_prompts` cap (default 5).
    pub fn with_prompt_limit(mut self, limit: i64) -> Self {
        self.prompt_limit = limit.max(0);
        self
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    // ─── Reads ────────────────────────────────────────────────────────────────

    /// Snapshot lookup backing [`ProjectSource`].
    ///
    /// Falls back to synthesizing a single `index.html` record from the
    /// legacy code blob when a project has no discrete file rows, so
    /// downstream consumers always see the current output when one exists.
    pub async fn get_project_files(&self, project_id: &str) -> Result<Option<ProjectSnapshot>> {
        let project: Option<ProjectRow> = sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(project) = project else {
            return Ok(None);
        };

        let rows: Vec<ProjectFileRow> =
            sqlx::query_as("SELECT * FROM project_files WHERE project_id = ? ORDER BY path ASC")
                .bind(project_id)
                .fetch_all(&self.pool)
                .await?;

        let mut files: Vec<FileInfo> = rows
            .into_iter()
            .map(|r| FileInfo::new(r.path, r.content, from_unixepoch(r.updated_at)))
            .collect();

        if files.is_empty() && !project.code.trim().is_empty() {
            files.push(FileInfo::new(
                "index.html",
                project.code,
                from_unixepoch(project.updated_at),
            ));
        }

        let prompts: Vec<(String,)> = sqlx::query_as(
            "SELECT description FROM project_versions \
             WHERE project_id = ? AND description IS NOT NULL \
             ORDER BY created_at DESC, rowid DESC \
             LIMIT ?",
        )
        .bind(project_id)
        .bind(self.prompt_limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ProjectSnapshot {
            files,
            previous_prompts: prompts.into_iter().map(|(d,)| d).collect(),
        }))
    }

    // ─── Writes (used by the web app and by tests) ────────────────────────────

    pub async fn create_project(&self, name: &str) -> Result<ProjectRow> {
        let id = Uuid::new_v4().to_string();
        let now = unixepoch();
        sqlx::query(
            "INSERT INTO projects (id, name, code, created_at, updated_at) \
             VALUES (?, ?, '', ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        let row: ProjectRow = sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Replace the legacy single-blob code column.
    pub async fn set_code_blob(&self, project_id: &str, code: &str) -> Result<()> {
        let rows = sqlx::query("UPDATE projects SET code = ?, updated_at = ? WHERE id = ?")
            .bind(code)
            .bind(unixepoch())
            .bind(project_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if rows == 0 {
            anyhow::bail!("PROJECT_NOT_FOUND: {}", project_id);
        }
        Ok(())
    }

    /// Insert or update one file record.
    pub async fn upsert_file(&self, project_id: &str, path: &str, content: &str) -> Result<()> {
        let now = unixepoch();
        sqlx::query(
            "INSERT INTO project_files (id, project_id, path, content, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(project_id, path) \
             DO UPDATE SET content = excluded.content, updated_at = excluded.updated_at",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(project_id)
        .bind(path)
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record a generation version.  `description` is the natural-language
    /// prompt that produced it; `None` for system-initiated versions.
    pub async fn record_version(&self, project_id: &str, description: Option<&str>) -> Result<()> {
        sqlx::query(
            "INSERT INTO project_versions (id, project_id, description, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(project_id)
        .bind(description)
        .bind(unixepoch())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectSource for Storage {
    async fn get_project_files(&self, project_id: &str) -> Result<Option<ProjectSnapshot>> {
        Storage::get_project_files(self, project_id).await
    }
}

fn unixepoch() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn from_unixepoch(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::FileType;

    #[tokio::test]
    async fn test_unknown_project_returns_none() {
        let s = Storage::in_memory().await.unwrap();
        let snapshot = s.get_project_files("no-such-id").await.unwrap();
        assert!(snapshot.is_none());
    }

    #[tokio::test]
    async fn test_file_rows_round_trip_ordered_by_path() {
        let s = Storage::in_memory().await.unwrap();
        let p = s.create_project("Site").await.unwrap();
        s.upsert_file(&p.id, "style.css", "body {}").await.unwrap();
        s.upsert_file(&p.id, "index.html", "<html></html>").await.unwrap();

        let snap = s.get_project_files(&p.id).await.unwrap().unwrap();
        assert_eq!(snap.files.len(), 2);
        assert_eq!(snap.files[0].path, "index.html");
        assert_eq!(snap.files[0].file_type, FileType::Html);
        assert_eq!(snap.files[1].path, "style.css");
    }

    #[tokio::test]
    async fn test_upsert_replaces_content() {
        let s = Storage::in_memory().await.unwrap();
        let p = s.create_project("Site").await.unwrap();
        s.upsert_file(&p.id, "index.html", "v1").await.unwrap();
        s.upsert_file(&p.id, "index.html", "v2").await.unwrap();

        let snap = s.get_project_files(&p.id).await.unwrap().unwrap();
        assert_eq!(snap.files.len(), 1);
        assert_eq!(snap.files[0].content, "v2");
    }

    #[tokio::test]
    async fn test_code_blob_fallback_synthesizes_index_html() {
        let s = Storage::in_memory().await.unwrap();
        let p = s.create_project("Simple").await.unwrap();
        s.set_code_blob(&p.id, "<html><body>hi</body></html>")
            .await
            .unwrap();

        let snap = s.get_project_files(&p.id).await.unwrap().unwrap();
        assert_eq!(snap.files.len(), 1);
        assert_eq!(snap.files[0].path, "index.html");
        assert_eq!(snap.files[0].content, "<html><body>hi</body></html>");
    }

    #[tokio::test]
    async fn test_discrete_files_win_over_blob() {
        let s = Storage::in_memory().await.unwrap();
        let p = s.create_project("Mixed").await.unwrap();
        s.set_code_blob(&p.id, "<html>old blob</html>").await.unwrap();
        s.upsert_file(&p.id, "app/page.tsx", "export default ...")
            .await
            .unwrap();

        let snap = s.get_project_files(&p.id).await.unwrap().unwrap();
        assert_eq!(snap.files.len(), 1);
        assert_eq!(snap.files[0].path, "app/page.tsx");
    }

    #[tokio::test]
    async fn test_empty_project_has_empty_file_set() {
        let s = Storage::in_memory().await.unwrap();
        let p = s.create_project("Blank").await.unwrap();
        let snap = s.get_project_files(&p.id).await.unwrap().unwrap();
        assert!(snap.files.is_empty());
        assert!(snap.previous_prompts.is_empty());
    }

    #[tokio::test]
    async fn test_previous_prompts_capped_and_newest_first() {
        let s = Storage::in_memory().await.unwrap();
        let p = s.create_project("History").await.unwrap();
        for i in 1..=7 {
            s.record_version(&p.id, Some(&format!("prompt {i}")))
                .await
                .unwrap();
        }
        s.record_version(&p.id, None).await.unwrap();

        let snap = s.get_project_files(&p.id).await.unwrap().unwrap();
        assert_eq!(snap.previous_prompts.len(), 5);
        assert_eq!(snap.previous_prompts[0], "prompt 7");
        assert_eq!(snap.previous_prompts[4], "prompt 3");
    }

    #[tokio::test]
    async fn test_open_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let s = Storage::open(&dir.path().join("buildflow.db")).await.unwrap();
        let p = s.create_project("OnDisk").await.unwrap();
        s.upsert_file(&p.id, "index.html", "<html></html>").await.unwrap();
        let snap = s.get_project_files(&p.id).await.unwrap().unwrap();
        assert_eq!(snap.files.len(), 1);
    }
}
