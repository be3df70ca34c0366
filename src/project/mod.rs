// SPDX-License-Identifier: MIT
//! Project data model — the read-only snapshot the pipeline operates on.
//!
//! Every inbound chat message gets a fresh snapshot of the target project's
//! files.  Nothing in this module is persisted or mutated; the snapshot is
//! built by the storage layer, consumed by the classifier and composer, and
//! dropped when the request completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse file classification derived from the extension.
///
/// Drives base-prompt selection (full-stack vs static site) and the
/// priority ordering of the context-window budgeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Html,
    Css,
    Js,
    Json,
    Typescript,
    Other,
}

/// Map a logical path to its [`FileType`].
///
/// The table is fixed: `html`/`htm` → Html, `css` → Css, `js`/`jsx` → Js,
/// `ts`/`tsx` → Typescript, `json` → Json, anything else → Other.
pub fn file_type_for_path(path: &str) -> FileType {
    let ext = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => FileType::Html,
        "css" => FileType::Css,
        "js" | "jsx" => FileType::Js,
        "ts" | "tsx" => FileType::Typescript,
        "json" => FileType::Json,
        _ => FileType::Other,
    }
}

/// Base name of a logical path (everything after the last `/`).
pub fn filename_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// One source file belonging to a project, as the pipeline sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Base name, derived from `path`.
    pub filename: String,
    /// Full logical path, unique within a project.
    pub path: String,
    /// Complete textual content.  May be large.
    pub content: String,
    pub last_modified: DateTime<Utc>,
    #[serde(rename = "type")]
    pub file_type: FileType,
}

impl FileInfo {
    /// Build a `FileInfo`, deriving `filename` and `file_type` from the path.
    pub fn new(path: impl Into<String>, content: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        let path = path.into();
        Self {
            filename: filename_of(&path).to_owned(),
            file_type: file_type_for_path(&path),
            path,
            content: content.into(),
            last_modified,
        }
    }

    /// Base name with the extension stripped (`index.html` → `index`).
    /// Used by the classifier's existing-feature-reference check.
    pub fn stem(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.filename)
    }
}

/// What the project store returns for one classification call: the current
/// file records plus the last few version descriptions, most recent first.
#[derive(Debug, Clone, Default)]
pub struct ProjectSnapshot {
    pub files: Vec<FileInfo>,
    pub previous_prompts: Vec<String>,
}

// ─── Tests ────────────────────────────────────────────────────────────────────
