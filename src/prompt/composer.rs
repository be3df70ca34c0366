// SPDX-License-Identifier: MIT
//! Prompt composer — turns a classification verdict into the exact
//! instruction text sent to the generation service.
//!
//! Pure: no I/O, no shared state.  The composer reads canned text from
//! [`templates`](super::templates), embeds the budgeted file listing from
//! [`listing`](super::listing), and selects one of four generation modes
//! by change scope.

use crate::config::CoreConfig;
use crate::intelligence::{ChangeScope, IterationContext};
use crate::project::{FileInfo, FileType};
use crate::prompt::listing::format_file_listing;
use crate::prompt::templates::{
    FULLSTACK_BASE_PROMPT, LARGE_CHANGE_MODE, MEDIUM_CHANGE_MODE, NEW_PROJECT_MODE, OUTPUT_FORMAT,
    SMALL_CHANGE_MODE, STATIC_SITE_BASE_PROMPT,
};

// ─── Feature summary ──────────────────────────────────────────────────────────

/// Domain keyword → capability label, scanned over prior prompts.  Table
/// order is emission order; labels are deduplicated.
const FEATURE_KEYWORDS: &[(&[&str], &str)] = &[
    (&["auth", "login", "sign in", "sign up", "signup"], "User authentication"),
    (&["dashboard"], "Dashboard interface"),
    (&["database", "storage", "persist"], "Data persistence"),
    (&["api", "endpoint"], "API endpoints"),
    (&["contact", "form"], "Contact form"),
    (&["blog", "article"], "Blog functionality"),
    (&["portfolio", "showcase"], "Portfolio showcase"),
];

/// Reconstruct a bullet list of previously implemented capability from the
/// stored prompt history, giving the generation service continuity context
/// without re-sending full history.  Empty string when nothing matches.
pub fn summarize_features(previous_prompts: &[String]) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for &(keywords, label) in FEATURE_KEYWORDS {
        let mentioned = previous_prompts.iter().any(|p| {
            let p = p.to_lowercase();
            keywords.iter().any(|kw| p.contains(kw))
        });
        if mentioned && !lines.contains(&label) {
            lines.push(label);
        }
    }
    if lines.is_empty() {
        return String::new();
    }
    let mut out = String::from("PREVIOUSLY IMPLEMENTED FEATURES:\n");
    for label in lines {
        out.push_str("- ");
        out.push_str(label);
        out.push('\n');
    }
    out
}

// ─── Base-prompt selection ────────────────────────────────────────────────────

/// Does the existing file set look like a full-stack project rather than a
/// plain static site?  TypeScript sources, a Prisma schema, a package
/// manifest, or app/lib/prisma directory paths all qualify.
fn is_fullstack(files: &[FileInfo]) -> bool {
    files.iter().any(|f| {
        f.file_type == FileType::Typescript
            || f.path.ends_with(".prisma")
            || f.filename == "package.json"
            || f.path.starts_with("app/")
            || f.path.starts_with("lib/")
            || f.path.starts_with("prisma/")
    })
}

// ─── Composer ─────────────────────────────────────────────────────────────────

pub struct PromptComposer {
    base_override: Option<String>,
    listing_ceiling: usize,
}

impl PromptComposer {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            base_override: None,
            listing_ceiling: config.system_listing_ceiling,
        }
    }

    /// Replace the canned foundation prompt (both variants) with a custom one.
    pub fn with_base_prompt(mut self, base: impl Into<String>) -> Self {
        self.base_override = Some(base.into());
        self
    }

    fn base_prompt(&self, ctx: &IterationContext) -> &str {
        if let Some(base) = &self.base_override {
            return base;
        }
        // Only meaningful once files exist; brand-new generation always
        // starts from the static-site prompt.
        if is_fullstack(&ctx.existing_files) {
            FULLSTACK_BASE_PROMPT
        } else {
            STATIC_SITE_BASE_PROMPT
        }
    }

    /// Assemble the system prompt for one generation call.
    pub fn system_prompt(&self, ctx: &IterationContext) -> String {
        let base = self.base_prompt(ctx);
        match ctx.change_scope {
            ChangeScope::New => format!("{base}\n\n{NEW_PROJECT_MODE}"),
            ChangeScope::Small => self.iteration_prompt(base, SMALL_CHANGE_MODE, ctx, false),
            ChangeScope::Medium => self.iteration_prompt(base, MEDIUM_CHANGE_MODE, ctx, true),
            ChangeScope::Large => self.iteration_prompt(base, LARGE_CHANGE_MODE, ctx, false),
        }
    }

    fn iteration_prompt(
        &self,
        base: &str,
        mode: &str,
        ctx: &IterationContext,
        with_feature_summary: bool,
    ) -> String {
        let mut out = String::with_capacity(base.len() + mode.len() + 1024);
        out.push_str(base);
        out.push_str("\n\n");
        out.push_str(mode);
        if with_feature_summary {
            let summary = summarize_features(&ctx.previous_prompts);
            if !summary.is_empty() {
                out.push_str("\n\n");
                out.push_str(&summary);
            }
        }
        out.push_str("\n\nCURRENT PROJECT FILES:\n");
        out.push_str(&format_file_listing(&ctx.existing_files, self.listing_ceiling));
        out.push_str("\n\n");
        out.push_str(OUTPUT_FORMAT);
        out
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn file(path: &str) -> FileInfo {
        FileInfo::new(path, "content", Utc::now())
    }

    fn ctx(scope: ChangeScope, files: Vec<FileInfo>, prompts: &[&str]) -> IterationContext {
        IterationContext {
            is_iteration: scope != ChangeScope::New,
            project_id: Some("p1".into()),
            existing_files: files,
            change_scope: scope,
            previous_prompts: prompts.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn composer() -> PromptComposer {
        PromptComposer::new(&CoreConfig::default())
    }

    #[test]
    fn new_mode_has_no_file_context() {
        let mut c = ctx(ChangeScope::New, vec![], &[]);
        c.project_id = None;
        let prompt = composer().system_prompt(&c);
        assert!(prompt.contains("NEW PROJECT MODE"));
        assert!(!prompt.contains("CURRENT PROJECT FILES"));
        assert!(!prompt.contains("OUTPUT FORMAT"));
        assert!(prompt.starts_with(STATIC_SITE_BASE_PROMPT));
    }

    #[test]
    fn small_mode_embeds_files_and_output_contract() {
        let c = ctx(ChangeScope::Small, vec![file("index.html")], &[]);
        let prompt = composer().system_prompt(&c);
        assert!(prompt.contains("SMALL CHANGE MODE"));
        assert!(prompt.contains("=== FILE: index.html ==="));
        assert!(prompt.contains("OUTPUT FORMAT (mandatory)"));
        assert!(!prompt.contains("NEW PROJECT MODE"));
    }

    #[test]
    fn medium_mode_carries_feature_summary() {
        let c = ctx(
            ChangeScope::Medium,
            vec![file("index.html"), file("about.html")],
            &["build a portfolio site"],
        );
        let prompt = composer().system_prompt(&c);
        assert!(prompt.contains("FEATURE ADDITION MODE"));
        assert!(prompt.contains("- Portfolio showcase"));
        assert!(prompt.contains("OUTPUT FORMAT (mandatory)"));
    }

    #[test]
    fn medium_mode_without_history_has_no_summary_block() {
        let c = ctx(ChangeScope::Medium, vec![file("index.html")], &[]);
        let prompt = composer().system_prompt(&c);
        assert!(!prompt.contains("PREVIOUSLY IMPLEMENTED FEATURES"));
    }

    #[test]
    fn large_mode_instructs_read_plan_execute() {
        let c = ctx(ChangeScope::Large, vec![file("index.html")], &[]);
        let prompt = composer().system_prompt(&c);
        assert!(prompt.contains("LARGE CHANGE MODE"));
        assert!(prompt.contains("plan"));
        assert!(prompt.contains("OUTPUT FORMAT (mandatory)"));
    }

    #[test]
    fn fullstack_files_select_fullstack_base() {
        for path in ["app/page.tsx", "lib/db.ts", "prisma/schema.prisma", "package.json"] {
            let c = ctx(ChangeScope::Small, vec![file(path)], &[]);
            let prompt = composer().system_prompt(&c);
            assert!(
                prompt.starts_with(FULLSTACK_BASE_PROMPT),
                "{path} should select the full-stack base prompt"
            );
        }
    }

    #[test]
    fn static_files_select_static_base() {
        let c = ctx(
            ChangeScope::Small,
            vec![file("index.html"), file("style.css"), file("app.js")],
            &[],
        );
        let prompt = composer().system_prompt(&c);
        assert!(prompt.starts_with(STATIC_SITE_BASE_PROMPT));
    }

    #[test]
    fn base_override_replaces_canned_prompt() {
        let c = ctx(ChangeScope::Small, vec![file("index.html")], &[]);
        let prompt = composer()
            .with_base_prompt("You are a pirate developer.")
            .system_prompt(&c);
        assert!(prompt.starts_with("You are a pirate developer."));
        assert!(!prompt.contains("expert web developer"));
    }

    #[test]
    fn feature_summary_deduplicates() {
        let prompts = vec![
            "add a login page".to_string(),
            "improve the login flow with oauth".to_string(),
            "add a blog".to_string(),
        ];
        let summary = summarize_features(&prompts);
        assert_eq!(summary.matches("User authentication").count(), 1);
        assert!(summary.contains("- Blog functionality"));
    }

    #[test]
    fn feature_summary_empty_without_matches() {
        let prompts = vec!["hello there".to_string()];
        assert_eq!(summarize_features(&prompts), "");
    }
}
