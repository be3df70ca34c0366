// SPDX-License-Identifier: MIT
//! Iteration classifier — pure keyword heuristic, no LLM calls.
//!
//! Given a user message and an optional project id, decide whether the
//! request targets the existing project body of code (an *iteration*) or
//! starts fresh, and size the requested change (small / medium / large).
//!
//! Decision order, first match wins:
//!   1. No project, or empty file set → new project.
//!   2. Explicit new-project phrase → new project, even with files present.
//!   3. Edit-intent keyword → iteration.
//!   4. Reference to an existing file or component → iteration.
//!   5. Neither → new project.  A positive signal is *required*; the mere
//!      presence of files is never sufficient.
//!
//! The keyword sets are data-driven constant tables so they can be tuned
//! and tested without touching control flow.  Matching is substring-based
//! on the lowercased message.

use serde::Serialize;
use tracing::{debug, warn};

use crate::project::FileInfo;
use crate::storage::ProjectSource;

// ─── Keyword tables ───────────────────────────────────────────────────────────

/// Unambiguous "start fresh" phrasing.  Deliberately conservative: plain
/// "make" or "please" must never land here — a looser list caused
/// systematic misclassification before and was tightened.
const NEW_PROJECT_PHRASES: &[&str] = &[
    "start from scratch",
    "start over",
    "new project",
    "new site",
    "new website",
    "build me a",
    "build me an",
    "create a",
    "create an",
    "make me a",
    "make me an",
    "write a",
    "write an",
    "generate a",
    "generate an",
    "from the ground up",
];

/// Edit-intent verbs and phrases.
const ITERATION_KEYWORDS: &[&str] = &[
    "modify",
    "update",
    "change",
    "edit",
    "fix",
    "adjust",
    "tweak",
    "improve",
    "remove",
    "delete",
    "rename",
    "move",
    "replace",
    "refactor",
    "restyle",
    "rearrange",
    "redesign",
    "rebuild",
    "rewrite",
    "overhaul",
    "revamp",
    "add to",
    "add a",
    "add an",
    "add the",
    "make the",
    "make it",
    "instead of",
];

/// Generic references to parts of the current output.
const COMPONENT_REFERENCES: &[&str] = &[
    "the header",
    "the footer",
    "the navbar",
    "the nav",
    "the sidebar",
    "the button",
    "the form",
    "the menu",
    "the layout",
    "the page",
    "this page",
    "the site",
    "the website",
    "the app",
    "existing",
    "current",
];

/// Indicators of a broad rework.  Checked before the small indicators —
/// "completely redesign the buttons" is still a large change.
const LARGE_SCOPE_KEYWORDS: &[&str] = &[
    "redesign",
    "rebuild",
    "rewrite",
    "from scratch",
    "overhaul",
    "revamp",
    "entire",
    "whole",
    "completely",
    "all pages",
    "all the pages",
];

/// Indicators of a cosmetic or single-element touch-up.  Includes the
/// common page parts: recoloring "the header" is a small change even
/// though no style word appears.
const SMALL_SCOPE_KEYWORDS: &[&str] = &[
    "button",
    "header",
    "footer",
    "navbar",
    "logo",
    "background",
    "color",
    "colour",
    "css",
    "font",
    "text",
    "spacing",
    "margin",
    "padding",
    "fix",
    "bug",
    "typo",
    "alignment",
    "align",
    "size",
    "icon",
    "link",
    "label",
    "title",
    "heading",
];

// ─── Public types ─────────────────────────────────────────────────────────────

/// Coarse sizing of a requested modification.  Drives how much existing
/// context and how strict a preservation directive the generation prompt
/// carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeScope {
    Small,
    Medium,
    Large,
    New,
}

/// The classifier's verdict, consumed once by the prompt composer.
///
/// Invariants: `change_scope == New` iff `is_iteration == false`, and
/// `existing_files` is non-empty only when iterating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationContext {
    pub is_iteration: bool,
    /// Present only when this is an iteration.
    pub project_id: Option<String>,
    pub existing_files: Vec<FileInfo>,
    pub change_scope: ChangeScope,
    /// Prior prompts, most recent first, capped by the store (last 5).
    pub previous_prompts: Vec<String>,
}

impl IterationContext {
    /// The default verdict for brand-new chats.
    pub fn new_project() -> Self {
        Self {
            is_iteration: false,
            project_id: None,
            existing_files: Vec::new(),
            change_scope: ChangeScope::New,
            previous_prompts: Vec::new(),
        }
    }

    fn new_project_with_history(previous_prompts: Vec<String>) -> Self {
        Self {
            previous_prompts,
            ..Self::new_project()
        }
    }
}

// ─── Classification logic ─────────────────────────────────────────────────────

/// Classify one inbound chat message.
///
/// Never fails: a store lookup error is logged and treated identically to
/// "project not found", degrading to the new-project verdict.  The single
/// await is the read-only snapshot lookup.
pub async fn detect_iteration(
    user_message: &str,
    project_id: Option<&str>,
    store: &dyn ProjectSource,
) -> IterationContext {
    let snapshot = match project_id {
        Some(id) => match store.get_project_files(id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(project_id = id, error = %e, "project lookup failed; treating as new project");
                None
            }
        },
        None => None,
    };

    let Some(snapshot) = snapshot else {
        return IterationContext::new_project();
    };

    if snapshot.files.is_empty() {
        return IterationContext::new_project_with_history(snapshot.previous_prompts);
    }

    let msg = user_message.to_lowercase();

    // Explicit fresh-start phrasing wins over everything, including edit
    // verbs in the same message.  History is retained for continuity.
    if contains_any_phrase(&msg, NEW_PROJECT_PHRASES) {
        debug!("explicit new-project phrase; not an iteration");
        return IterationContext::new_project_with_history(snapshot.previous_prompts);
    }

    let has_edit_verb = contains_any(&msg, ITERATION_KEYWORDS);
    let references_existing = references_existing_feature(&msg, &snapshot.files);

    if !has_edit_verb && !references_existing {
        debug!("no positive iteration signal; treating as new project");
        return IterationContext::new_project_with_history(snapshot.previous_prompts);
    }

    let scope = classify_scope(&msg);
    debug!(
        project_id = project_id.unwrap_or_default(),
        ?scope,
        has_edit_verb,
        references_existing,
        "classified as iteration"
    );

    IterationContext {
        is_iteration: true,
        project_id: project_id.map(str::to_owned),
        existing_files: snapshot.files,
        change_scope: scope,
        previous_prompts: snapshot.previous_prompts,
    }
}

/// Size an iteration request.  Pure; the message is expected lowercased
/// but the function lowercases defensively so it is safe standalone.
pub fn classify_scope(message: &str) -> ChangeScope {
    let msg = message.to_lowercase();
    if contains_any(&msg, LARGE_SCOPE_KEYWORDS) {
        ChangeScope::Large
    } else if contains_any(&msg, SMALL_SCOPE_KEYWORDS) {
        ChangeScope::Small
    } else {
        // Substantive feature additions land here.
        ChangeScope::Medium
    }
}

fn contains_any(msg: &str, table: &[&str]) -> bool {
    table.iter().any(|kw| msg.contains(kw))
}

/// Like [`contains_any`], but the match must start on a word boundary:
/// "rewrite a section" must not fire the "write a" phrase.
fn contains_any_phrase(msg: &str, table: &[&str]) -> bool {
    table.iter().any(|phrase| {
        msg.match_indices(phrase).any(|(at, _)| {
            at == 0
                || msg[..at]
                    .chars()
                    .next_back()
                    .is_some_and(|c| !c.is_alphanumeric())
        })
    })
}

/// True when the message names an existing file (extension-stripped base
/// name) or uses a generic component-reference phrase.
fn references_existing_feature(msg: &str, files: &[FileInfo]) -> bool {
    let names_file = files.iter().any(|f| {
        let stem = f.stem().to_lowercase();
        !stem.is_empty() && msg.contains(&stem)
    });
    names_file || contains_any(msg, COMPONENT_REFERENCES)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
