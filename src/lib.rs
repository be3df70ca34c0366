// SPDX-License-Identifier: MIT
//! BuildFlow Core — the chat builder's generation pipeline.
//!
//! Two components run in sequence for every inbound chat message:
//!
//! 1. The **iteration classifier** ([`intelligence::detect_iteration`])
//!    reads the project's file snapshot and decides whether the message
//!    starts a new project or edits the existing one, and at what scope.
//! 2. The **prompt composer** ([`prompt::PromptComposer`] plus
//!    [`prompt::build_user_message_with_context`]) turns that verdict into
//!    the `{system_prompt, user_message}` payload for the code-generation
//!    service, embedding existing file contents under a character budget.
//!
//! The actual generation call, response streaming, and persistence of the
//! extracted output files all belong to the calling web application.

pub mod config;
pub mod enhancer;
pub mod intelligence;
pub mod project;
pub mod prompt;
pub mod storage;

pub use config::CoreConfig;
pub use enhancer::{CodeEnhancer, EnhancedCode, EnhancementOptions};
pub use intelligence::{classify_scope, detect_iteration, ChangeScope, IterationContext};
pub use project::{FileInfo, FileType, ProjectSnapshot};
pub use prompt::{build_user_message_with_context, format_file_listing, PromptComposer};
pub use storage::{ProjectSource, Storage};

use serde::Serialize;

/// The one payload this crate produces for the generation service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPayload {
    pub system_prompt: String,
    pub user_message: String,
    /// The verdict the payload was built from, echoed back so the caller
    /// can persist it alongside the generated version.
    pub context: IterationContext,
}

impl GenerationPayload {
    /// JSON form handed to the web layer's generation endpoint.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Run the full pipeline for one inbound chat message.
///
/// Classifier first, composer second; the single await is the project
/// snapshot lookup inside the classifier.  Never fails — degraded lookups
/// produce a new-project payload.
pub async fn build_generation_payload(
    store: &dyn ProjectSource,
    config: &CoreConfig,
    user_message: &str,
    project_id: Option<&str>,
) -> GenerationPayload {
    let ctx = detect_iteration(user_message, project_id, store).await;
    tracing::debug!(
        is_iteration = ctx.is_iteration,
        scope = ?ctx.change_scope,
        files = ctx.existing_files.len(),
        "building generation payload"
    );
    let composer = PromptComposer::new(config);
    let system_prompt = composer.system_prompt(&ctx);
    let user_message =
        build_user_message_with_context(user_message, &ctx, config.user_message_ceiling);
    GenerationPayload {
        system_prompt,
        user_message,
        context: ctx,
    }
}
