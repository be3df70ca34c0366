// SPDX-License-Identifier: MIT
//! Prompt construction — the second half of the pipeline.
//!
//! [`composer::PromptComposer`] builds the system prompt from the
//! classification verdict; [`listing::build_user_message_with_context`]
//! independently builds the augmented user message.  Both are pure.

pub mod composer;
pub mod listing;
pub mod templates;

pub use composer::PromptComposer;
pub use listing::{
    build_user_message_with_context, format_file_listing, SYSTEM_LISTING_CEILING,
    USER_MESSAGE_CEILING,
};
