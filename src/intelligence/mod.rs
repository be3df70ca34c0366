// SPDX-License-Identifier: MIT
//! Message intelligence — decides, for every inbound chat message, whether
//! the user is starting a new project or editing an existing one, and at
//! what scope.
//!
//! This is Stage 0 of the generation pipeline: the verdict produced here
//! (an [`iteration::IterationContext`]) drives which system prompt the
//! composer builds and how much existing file context it embeds.

pub mod iteration;

pub use iteration::{classify_scope, detect_iteration, ChangeScope, IterationContext};
