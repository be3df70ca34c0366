// SPDX-License-Identifier: MIT
//! Core configuration — tunable ceilings and caps.
//!
//! Loaded from a TOML file by the surrounding application; every field has
//! a default so an empty (or missing) `[core]` table is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::prompt::{SYSTEM_LISTING_CEILING, USER_MESSAGE_CEILING};
use crate::storage::DEFAULT_PROMPT_LIMIT;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Character ceiling for the file listing embedded in the system prompt.
    pub system_listing_ceiling: usize,
    /// Character ceiling for the user-message variant.
    pub user_message_ceiling: usize,
    /// How many prior prompts the store replays to the classifier.
    pub previous_prompt_limit: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            system_listing_ceiling: SYSTEM_LISTING_CEILING,
            user_message_ceiling: USER_MESSAGE_CEILING,
            previous_prompt_limit: DEFAULT_PROMPT_LIMIT as usize,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl CoreConfig {
    /// Parse from a TOML string.  Unknown keys are ignored; missing keys
    /// fall back to defaults.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
