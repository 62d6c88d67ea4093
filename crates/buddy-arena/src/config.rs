// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arena configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! size = "1M"
//! label = "gpu-heap"
//! ```

use crate::arena::DEFAULT_LABEL;
use crate::{ArenaError, ArenaSize, BuddyArena};
use std::path::Path;

/// Configuration for a [`BuddyArena`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ArenaConfig {
    /// Size of the managed range (human-readable, e.g. `"64K"`).
    pub size: String,
    /// Name attached to the arena's log events.
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

impl ArenaConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ArenaError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ArenaError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ArenaError> {
        toml::from_str(toml_str)
            .map_err(|e| ArenaError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ArenaError> {
        toml::to_string_pretty(self)
            .map_err(|e| ArenaError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the size string into an [`ArenaSize`].
    pub fn parse_size(&self) -> Result<ArenaSize, ArenaError> {
        ArenaSize::parse(&self.size)
    }

    /// Creates the arena this configuration describes.
    pub fn build(&self) -> Result<BuddyArena, ArenaError> {
        let size = self.parse_size()?;
        BuddyArena::with_label(size.as_bytes(), self.label.clone())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            size: "1M".to_string(),
            label: default_label(),
        }
    }
}
