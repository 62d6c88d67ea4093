// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared setup.

pub mod inspect;
pub mod run;

use buddy_arena::ArenaConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v` flags.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the arena configuration: the file (or defaults), with `size`
/// overriding its size when given.
pub fn resolve_config(path: Option<&Path>, size: Option<String>) -> anyhow::Result<ArenaConfig> {
    let mut config = match path {
        Some(path) => ArenaConfig::from_file(path)?,
        None => ArenaConfig::default(),
    };
    if let Some(size) = size {
        config.size = size;
    }
    let size = config
        .parse_size()
        .map_err(|e| anyhow::anyhow!("invalid arena size '{}': {e}", config.size))?;
    tracing::info!(size = %size, label = %config.label, "arena configuration resolved");
    Ok(config)
}
