// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # buddy
//!
//! Command-line driver for the buddy-arena allocator.
//!
//! ## Usage
//! ```bash
//! # Replay a sequence of operations against a fresh arena
//! buddy run --size 1K --ops alloc:30,alloc:30,free:0,free:1,alloc:64
//!
//! # Same, with the arena described by a TOML file
//! buddy --config arena.toml run --ops alloc:100,alloc:300
//!
//! # Show where a request would land in a fresh arena
//! buddy inspect --size 1K --request 30
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "buddy",
    about = "Buddy allocator over a virtual address range",
    version
)]
struct Cli {
    /// Path to a TOML arena configuration (used when --size is absent).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay alloc/free operations and print placements, tree and stats.
    Run {
        /// Arena size (e.g., "1024", "64K", "1M").
        #[arg(short, long)]
        size: Option<String>,

        /// Comma-separated operations: `alloc:<bytes>` or `free:<k>`, where
        /// k is the index of the k-th successful allocation.
        #[arg(short, long)]
        ops: String,

        /// Print final statistics as JSON instead of a summary line.
        #[arg(long)]
        json: bool,
    },

    /// Show the block a request would receive in a fresh arena.
    Inspect {
        /// Arena size (e.g., "1024", "64K", "1M").
        #[arg(short, long)]
        size: Option<String>,

        /// Requested size in bytes.
        #[arg(short, long)]
        request: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { size, ops, json } => {
            let config = commands::resolve_config(cli.config.as_deref(), size)?;
            commands::run::execute(config, &ops, json)
        }
        Commands::Inspect { size, request } => {
            let config = commands::resolve_config(cli.config.as_deref(), size)?;
            commands::inspect::execute(config, request)
        }
    }
}
