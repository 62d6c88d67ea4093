// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `buddy inspect` command: show how a request would be placed.
//!
//! Performs the allocation against a throwaway arena and prints the block,
//! the descent depth, and the rounding overhead.

use buddy_arena::{ArenaConfig, Region};

/// Where a request lands in a fresh arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub region: Region,
    pub depth: u32,
    pub nodes: usize,
}

/// Places `request` in a fresh arena built from `config`. Returns `None`
/// without building an arena when the request cannot fit.
pub fn place(config: &ArenaConfig, request: usize) -> anyhow::Result<Option<Placement>> {
    let size = config.parse_size()?;
    let Some((_, depth)) = buddy_arena::block_for_request(size.as_bytes(), request) else {
        tracing::debug!(request, arena_size = size.as_bytes(), "request does not fit");
        return Ok(None);
    };

    let mut arena = config.build()?;
    let a = arena.alloc(request)?;
    Ok(Some(Placement {
        region: a.region(),
        depth,
        nodes: arena.node_count(),
    }))
}

pub fn execute(config: ArenaConfig, request: usize) -> anyhow::Result<()> {
    let size = config.parse_size()?;
    println!("  Arena:     {size} ({} bytes)", size.as_bytes());
    println!("  Request:   {request} bytes");

    let Some(placement) = place(&config, request)? else {
        println!("  Result:    does not fit");
        return Ok(());
    };

    let block = placement.region.size;
    let waste = block - request;
    println!(
        "  Block:     {} ({block} bytes, depth {})",
        placement.region, placement.depth
    );
    println!(
        "  Overhead:  {waste} bytes ({:.1}% of block)",
        waste as f64 / block as f64 * 100.0
    );
    println!("  Nodes:     {} materialized", placement.nodes);
    if !size.is_power_of_two() {
        println!("  Note:      arena size is not a power of two; odd splits lose their last unit");
    }
    Ok(())
}
