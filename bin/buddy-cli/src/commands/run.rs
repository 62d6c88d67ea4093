// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `buddy run` command: replay operations against a fresh arena.
//!
//! Each successful allocation gets the next index (0, 1, 2, ...), which is
//! what `free:<k>` refers to. Failed operations are reported and the replay
//! continues.

use buddy_arena::{Allocation, ArenaConfig};

/// One step of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Alloc(usize),
    Free(usize),
}

/// Parses `alloc:<bytes>,free:<k>,...`. `a` and `f` are accepted as
/// short forms.
pub fn parse_ops(s: &str) -> anyhow::Result<Vec<Op>> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (verb, arg) = item
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("operation '{item}' is missing ':<value>'"))?;
            let value: usize = arg
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("operation '{item}': '{arg}' is not a number"))?;
            match verb.trim().to_lowercase().as_str() {
                "alloc" | "a" => Ok(Op::Alloc(value)),
                "free" | "f" => Ok(Op::Free(value)),
                other => Err(anyhow::anyhow!(
                    "unknown operation '{other}'; expected 'alloc' or 'free'"
                )),
            }
        })
        .collect()
}

pub fn execute(config: ArenaConfig, ops: &str, json: bool) -> anyhow::Result<()> {
    let ops = parse_ops(ops)?;
    tracing::info!(ops = ops.len(), "replaying operations");
    let mut arena = config.build()?;

    println!("  Arena '{}': {}", arena.label(), config.parse_size()?);
    println!();

    let mut handles: Vec<Option<Allocation>> = Vec::new();
    for (step, op) in ops.iter().enumerate() {
        match *op {
            Op::Alloc(size) => match arena.alloc(size) {
                Ok(a) => {
                    println!(
                        "  {step:>3}  alloc {size:<8} -> #{:<3} {} ({} bytes)",
                        handles.len(),
                        a.region(),
                        a.size,
                    );
                    handles.push(Some(a));
                }
                Err(e) => println!("  {step:>3}  alloc {size:<8} -> {e}"),
            },
            Op::Free(k) => match handles.get_mut(k).and_then(Option::take) {
                Some(a) => match arena.free(a) {
                    Ok(()) => println!("  {step:>3}  free  #{k:<7} -> released {}", a.region()),
                    Err(e) => println!("  {step:>3}  free  #{k:<7} -> {e}"),
                },
                None => {
                    tracing::warn!(step, index = k, "free names no live allocation");
                    println!("  {step:>3}  free  #{k:<7} -> no such live allocation");
                }
            },
        }
    }

    println!();
    println!("  Tree:");
    for line in arena.render_tree().lines() {
        println!("   {line}");
    }
    println!();

    let stats = arena.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("  {}", stats.summary());
    }
    Ok(())
}
