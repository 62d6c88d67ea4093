// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # buddy-arena
//!
//! A buddy-algorithm allocator over a virtual address range. It hands out
//! `(offset, size)` sub-ranges of `[0, N)` without touching any memory, so
//! it can sit in front of an externally owned resource such as a GPU heap,
//! a memory-mapped file or a bump arena.
//!
//! # Key Components
//!
//! - [`BuddyArena`] — the allocator. `alloc` descends from the root,
//!   halving free blocks until the request fits; `free` walks back up,
//!   merging free buddies.
//! - [`Allocation`] — the granted region plus a [`NodeHandle`] that makes
//!   release O(depth) with no search.
//! - [`ArenaSize`] — human-readable sizes (`"64K"`, `"1M"`).
//! - [`ArenaConfig`] — TOML configuration.
//! - [`ArenaStats`] — cumulative counters (failures, splits, merges, peak
//!   occupancy, internal fragmentation).
//!
//! # Tree Model
//!
//! ```text
//! alloc(30) on a 1024-byte arena:
//!
//!   [0,1024) split
//!     [0,512) split
//!       [0,256) split
//!         [0,128) split
//!           [0,64) split
//!             [0,32) occupied   ◄── Allocation { offset: 0, size: 32 }
//!             (absent)          ◄── implicitly free buddy
//! ```
//!
//! Halves are materialized only when a descent enters them. An absent half
//! and a free leaf mean the same thing, and coalescing restores the absent
//! form as soon as both buddies are free.
//!
//! # Example
//! ```
//! use buddy_arena::{ArenaError, BuddyArena};
//!
//! let mut arena = BuddyArena::new(1024).unwrap();
//!
//! let whole = arena.alloc(1024).unwrap();
//! assert!(matches!(arena.alloc(1), Err(ArenaError::NoSpace { .. })));
//!
//! // Releasing is optional; dropping the arena invalidates everything.
//! arena.free(whole).unwrap();
//! assert_eq!(arena.alloc(1).unwrap().offset, 0);
//! ```

mod arena;
mod config;
mod error;
mod node;
mod size;
mod stats;

pub use arena::{block_for_request, Allocation, BuddyArena, Region, DEFAULT_LABEL};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use node::{ArenaId, NodeHandle, NodeState};
pub use size::ArenaSize;
pub use stats::ArenaStats;
