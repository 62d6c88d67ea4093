// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the buddy arena.

use crate::node::NodeHandle;

/// Errors that can occur while creating, allocating from, or releasing
/// into a [`BuddyArena`](crate::BuddyArena).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// No free region large enough for the request exists.
    #[error("no space: requested {requested} bytes, largest free region is {largest_free} bytes")]
    NoSpace {
        requested: usize,
        largest_free: usize,
    },

    /// Attempted to create an arena spanning zero bytes.
    #[error("cannot create a zero-sized arena")]
    ZeroSizedArena,

    /// Attempted to allocate a zero-sized region.
    #[error("cannot allocate zero-sized region")]
    ZeroSizedAllocation,

    /// The handle does not refer to a live occupied node of this arena.
    ///
    /// Raised for double frees, handles whose node was already released,
    /// and handles issued by a different arena.
    #[error("invalid allocation handle {handle}: {reason}")]
    InvalidHandle {
        handle: NodeHandle,
        reason: &'static str,
    },

    /// A human-readable size string could not be parsed.
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}
