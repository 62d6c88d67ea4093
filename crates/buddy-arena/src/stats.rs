// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for profiling and diagnostics.
//!
//! [`ArenaStats`] tracks cumulative counters about how an arena is being
//! used: request outcomes, tree churn (splits and merges) and how many
//! bytes were lost to rounding requests up to block sizes.

/// Cumulative statistics about arena usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ArenaStats {
    /// Total number of allocation requests, successful or not.
    pub total_requests: u64,
    /// Number of requests that produced an allocation.
    pub successful_allocations: u64,
    /// Number of requests that failed with `NoSpace`.
    pub no_space_count: u64,
    /// Number of allocations released.
    pub total_frees: u64,
    /// Number of `free` calls rejected because the handle was invalid.
    pub rejected_frees: u64,
    /// Nodes materialized while descending.
    pub splits: u64,
    /// Nodes destroyed while coalescing.
    pub merges: u64,
    /// Bytes covered by live allocations (block sizes, not request sizes).
    pub occupied_bytes: usize,
    /// Bytes asked for by every successful request.
    pub cumulative_requested_bytes: u64,
    /// Bytes granted to every successful request (block sizes).
    pub cumulative_granted_bytes: u64,
    /// High-water mark of `occupied_bytes`.
    pub peak_occupied_bytes: usize,
    /// Total size of the arena.
    pub arena_bytes: usize,
}

impl ArenaStats {
    pub(crate) fn new(arena_bytes: usize) -> Self {
        Self {
            arena_bytes,
            ..Self::default()
        }
    }

    /// Returns the fraction of the arena currently occupied, in `[0.0, 1.0]`.
    pub fn utilisation(&self) -> f64 {
        if self.arena_bytes == 0 {
            return 0.0;
        }
        self.occupied_bytes as f64 / self.arena_bytes as f64
    }

    /// Returns the fraction of granted bytes lost to rounding requests up
    /// to block sizes, over every successful request so far.
    pub fn internal_fragmentation(&self) -> f64 {
        if self.cumulative_granted_bytes == 0 {
            return 0.0;
        }
        let wasted = self.cumulative_granted_bytes - self.cumulative_requested_bytes;
        wasted as f64 / self.cumulative_granted_bytes as f64
    }

    /// Returns the fraction of requests that failed, in `[0.0, 1.0]`.
    pub fn failure_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.no_space_count as f64 / self.total_requests as f64
    }

    pub(crate) fn record_allocation(&mut self, requested: usize, block: usize) {
        self.total_requests += 1;
        self.successful_allocations += 1;
        self.occupied_bytes += block;
        self.cumulative_requested_bytes += requested as u64;
        self.cumulative_granted_bytes += block as u64;
        if self.occupied_bytes > self.peak_occupied_bytes {
            self.peak_occupied_bytes = self.occupied_bytes;
        }
    }

    pub(crate) fn record_no_space(&mut self) {
        self.total_requests += 1;
        self.no_space_count += 1;
    }

    pub(crate) fn record_free(&mut self, block: usize) {
        self.total_frees += 1;
        self.occupied_bytes = self.occupied_bytes.saturating_sub(block);
    }

    pub(crate) fn record_rejected_free(&mut self) {
        self.rejected_frees += 1;
    }

    pub(crate) fn record_splits(&mut self, count: u64) {
        self.splits += count;
    }

    pub(crate) fn record_merges(&mut self, count: u64) {
        self.merges += count;
    }

    /// Drops everything live, keeping the cumulative counters.
    pub(crate) fn clear_live(&mut self) {
        self.occupied_bytes = 0;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Requests: {} ({} ok, {} no-space), {} frees ({} rejected), \
             {} splits, {} merges, occupied {} / {} bytes ({:.1}%), \
             peak {} bytes, internal fragmentation {:.1}%",
            self.total_requests,
            self.successful_allocations,
            self.no_space_count,
            self.total_frees,
            self.rejected_frees,
            self.splits,
            self.merges,
            self.occupied_bytes,
            self.arena_bytes,
            self.utilisation() * 100.0,
            self.peak_occupied_bytes,
            self.internal_fragmentation() * 100.0,
        )
    }
}
