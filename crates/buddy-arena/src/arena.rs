// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The buddy arena: allocation by descent, release by coalescing.
//!
//! # Allocation
//! A request enters at the root and descends. A free node whose half still
//! fits the request is split and the descent continues into its left half;
//! a free node too small to split is occupied whole; an occupied node, or a
//! split node whose halves are too small, refuses. Split nodes try their
//! left half before their right, materializing a missing half on the spot,
//! which yields deterministic leftmost placement.
//!
//! # Release
//! Freeing an allocation marks its node free and walks upward: a free node
//! is removed from its parent (an absent half is an implicitly free half),
//! and a split node whose halves are both free or absent is collapsed the
//! same way. The walk stops at the first split node that still has an
//! occupied descendant, or at the root, which is reset in place.

use crate::node::{ArenaId, NodeHandle, NodeState, NodeTree, Side, ROOT};
use crate::{ArenaError, ArenaStats};
use std::fmt::{self, Write as _};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Default label attached to log events.
pub const DEFAULT_LABEL: &str = "arena";

/// A contiguous sub-range `[offset, offset + size)` of an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Region {
    pub offset: usize,
    pub size: usize,
}

impl Region {
    /// Returns the first offset past the region, saturating at
    /// `usize::MAX` for hand-built regions that would overflow.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.size)
    }

    /// Returns `true` if the two regions share at least one offset.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.offset, self.end())
    }
}

/// A granted region plus the handle needed to release it.
///
/// `size` is the full size of the block backing the allocation and may
/// exceed the requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Allocation {
    pub offset: usize,
    pub size: usize,
    pub handle: NodeHandle,
}

impl Allocation {
    /// Returns the region this allocation covers.
    pub fn region(&self) -> Region {
        Region {
            offset: self.offset,
            size: self.size,
        }
    }

    /// Returns the first offset past the allocation, saturating at
    /// `usize::MAX`.
    pub fn end(&self) -> usize {
        self.region().end()
    }
}

/// Returns the block size and tree depth a fresh arena of `arena_size`
/// would assign to a request of `requested` bytes, or `None` if the
/// request cannot fit at all.
///
/// ```
/// assert_eq!(buddy_arena::block_for_request(1024, 30), Some((32, 5)));
/// assert_eq!(buddy_arena::block_for_request(1024, 1025), None);
/// ```
pub fn block_for_request(arena_size: usize, requested: usize) -> Option<(usize, u32)> {
    if requested == 0 || requested > arena_size {
        return None;
    }
    let mut size = arena_size;
    let mut depth = 0;
    while size / 2 >= requested {
        size /= 2;
        depth += 1;
    }
    Some((size, depth))
}

/// A buddy allocator over the virtual range `[0, size)`.
///
/// The arena never touches real memory: it only decides which offsets and
/// sizes are handed out, for some external resource (a GPU heap, a mapped
/// file) to back.
///
/// The arena is not internally synchronized; share it across threads
/// behind a lock held for the duration of each call.
///
/// # Example
/// ```
/// use buddy_arena::BuddyArena;
///
/// let mut arena = BuddyArena::new(1024).unwrap();
///
/// let a = arena.alloc(30).unwrap();
/// assert_eq!((a.offset, a.size), (0, 32));
///
/// let b = arena.alloc(30).unwrap();
/// assert_eq!((b.offset, b.size), (32, 32));
///
/// arena.free(a).unwrap();
/// arena.free(b).unwrap();
/// assert!(arena.is_empty());
/// assert_eq!(arena.alloc(1024).unwrap().offset, 0);
/// ```
pub struct BuddyArena {
    id: ArenaId,
    label: String,
    size: usize,
    tree: NodeTree,
    live: usize,
    stats: ArenaStats,
}

impl BuddyArena {
    /// Creates an arena managing `[0, size)`.
    ///
    /// Returns `Err(ZeroSizedArena)` if `size` is zero.
    pub fn new(size: usize) -> Result<Self, ArenaError> {
        Self::with_label(size, DEFAULT_LABEL)
    }

    /// Creates an arena whose log events carry `label`.
    pub fn with_label(size: usize, label: impl Into<String>) -> Result<Self, ArenaError> {
        if size == 0 {
            return Err(ArenaError::ZeroSizedArena);
        }
        let label = label.into();
        let id = ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed));

        tracing::info!(arena = %label, size, "buddy arena created");
        if !size.is_power_of_two() {
            tracing::warn!(
                arena = %label,
                size,
                "arena size is not a power of two; odd splits lose their last unit"
            );
        }

        Ok(Self {
            id,
            label,
            size,
            tree: NodeTree::new(size),
            live: 0,
            stats: ArenaStats::new(size),
        })
    }

    /// Allocates a region of at least `size` bytes.
    ///
    /// The region is the smallest block the tree can carve that fits the
    /// request, placed as far left as possible. Returns `Err(NoSpace)` when
    /// no free block is large enough; the arena is left unchanged.
    pub fn alloc(&mut self, size: usize) -> Result<Allocation, ArenaError> {
        if size == 0 {
            return Err(ArenaError::ZeroSizedAllocation);
        }

        let mut splits = 0;
        let found = self.descend(ROOT, size, &mut splits);
        self.stats.record_splits(splits);

        let Some(index) = found else {
            let largest_free = self.largest_free_block();
            self.stats.record_no_space();
            tracing::warn!(
                arena = %self.label,
                requested = size,
                largest_free,
                "allocation failed: no space"
            );
            return Err(ArenaError::NoSpace {
                requested: size,
                largest_free,
            });
        };

        let node = self.tree.node(index);
        let allocation = Allocation {
            offset: node.offset,
            size: node.size,
            handle: self.handle(index),
        };

        self.live += 1;
        self.stats.record_allocation(size, allocation.size);
        tracing::debug!(
            arena = %self.label,
            offset = allocation.offset,
            size = allocation.size,
            requested = size,
            splits,
            "allocated"
        );
        Ok(allocation)
    }

    /// Releases an allocation and coalesces its block with free buddies.
    ///
    /// Returns `Err(InvalidHandle)` without touching the arena if the
    /// allocation was already freed, belongs to another arena, or does not
    /// describe its node's range.
    pub fn free(&mut self, allocation: Allocation) -> Result<(), ArenaError> {
        let index = match self.resolve(&allocation) {
            Ok(index) => index,
            Err(reason) => {
                self.stats.record_rejected_free();
                tracing::warn!(
                    arena = %self.label,
                    handle = %allocation.handle,
                    reason,
                    "free rejected"
                );
                return Err(ArenaError::InvalidHandle {
                    handle: allocation.handle,
                    reason,
                });
            }
        };

        self.tree.node_mut(index).state = NodeState::Free;
        self.tree.bump_generation(index);
        let merges = self.coalesce(index);

        self.live -= 1;
        self.stats.record_free(allocation.size);
        self.stats.record_merges(merges);
        tracing::debug!(
            arena = %self.label,
            offset = allocation.offset,
            size = allocation.size,
            merges,
            "freed"
        );
        Ok(())
    }

    /// Destroys every node below the root, invalidating all outstanding
    /// allocations. The arena is empty afterwards.
    pub fn reset(&mut self) {
        let released = self.tree.destroy(ROOT);
        self.tree.bump_generation(ROOT);
        self.live = 0;
        self.stats.clear_live();
        tracing::info!(arena = %self.label, released, "buddy arena reset");
    }

    /// Destroys the arena and its whole tree.
    ///
    /// Equivalent to dropping it; every outstanding allocation becomes
    /// meaningless.
    pub fn destroy(self) {
        tracing::debug!(
            arena = %self.label,
            nodes = self.tree.len(),
            live = self.live,
            "buddy arena destroyed"
        );
    }

    /// Returns the total size of the managed range.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the label attached to log events.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the number of live allocations.
    pub fn live_allocations(&self) -> usize {
        self.live
    }

    /// Returns `true` if nothing is allocated.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns the number of bytes covered by live allocations.
    pub fn occupied_bytes(&self) -> usize {
        self.stats.occupied_bytes
    }

    /// Returns the number of bytes not covered by a live allocation.
    ///
    /// For arenas that are not a power of two this includes units that
    /// floor-division splitting makes unreachable.
    pub fn free_bytes(&self) -> usize {
        self.size - self.occupied_bytes()
    }

    /// Returns the number of materialized tree nodes, root included.
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    /// Returns a snapshot of the arena statistics.
    pub fn stats(&self) -> ArenaStats {
        self.stats.clone()
    }

    /// Returns the size of the largest block an allocation could occupy
    /// right now. Any request up to this size succeeds.
    pub fn largest_free_block(&self) -> usize {
        self.largest_free_in(ROOT)
    }

    /// Returns every live allocation's region, sorted by offset.
    pub fn occupied_regions(&self) -> Vec<Region> {
        let mut regions = Vec::with_capacity(self.live);
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            let node = self.tree.node(index);
            match node.state {
                NodeState::Occupied => regions.push(Region {
                    offset: node.offset,
                    size: node.size,
                }),
                NodeState::Split => {
                    // Right first so the left half is visited first.
                    stack.extend(node.right);
                    stack.extend(node.left);
                }
                NodeState::Free => {}
            }
        }
        regions
    }

    /// Returns the state of the node behind `handle`, or `None` if the
    /// handle is stale or belongs to another arena.
    pub fn state_of(&self, handle: NodeHandle) -> Option<NodeState> {
        if handle.arena != self.id || self.tree.generation(handle.index)? != handle.generation {
            return None;
        }
        self.tree.get(handle.index).map(|node| node.state)
    }

    /// Renders the materialized tree, one node per line.
    ///
    /// Halves that have not been materialized are shown as implicitly free.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_node(&mut out, ROOT, 0);
        out
    }

    fn handle(&self, index: u32) -> NodeHandle {
        NodeHandle {
            arena: self.id,
            index,
            generation: self.tree.generation(index).unwrap_or_default(),
        }
    }

    /// Finds a block for `size` below `index`, splitting free nodes on the
    /// way down. Returns the slot of the newly occupied node.
    ///
    /// A failed descent never mutates the tree: every path that splits or
    /// materializes ends in a node at least as large as the request.
    fn descend(&mut self, index: u32, size: usize, splits: &mut u64) -> Option<u32> {
        let (state, node_size, half) = {
            let node = self.tree.node(index);
            (node.state, node.size, node.half())
        };

        match state {
            NodeState::Free => {
                if half >= size {
                    self.tree.node_mut(index).state = NodeState::Split;
                    let left = self.tree.materialize(index, Side::Left);
                    *splits += 1;
                    self.descend(left, size, splits)
                } else if node_size >= size {
                    self.tree.node_mut(index).state = NodeState::Occupied;
                    Some(index)
                } else {
                    None
                }
            }
            NodeState::Split => {
                if half < size {
                    return None;
                }
                for side in [Side::Left, Side::Right] {
                    let child = self.tree.node(index).child(side);
                    match child {
                        Some(child) => {
                            if let Some(found) = self.descend(child, size, splits) {
                                return Some(found);
                            }
                        }
                        None => {
                            let child = self.tree.materialize(index, side);
                            *splits += 1;
                            return self.descend(child, size, splits);
                        }
                    }
                }
                None
            }
            NodeState::Occupied => None,
        }
    }

    /// Walks upward from a just-freed node, destroying free nodes and
    /// collapsing split nodes whose halves are all free or absent.
    /// Returns the number of nodes released.
    fn coalesce(&mut self, start: u32) -> u64 {
        let mut released = 0;
        let mut current = start;

        loop {
            let (state, parent) = {
                let node = self.tree.node(current);
                (node.state, node.parent)
            };

            match state {
                NodeState::Free => match parent {
                    Some(parent) => {
                        released += self.merge_into_parent(current);
                        current = parent;
                    }
                    None => return released,
                },
                NodeState::Split => {
                    if !self.halves_free(current) {
                        return released;
                    }
                    match parent {
                        Some(parent) => {
                            released += self.merge_into_parent(current);
                            current = parent;
                        }
                        None => {
                            // The root has no parent slot to detach from:
                            // drop its children and reset it in place.
                            released += self.tree.destroy(ROOT) as u64;
                            tracing::debug!(arena = %self.label, "root collapsed");
                            return released;
                        }
                    }
                }
                NodeState::Occupied => return released,
            }
        }
    }

    /// Destroys the non-root node `index`, leaving an absent half in its
    /// parent. Returns the number of nodes released.
    fn merge_into_parent(&mut self, index: u32) -> u64 {
        let (offset, size) = {
            let node = self.tree.node(index);
            (node.offset, node.size)
        };
        let released = self.tree.destroy(index) as u64;
        tracing::debug!(arena = %self.label, offset, size, released, "merged");
        released
    }

    /// Returns `true` if both halves of `index` are absent or free.
    fn halves_free(&self, index: u32) -> bool {
        let node = self.tree.node(index);
        [node.left, node.right]
            .into_iter()
            .flatten()
            .all(|child| self.tree.node(child).state == NodeState::Free)
    }

    /// Maps an allocation back to its node slot, checking that it is a
    /// live occupied node of this arena with the recorded range.
    fn resolve(&self, allocation: &Allocation) -> Result<u32, &'static str> {
        let handle = allocation.handle;
        if handle.arena != self.id {
            return Err("handle was issued by another arena");
        }
        if self.tree.generation(handle.index) != Some(handle.generation) {
            return Err("node was already released");
        }
        let node = self
            .tree
            .get(handle.index)
            .ok_or("node was already released")?;
        if node.state != NodeState::Occupied {
            return Err("node is not occupied");
        }
        if node.offset != allocation.offset || node.size != allocation.size {
            return Err("allocation does not match its node's range");
        }
        Ok(handle.index)
    }

    fn largest_free_in(&self, index: u32) -> usize {
        let node = self.tree.node(index);
        match node.state {
            NodeState::Free => node.size,
            NodeState::Occupied => 0,
            NodeState::Split => [Side::Left, Side::Right]
                .into_iter()
                .map(|side| match node.child(side) {
                    Some(child) => self.largest_free_in(child),
                    None => node.half(),
                })
                .max()
                .unwrap_or(0),
        }
    }

    fn render_node(&self, out: &mut String, index: u32, depth: usize) {
        let node = self.tree.node(index);
        let indent = "  ".repeat(depth);
        let _ = writeln!(
            out,
            "{indent}[{}, {}) {}",
            node.offset,
            node.offset + node.size,
            node.state.as_str()
        );

        if node.state != NodeState::Split {
            return;
        }
        for side in [Side::Left, Side::Right] {
            match node.child(side) {
                Some(child) => self.render_node(out, child, depth + 1),
                None => {
                    let offset = node.child_offset(side);
                    let _ = writeln!(
                        out,
                        "{indent}  [{}, {}) free (implicit)",
                        offset,
                        offset + node.half()
                    );
                }
            }
        }
    }
}

impl fmt::Display for BuddyArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_tree())
    }
}

impl fmt::Debug for BuddyArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuddyArena")
            .field("label", &self.label)
            .field("size", &self.size)
            .field("live_allocations", &self.live)
            .field("nodes", &self.tree.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_arena() {
        assert!(matches!(BuddyArena::new(0), Err(ArenaError::ZeroSizedArena)));
    }

    #[test]
    fn test_zero_sized_allocation() {
        let mut arena = BuddyArena::new(64).unwrap();
        assert!(matches!(arena.alloc(0), Err(ArenaError::ZeroSizedAllocation)));
        assert_eq!(arena.stats().total_requests, 0);
    }

    #[test]
    fn test_descent_halves_until_fit() {
        let mut arena = BuddyArena::new(1024).unwrap();
        let a = arena.alloc(30).unwrap();
        assert_eq!((a.offset, a.size), (0, 32));
        // Root plus 1024→512→256→128→64→32.
        assert_eq!(arena.node_count(), 6);
        assert_eq!(arena.stats().splits, 5);
    }

    #[test]
    fn test_second_allocation_takes_buddy() {
        let mut arena = BuddyArena::new(1024).unwrap();
        arena.alloc(30).unwrap();
        let b = arena.alloc(30).unwrap();
        assert_eq!((b.offset, b.size), (32, 32));
        assert_eq!(arena.node_count(), 7);
    }

    #[test]
    fn test_exact_fit_occupies_root() {
        let mut arena = BuddyArena::new(1024).unwrap();
        let a = arena.alloc(1024).unwrap();
        assert_eq!((a.offset, a.size), (0, 1024));
        assert_eq!(arena.node_count(), 1);
        assert!(matches!(arena.alloc(1), Err(ArenaError::NoSpace { .. })));
    }

    #[test]
    fn test_no_space_reports_largest_free() {
        let mut arena = BuddyArena::new(1024).unwrap();
        arena.alloc(512).unwrap();
        arena.alloc(256).unwrap();
        match arena.alloc(512) {
            Err(ArenaError::NoSpace {
                requested,
                largest_free,
            }) => {
                assert_eq!(requested, 512);
                assert_eq!(largest_free, 256);
            }
            other => panic!("expected NoSpace, got {other:?}"),
        }
        assert_eq!(arena.stats().no_space_count, 1);
    }

    #[test]
    fn test_failed_descent_leaves_tree_unchanged() {
        let mut arena = BuddyArena::new(1024).unwrap();
        arena.alloc(600).unwrap();
        let before = arena.render_tree();
        assert!(arena.alloc(1).is_err());
        assert_eq!(arena.render_tree(), before);
    }

    #[test]
    fn test_left_half_preferred_after_coalescing() {
        let mut arena = BuddyArena::new(1024).unwrap();
        let a = arena.alloc(512).unwrap();
        let b = arena.alloc(256).unwrap();
        assert_eq!(b.offset, 512);

        // Left half collapses back to an absent child.
        arena.free(a).unwrap();
        let c = arena.alloc(256).unwrap();
        assert_eq!(c.offset, 0);
    }

    #[test]
    fn test_free_collapses_to_free_root() {
        let mut arena = BuddyArena::new(1024).unwrap();
        let a = arena.alloc(30).unwrap();
        arena.free(a).unwrap();

        assert!(arena.is_empty());
        assert_eq!(arena.node_count(), 1);
        assert_eq!(arena.largest_free_block(), 1024);
        assert_eq!(arena.render_tree(), "[0, 1024) free\n");
    }

    #[test]
    fn test_partial_coalesce_stops_at_occupied_sibling() {
        let mut arena = BuddyArena::new(1024).unwrap();
        let a = arena.alloc(30).unwrap();
        let b = arena.alloc(30).unwrap();
        arena.free(a).unwrap();

        // `a`'s node is gone; its parent is still split over `b`.
        assert_eq!(arena.node_count(), 6);
        assert_eq!(arena.state_of(b.handle), Some(NodeState::Occupied));
        assert_eq!(arena.occupied_regions(), vec![b.region()]);
        assert_eq!(arena.stats().merges, 1);
    }

    #[test]
    fn test_double_free_rejected() {
        let mut arena = BuddyArena::new(256).unwrap();
        let a = arena.alloc(16).unwrap();
        let _b = arena.alloc(16).unwrap();
        arena.free(a).unwrap();

        let tree = arena.render_tree();
        assert!(matches!(arena.free(a), Err(ArenaError::InvalidHandle { .. })));
        assert_eq!(arena.render_tree(), tree);
        assert_eq!(arena.live_allocations(), 1);
        assert_eq!(arena.stats().rejected_frees, 1);
    }

    #[test]
    fn test_double_free_of_root_rejected() {
        let mut arena = BuddyArena::new(64).unwrap();
        let a = arena.alloc(64).unwrap();
        arena.free(a).unwrap();
        let b = arena.alloc(64).unwrap();

        // Same slot, same range: only the generation tells them apart.
        assert_eq!(a.handle.index, b.handle.index);
        assert!(matches!(arena.free(a), Err(ArenaError::InvalidHandle { .. })));
        assert_eq!(arena.state_of(b.handle), Some(NodeState::Occupied));
        arena.free(b).unwrap();
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut arena = BuddyArena::new(1024).unwrap();
        let a = arena.alloc(100).unwrap();
        arena.free(a).unwrap();
        let b = arena.alloc(100).unwrap();
        assert_eq!(a.region(), b.region());
        assert!(arena.free(a).is_err());
        assert!(arena.free(b).is_ok());
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut first = BuddyArena::new(128).unwrap();
        let mut second = BuddyArena::new(128).unwrap();
        let a = first.alloc(8).unwrap();
        let _ = second.alloc(8).unwrap();

        assert!(matches!(second.free(a), Err(ArenaError::InvalidHandle { .. })));
        assert_eq!(second.live_allocations(), 1);
        first.free(a).unwrap();
    }

    #[test]
    fn test_tampered_allocation_rejected() {
        let mut arena = BuddyArena::new(128).unwrap();
        let mut a = arena.alloc(8).unwrap();
        a.size = 16;
        assert!(arena.free(a).is_err());
    }

    #[test]
    fn test_reset_invalidates_handles() {
        let mut arena = BuddyArena::new(1024).unwrap();
        let a = arena.alloc(64).unwrap();
        let whole = {
            let mut other = BuddyArena::new(32).unwrap();
            other.alloc(32).unwrap()
        };
        arena.reset();

        assert!(arena.is_empty());
        assert_eq!(arena.node_count(), 1);
        assert_eq!(arena.occupied_bytes(), 0);
        assert_eq!(arena.state_of(a.handle), None);
        assert!(arena.free(a).is_err());
        assert!(arena.free(whole).is_err());
        assert_eq!(arena.alloc(1024).unwrap().offset, 0);
    }

    #[test]
    fn test_reset_invalidates_root_allocation() {
        let mut arena = BuddyArena::new(64).unwrap();
        let a = arena.alloc(64).unwrap();
        arena.reset();
        assert!(arena.free(a).is_err());
    }

    #[test]
    fn test_occupied_regions_sorted() {
        let mut arena = BuddyArena::new(1024).unwrap();
        let sizes = [300, 10, 100, 40, 5];
        for s in sizes {
            arena.alloc(s).unwrap();
        }
        let regions = arena.occupied_regions();
        assert_eq!(regions.len(), sizes.len());
        assert!(regions.windows(2).all(|w| w[0].end() <= w[1].offset));
    }

    #[test]
    fn test_render_tree_shows_implicit_halves() {
        let mut arena = BuddyArena::new(8).unwrap();
        arena.alloc(4).unwrap();
        assert_eq!(
            arena.render_tree(),
            "[0, 8) split\n  [0, 4) occupied\n  [4, 8) free (implicit)\n"
        );
        assert_eq!(arena.to_string(), arena.render_tree());
    }

    #[test]
    fn test_accounting() {
        let mut arena = BuddyArena::with_label(1024, "gpu").unwrap();
        assert_eq!(arena.label(), "gpu");
        let a = arena.alloc(100).unwrap();
        arena.alloc(200).unwrap();
        assert_eq!(arena.occupied_bytes(), 128 + 256);
        assert_eq!(arena.free_bytes(), 1024 - 384);
        arena.free(a).unwrap();
        assert_eq!(arena.occupied_bytes(), 256);
        assert_eq!(arena.stats().peak_occupied_bytes, 384);
    }

    #[test]
    fn test_block_for_request() {
        assert_eq!(block_for_request(1024, 30), Some((32, 5)));
        assert_eq!(block_for_request(1024, 1024), Some((1024, 0)));
        assert_eq!(block_for_request(1024, 1), Some((1, 10)));
        assert_eq!(block_for_request(1024, 0), None);
        assert_eq!(block_for_request(5, 2), Some((2, 1)));
    }

    #[test]
    fn test_region_overlap() {
        let a = Region { offset: 0, size: 32 };
        let b = Region { offset: 32, size: 32 };
        let c = Region { offset: 16, size: 32 };
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
        assert_eq!(a.to_string(), "[0, 32)");
    }

    #[test]
    fn test_region_end_saturates() {
        let edge = Region {
            offset: usize::MAX - 4,
            size: 16,
        };
        assert_eq!(edge.end(), usize::MAX);
        assert!(edge.overlaps(&Region {
            offset: usize::MAX - 1,
            size: 1,
        }));

        let mut arena = BuddyArena::new(64).unwrap();
        let mut a = arena.alloc(64).unwrap();
        a.offset = usize::MAX;
        assert_eq!(a.end(), usize::MAX);
        assert!(arena.free(a).is_err());
    }

    #[test]
    fn test_merges_counted_per_level() {
        let mut arena = BuddyArena::new(1024).unwrap();
        let a = arena.alloc(256).unwrap();
        let b = arena.alloc(256).unwrap();
        arena.free(b).unwrap();
        // `b`'s leaf only; its buddy is still occupied.
        assert_eq!(arena.stats().merges, 1);
        arena.free(a).unwrap();
        // `a`'s leaf and the [0, 512) node; the root resets in place.
        assert_eq!(arena.stats().merges, 3);
        assert_eq!(arena.node_count(), 1);
    }

    #[test]
    fn test_debug_format() {
        let arena = BuddyArena::new(64).unwrap();
        let debug = format!("{arena:?}");
        assert!(debug.contains("BuddyArena"));
        assert!(debug.contains("live_allocations"));
    }
}
