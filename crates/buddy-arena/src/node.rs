// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tree cells and the slab that owns them.
//!
//! Every node of the buddy tree lives in a slot of a [`NodeTree`]. Edges
//! are slot indices: a node owns its children (destroying a node destroys
//! its subtree), while the parent index is a plain back-reference used only
//! to walk upward during coalescing.
//!
//! ```text
//!               [0, 1024) Split            slot 0 (root, never released)
//!              /                \
//!     [0, 512) Split          (absent)     absent half == implicitly free
//!      /          \
//! [0, 256) Occ   (absent)
//! ```
//!
//! Slots are recycled through a free list. Each slot carries a generation
//! counter that is bumped whenever its node is released, so a
//! [`NodeHandle`] held by a caller can be checked for staleness in O(1).

use serde::Serialize;
use std::fmt;

/// Slot index of the root node.
pub(crate) const ROOT: u32 = 0;

/// The state of a single tree cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeState {
    /// The whole range is available.
    Free,
    /// The range is divided between two halves, at least one of which is
    /// materialized.
    Split,
    /// The range backs a live allocation. Occupied nodes have no children.
    Occupied,
}

impl NodeState {
    /// Returns a short lowercase name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Split => "split",
            Self::Occupied => "occupied",
        }
    }
}

/// Which half of a parent a child covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Identifies the arena a handle was issued by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArenaId(pub(crate) u64);

/// A stable, non-owning reference to a node of a specific arena.
///
/// Handles are embedded in every [`Allocation`](crate::Allocation) so that
/// releasing it needs no search. A handle stays valid until its node is
/// released; afterwards the arena rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeHandle {
    pub(crate) arena: ArenaId,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}@{}", self.index, self.generation, self.arena.0)
    }
}

/// A single tree cell covering `[offset, offset + size)`.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) state: NodeState,
    pub(crate) offset: usize,
    pub(crate) size: usize,
    pub(crate) left: Option<u32>,
    pub(crate) right: Option<u32>,
    /// Absent only for the root.
    pub(crate) parent: Option<u32>,
}

impl Node {
    /// Creates the root cell spanning `[0, size)`.
    fn root(size: usize) -> Self {
        Self {
            state: NodeState::Free,
            offset: 0,
            size,
            left: None,
            right: None,
            parent: None,
        }
    }

    /// Returns the size each half of this node would have.
    ///
    /// Floor division: an odd-sized node loses its last unit when split.
    pub(crate) fn half(&self) -> usize {
        self.size / 2
    }

    /// Returns the offset at which the given half begins.
    pub(crate) fn child_offset(&self, side: Side) -> usize {
        match side {
            Side::Left => self.offset,
            Side::Right => self.offset + self.half(),
        }
    }

    pub(crate) fn child(&self, side: Side) -> Option<u32> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn child_slot(&mut self, side: Side) -> &mut Option<u32> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Slab owning every materialized node of one arena.
#[derive(Debug, Clone)]
pub(crate) struct NodeTree {
    slots: Vec<Slot>,
    /// Indices of empty slots available for reuse.
    vacant: Vec<u32>,
    live: usize,
}

impl NodeTree {
    /// Creates a tree whose root spans `[0, size)`.
    pub(crate) fn new(size: usize) -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::root(size)),
            }],
            vacant: Vec::new(),
            live: 1,
        }
    }

    /// Number of materialized nodes, root included.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn get(&self, index: u32) -> Option<&Node> {
        self.slots.get(index as usize)?.node.as_ref()
    }

    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut Node> {
        self.slots.get_mut(index as usize)?.node.as_mut()
    }

    /// Returns the node at `index`, which the caller knows to be live.
    ///
    /// # Panics
    /// Panics if the slot is empty; that would mean a tree link points at a
    /// released node.
    pub(crate) fn node(&self, index: u32) -> &Node {
        match self.get(index) {
            Some(node) => node,
            None => panic!("tree link to released slot {index}"),
        }
    }

    pub(crate) fn node_mut(&mut self, index: u32) -> &mut Node {
        match self.get_mut(index) {
            Some(node) => node,
            None => panic!("tree link to released slot {index}"),
        }
    }

    pub(crate) fn generation(&self, index: u32) -> Option<u32> {
        self.slots.get(index as usize).map(|slot| slot.generation)
    }

    /// Invalidates every outstanding handle to the node at `index`
    /// without releasing it.
    pub(crate) fn bump_generation(&mut self, index: u32) {
        if let Some(slot) = self.slots.get_mut(index as usize) {
            slot.generation = slot.generation.wrapping_add(1);
        }
    }

    /// Materializes the given half of `parent` as a `Free` node and links
    /// it into the parent's child slot.
    pub(crate) fn materialize(&mut self, parent: u32, side: Side) -> u32 {
        let (offset, size) = {
            let p = self.node(parent);
            (p.child_offset(side), p.half())
        };
        let node = Node {
            state: NodeState::Free,
            offset,
            size,
            left: None,
            right: None,
            parent: Some(parent),
        };

        let index = match self.vacant.pop() {
            Some(index) => {
                self.slots[index as usize].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.live += 1;

        *self.node_mut(parent).child_slot(side) = Some(index);
        tracing::trace!(index, offset, size, ?side, "node materialized");
        index
    }

    /// Destroys the subtree rooted at `index`, children first, and
    /// detaches it from its parent. Returns the number of nodes released.
    ///
    /// The root itself is never released: destroying it only drops its
    /// children and resets it to `Free`.
    pub(crate) fn destroy(&mut self, index: u32) -> usize {
        let mut released = self.destroy_children(index);

        let parent = self.node(index).parent;
        match parent {
            Some(parent) => {
                let p = self.node_mut(parent);
                if p.left == Some(index) {
                    p.left = None;
                } else if p.right == Some(index) {
                    p.right = None;
                }
                self.release_slot(index);
                released += 1;
            }
            None => {
                self.node_mut(index).state = NodeState::Free;
            }
        }
        released
    }

    /// Destroys every descendant of `index`, leaving the node in place.
    pub(crate) fn destroy_children(&mut self, index: u32) -> usize {
        let mut released = 0;
        let mut stack: Vec<u32> = Vec::new();
        {
            let node = self.node_mut(index);
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            stack.extend(node.left);
            stack.extend(node.right);
            self.release_slot(current);
            released += 1;
        }
        released
    }

    fn release_slot(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        if slot.node.take().is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            self.vacant.push(index);
            self.live -= 1;
        }
    }
}
