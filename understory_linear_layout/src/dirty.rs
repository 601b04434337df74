// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-container dirty tracking.
//!
//! A [`DirtyTracker`] accumulates three kinds of invalidation between
//! rebuilds:
//!
//! - the set of children that reported a change,
//! - container-level axis bits (resize, configuration, structural `IGNORE`),
//! - which axes still need a placement pass.
//!
//! The first two decide how much placement work is needed. The third drives
//! the container's state: it is [`ContainerState::Pending`] until every axis
//! has been placed, at which point all bookkeeping is dropped at once.

use hashbrown::HashSet;

use crate::axis::{Axis, AxisMask};
use crate::tree::NodeId;

/// Coarse lifecycle of a container between rebuilds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContainerState {
    /// Nothing to do.
    #[default]
    Clean,
    /// At least one axis still needs measurement or placement.
    Pending,
}

/// Dirty bookkeeping for one container.
#[derive(Clone, Debug, Default)]
pub struct DirtyTracker {
    dirty_children: HashSet<NodeId>,
    dirty_axis: AxisMask,
    first_dirty_index: Option<usize>,
    pending_placement: AxisMask,
    generation: u64,
}

impl DirtyTracker {
    /// A clean tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ContainerState {
        if self.pending_placement.is_empty() {
            ContainerState::Clean
        } else {
            ContainerState::Pending
        }
    }

    /// Returns `true` while any axis awaits placement.
    #[inline]
    pub fn is_pending(&self) -> bool {
        !self.pending_placement.is_empty()
    }

    /// Returns `true` if `axis` still awaits placement.
    #[inline]
    pub fn is_pending_placement(&self, axis: Axis) -> bool {
        self.pending_placement.has_axis(axis)
    }

    /// Record that `child` changed.
    ///
    /// Any child change can move every later sibling, so both axes become
    /// pending. Returns `true` if the tracker was clean before.
    pub fn mark_child(&mut self, child: NodeId, bits: AxisMask) -> bool {
        let was_clean = !self.is_pending();
        if bits.is_empty() {
            return false;
        }
        self.dirty_children.insert(child);
        self.pending_placement |= AxisMask::AXES;
        self.generation = self.generation.wrapping_add(1);
        was_clean
    }

    /// Mark container-level axes dirty.
    ///
    /// `IGNORE` dirties both axes and forces full placement on each. Returns
    /// `true` if the tracker was clean before.
    pub fn mark_axes(&mut self, bits: AxisMask) -> bool {
        let was_clean = !self.is_pending();
        if bits.is_empty() {
            return false;
        }
        self.dirty_axis |= bits;
        self.pending_placement |= if bits.has_ignore() {
            AxisMask::AXES
        } else {
            bits.axes()
        };
        self.generation = self.generation.wrapping_add(1);
        was_clean
    }

    /// Mark a membership or ordering change.
    pub fn mark_structural(&mut self) -> bool {
        self.first_dirty_index = None;
        self.mark_axes(AxisMask::IGNORE)
    }

    /// Mark everything dirty.
    pub fn mark_all(&mut self) -> bool {
        self.mark_axes(AxisMask::all())
    }

    /// Returns `true` if `child` reported a change since the last completed placement.
    pub fn is_child_dirty(&self, child: NodeId) -> bool {
        self.dirty_children.contains(&child)
    }

    /// Children that reported a change.
    pub fn dirty_children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dirty_children.iter().copied()
    }

    /// Number of dirty children.
    pub fn dirty_child_count(&self) -> usize {
        self.dirty_children.len()
    }

    /// Container-level dirty bits.
    pub fn dirty_axis(&self) -> AxisMask {
        self.dirty_axis
    }

    /// Returns `true` if placement on `axis` must visit every child.
    pub fn needs_full_placement(&self, axis: Axis) -> bool {
        self.dirty_axis.has_ignore() || self.dirty_axis.has_axis(axis)
    }

    /// Active-list index of the earliest dirty child, as of the last
    /// measurement or placement pass.
    pub fn first_dirty_index(&self) -> Option<usize> {
        self.first_dirty_index
    }

    pub(crate) fn set_first_dirty_index(&mut self, index: Option<usize>) {
        self.first_dirty_index = index;
    }

    /// Counter bumped on every accepted mark.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Finish placement on `axis`.
    ///
    /// Returns `true` if that was the last pending axis and the tracker is
    /// now clean.
    pub(crate) fn finish_placement(&mut self, axis: Axis) -> bool {
        self.pending_placement.remove(axis.mask());
        if self.pending_placement.is_empty() {
            self.reset();
            true
        } else {
            false
        }
    }

    /// Drop a detached child.
    pub(crate) fn forget_child(&mut self, child: NodeId) {
        self.dirty_children.remove(&child);
    }

    /// Discard all pending work.
    pub fn clear(&mut self) {
        self.reset();
        self.pending_placement = AxisMask::empty();
    }

    fn reset(&mut self) {
        self.dirty_children.clear();
        self.dirty_axis = AxisMask::empty();
        self.first_dirty_index = None;
    }
}
