// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary between the layout engine and whatever owns real geometry.

use alloc::vec::Vec;

use kurbo::Size;

use crate::axis::Axis;
use crate::feedback::FeedbackQueue;
use crate::place::Placement;
use crate::tree::NodeId;

/// Receives placements computed by a rebuild.
///
/// Placements arrive per axis: one call for the horizontal pass and one for
/// the vertical pass of each written child. Changes the host makes in
/// response (for example text reflow that alters a content size) must go
/// through `feedback`; they are applied after the rebuild and schedule the
/// next one.
pub trait LayoutHost {
    /// Apply `placement` to `node` on `axis`.
    fn write_placement(
        &mut self,
        node: NodeId,
        axis: Axis,
        placement: Placement,
        feedback: &mut FeedbackQueue,
    );
}

/// Discards placements. Useful when only aggregates and stored placements
/// are of interest.
impl LayoutHost for () {
    fn write_placement(&mut self, _: NodeId, _: Axis, _: Placement, _: &mut FeedbackQueue) {}
}

/// One recorded placement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacementRecord {
    /// Placed node.
    pub node: NodeId,
    /// Axis of the pass.
    pub axis: Axis,
    /// What was written.
    pub placement: Placement,
}

/// A host that records every placement in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementLog {
    records: Vec<PlacementRecord>,
}

impl PlacementLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in write order.
    pub fn records(&self) -> &[PlacementRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forget all records.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Most recent placement of `node` on `axis`.
    pub fn last(&self, node: NodeId, axis: Axis) -> Option<Placement> {
        self.records
            .iter()
            .rev()
            .find(|r| r.node == node && r.axis == axis)
            .map(|r| r.placement)
    }

    /// Returns `true` if `node` was written on any axis.
    pub fn wrote(&self, node: NodeId) -> bool {
        self.records.iter().any(|r| r.node == node)
    }
}

impl LayoutHost for PlacementLog {
    fn write_placement(
        &mut self,
        node: NodeId,
        axis: Axis,
        placement: Placement,
        _: &mut FeedbackQueue,
    ) {
        self.records.push(PlacementRecord {
            node,
            axis,
            placement,
        });
    }
}

/// A change observed by the host, translated into tree edits by
/// [`LayoutTree::handle_event`](crate::LayoutTree::handle_event).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// `child` was added to `container`, at the end if `index` is `None`.
    ChildAttached {
        /// New parent.
        container: NodeId,
        /// Added child.
        child: NodeId,
        /// Position among siblings.
        index: Option<usize>,
    },
    /// `child` left its container.
    ChildDetached {
        /// Removed child.
        child: NodeId,
    },
    /// A child of `container` moved from `from` to `to`.
    ChildReordered {
        /// Parent.
        container: NodeId,
        /// Old index.
        from: usize,
        /// New index.
        to: usize,
    },
    /// The host resized `node`, or its content size changed.
    SizeChanged {
        /// Resized node.
        node: NodeId,
        /// New size.
        size: Size,
    },
    /// `node` was enabled or disabled.
    EnabledStateChanged {
        /// Affected node.
        node: NodeId,
        /// New state.
        enabled: bool,
    },
    /// Explicit request to recompute `container` from scratch.
    FullRebuildRequested {
        /// Container to rebuild.
        container: NodeId,
    },
}
