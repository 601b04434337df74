// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-container state kept by the tree.

use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::axis::{Axis, AxisMask, PerAxis};
use crate::config::LinearLayout;
use crate::dirty::DirtyTracker;
use crate::measure::Aggregate;
use crate::place::AxisPlan;
use crate::tree::NodeId;

/// A linear container: configuration, ordered children, cached aggregates,
/// and dirty state.
///
/// Obtained read-only through [`LayoutTree::container`](crate::LayoutTree::container);
/// all edits go through the tree.
#[derive(Clone, Debug)]
pub struct LayoutContainer {
    pub(crate) layout: LinearLayout,
    pub(crate) children: Vec<NodeId>,
    pub(crate) aggregate: PerAxis<Option<Aggregate>>,
    pub(crate) tracker: DirtyTracker,
    pub(crate) prefilter: PerAxis<SmallVec<[usize; 4]>>,
    pub(crate) last_plan: PerAxis<Option<AxisPlan>>,
}

impl LayoutContainer {
    pub(crate) fn new(layout: LinearLayout) -> Self {
        let mut tracker = DirtyTracker::new();
        tracker.mark_all();
        Self {
            layout,
            children: Vec::new(),
            aggregate: PerAxis::splat(None),
            tracker,
            prefilter: PerAxis::default(),
            last_plan: PerAxis::splat(None),
        }
    }

    /// Configuration.
    pub fn layout(&self) -> &LinearLayout {
        &self.layout
    }

    /// All children in insertion order, including ignored and disabled ones.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Aggregate from the last successful measurement on `axis`.
    pub fn aggregate(&self, axis: Axis) -> Option<Aggregate> {
        self.aggregate[axis]
    }

    /// Dirty state.
    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    /// Active-list indices of children with a maximum and positive flexible
    /// weight, from the last measurement on `axis`.
    pub fn prefilter(&self, axis: Axis) -> &[usize] {
        &self.prefilter[axis]
    }

    /// Axes on which this container accepts child feedback.
    pub fn children_controlled_axis(&self) -> AxisMask {
        self.layout.children_controlled_axis()
    }

    /// Forget cached placement plans so the next placement is full.
    pub(crate) fn invalidate_plans(&mut self) {
        self.last_plan = PerAxis::splat(None);
    }
}
