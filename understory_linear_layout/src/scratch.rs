// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable scratch buffers for rebuild passes.

use alloc::vec::Vec;

use crate::measure::ChildSample;
use crate::place::Placement;
use crate::tree::NodeId;

/// Reusable scratch storage for measurement and placement.
///
/// A [`LayoutTree`](crate::LayoutTree) owns one and lends it to every pass, so
/// steady-state rebuilds do not allocate. Buffers retain capacity across
/// calls.
#[derive(Debug, Default)]
pub(crate) struct LayoutScratch {
    /// Active children of the container being processed, in layout order.
    pub(crate) samples: Vec<ChildSample>,
    pub(crate) prefilter: Vec<usize>,
    /// Containers in scope for the current rebuild, pre-order.
    pub(crate) order: Vec<NodeId>,
    pub(crate) stack: Vec<NodeId>,
    pub(crate) placements: Vec<(NodeId, Placement)>,
}

impl LayoutScratch {
    /// Creates an empty scratch buffer sized for about `children` children
    /// per container.
    #[must_use]
    pub(crate) fn with_capacity(children: usize) -> Self {
        Self {
            samples: Vec::with_capacity(children),
            prefilter: Vec::new(),
            order: Vec::new(),
            stack: Vec::new(),
            placements: Vec::with_capacity(children),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.samples.clear();
        self.prefilter.clear();
        self.order.clear();
        self.stack.clear();
        self.placements.clear();
    }
}
