// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child-to-container feedback.
//!
//! An element that changes records axis bits on itself. The feedback channel
//! then decides whether its container cares: only changes on axes the
//! container controls, or structural `IGNORE` changes, are delivered. Bits that
//! are filtered out stay on the element.
//!
//! Reports that arrive while a rebuild is running are queued in a
//! [`FeedbackQueue`] and replayed once the rebuild finishes, so they land in
//! the next cycle instead of the one in flight.

use kurbo::Size;
use smallvec::SmallVec;

use crate::axis::AxisMask;
use crate::tree::NodeId;

/// Non-owning back-reference from an element to its container.
///
/// The link does not keep the container alive. It is cleared when the element
/// is detached or when the container is removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FeedbackLink {
    container: NodeId,
}

impl FeedbackLink {
    pub(crate) const fn new(container: NodeId) -> Self {
        Self { container }
    }

    /// The container this element reports to.
    pub const fn container(self) -> NodeId {
        self.container
    }
}

/// Returns `true` if a container controlling `controlled` axes wants `bits`.
#[inline]
pub(crate) fn delivers(controlled: AxisMask, bits: AxisMask) -> bool {
    bits.has_ignore() || bits.intersects(controlled & AxisMask::AXES)
}

/// A change deferred until the running rebuild completes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DeferredFeedback {
    /// Equivalent to [`LayoutTree::report_dirty`](crate::LayoutTree::report_dirty).
    Dirty {
        /// Reporting element.
        node: NodeId,
        /// Axis bits.
        mask: AxisMask,
    },
    /// Equivalent to [`LayoutTree::set_measured_size`](crate::LayoutTree::set_measured_size).
    MeasuredSize {
        /// Element whose content size changed.
        node: NodeId,
        /// New size.
        size: Size,
    },
}

/// Queue of feedback produced while a rebuild is in progress.
///
/// Hosts receive one in [`LayoutHost::write_placement`](crate::LayoutHost::write_placement)
/// and push any size changes the new placement causes.
#[derive(Clone, Debug, Default)]
pub struct FeedbackQueue {
    pending: SmallVec<[DeferredFeedback; 8]>,
}

impl FeedbackQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a dirty report for `node`.
    pub fn report_dirty(&mut self, node: NodeId, mask: AxisMask) {
        self.pending.push(DeferredFeedback::Dirty { node, mask });
    }

    /// Queue a content size change for `node`.
    pub fn set_measured_size(&mut self, node: NodeId, size: Size) {
        self.pending.push(DeferredFeedback::MeasuredSize { node, size });
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Move all items out of `other` onto the end of this queue.
    pub fn append(&mut self, other: &mut Self) {
        self.pending.extend(other.pending.drain(..));
    }

    /// Remove and return all queued items in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = DeferredFeedback> + '_ {
        self.pending.drain(..)
    }
}
