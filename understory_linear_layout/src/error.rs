// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by [`LayoutTree`](crate::LayoutTree) operations.

use thiserror::Error;

use crate::axis::Axis;
use crate::tree::NodeId;

/// Error type for tree edits and queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The id refers to a removed node or was never issued by this tree.
    #[error("node {0:?} is not alive")]
    StaleNode(NodeId),
    /// The node exists but has no container configuration.
    #[error("node {0:?} is not a layout container")]
    NotAContainer(NodeId),
    /// The child already reports to a container.
    #[error("node {child:?} is already attached to {container:?}")]
    AlreadyAttached {
        /// The child being attached.
        child: NodeId,
        /// Its current container.
        container: NodeId,
    },
    /// The edit would make a node its own ancestor.
    #[error("attaching {child:?} under {container:?} would create a cycle")]
    WouldCycle {
        /// The prospective container.
        container: NodeId,
        /// The child being attached.
        child: NodeId,
    },
    /// A child index is out of range.
    #[error("index {index} is out of bounds for {len} children")]
    IndexOutOfBounds {
        /// Offending index.
        index: usize,
        /// Number of children.
        len: usize,
    },
    /// The container has no aggregate on this axis yet.
    #[error("container {0:?} has not been measured on the {1:?} axis")]
    NotMeasured(NodeId, Axis),
    /// A child had no valid measurement; the pass was aborted.
    #[error("child {child:?} of {container:?} has no valid measurement on the {axis:?} axis")]
    InvalidChildState {
        /// Container being measured.
        container: NodeId,
        /// First child that failed.
        child: NodeId,
        /// Axis of the pass.
        axis: Axis,
    },
}
