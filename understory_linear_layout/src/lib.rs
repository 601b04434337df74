// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Linear Layout: incremental horizontal and vertical box layout.
//!
//! A container stacks its children along one axis. Every child describes
//! itself per axis with a `(min, preferred, flexible, max)` tuple; the
//! container folds those into an aggregate, then hands out space:
//!
//! - below the aggregate preferred extent, children shrink toward their
//!   minimums by a shared interpolation factor;
//! - above it, surplus goes to flexible children by weight, with space that
//!   capped children cannot take passed on to the rest;
//! - with no flexible children, surplus moves the block according to
//!   [`Alignment`], or widens the gaps when force-expand is on.
//!
//! The same code runs for both axes. [`Axis`] picks the component and
//! [`Orientation`] decides which axis is the stacking one.
//!
//! ## Incremental updates
//!
//! Children report changes through a feedback channel: axis bits in an
//! [`AxisMask`]. A container only accepts bits for axes whose size it
//! controls, plus the structural `IGNORE` bit. Accepted reports land in the
//! container's [`DirtyTracker`] and schedule a rebuild. Any number of reports
//! coalesce into one [`LayoutTree::rebuild`].
//!
//! A rebuild measures children before parents so that nested containers
//! publish their aggregates upward in the same cycle, then places parents
//! before children so that a nested container sees its new size before it
//! lays out its own children. On the stacking axis, children before the
//! first dirty one are left untouched whenever the container-wide placement
//! inputs did not change; on the cross axis only dirty children are
//! re-placed.
//!
//! ## Quick Start
//!
//! ```rust
//! use kurbo::Size;
//! use understory_linear_layout::{
//!     Axis, AxisConstraints, Element, LayoutTree, LinearLayout, PlacementLog,
//! };
//!
//! let mut tree = LayoutTree::new();
//! let row = tree.insert_container(LinearLayout::horizontal().with_spacing(10.0));
//! tree.set_measured_size(row, Size::new(200.0, 40.0)).unwrap();
//!
//! let mut children = Vec::new();
//! for preferred in [20.0, 30.0, 40.0] {
//!     let child = tree.insert_element(
//!         Element::new().with_constraints(Axis::Horizontal, AxisConstraints::fixed(preferred)),
//!     );
//!     tree.attach(row, child, None).unwrap();
//!     children.push(child);
//! }
//!
//! let mut log = PlacementLog::new();
//! assert!(tree.rebuild(&mut log));
//! assert_eq!(tree.aggregate(row, Axis::Horizontal).preferred, 110.0);
//!
//! let offsets: Vec<f64> = children
//!     .iter()
//!     .map(|c| log.last(*c, Axis::Horizontal).unwrap().offset)
//!     .collect();
//! assert_eq!(offsets, [0.0, 30.0, 70.0]);
//!
//! // Nothing changed, nothing to do.
//! assert!(!tree.rebuild(&mut log));
//! ```
//!
//! ## Hosts
//!
//! Placements are delivered to a [`LayoutHost`]. [`PlacementLog`] records
//! them; `()` discards them. Changes the host makes while receiving a
//! placement go through the [`FeedbackQueue`] it is handed and are applied
//! after the rebuild, scheduling the next one.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` once per rebuild, `trace` per
//! pass, and `warn` when a measurement is aborted because a child has no
//! valid measurement.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. Enable the `libm` feature when
//! building without `std`.

#![no_std]

extern crate alloc;

mod axis;
mod config;
mod container;
mod dirty;
mod element;
mod error;
mod feedback;
mod host;
mod measure;
mod place;
mod scheduler;
mod scratch;
mod tree;

pub use axis::{Axis, AxisMask, Orientation, PerAxis};
pub use config::{Alignment, ForceExpandMode, LinearLayout};
pub use container::LayoutContainer;
pub use dirty::{ContainerState, DirtyTracker};
pub use element::{AxisConstraints, Element, Measurement};
pub use error::LayoutError;
pub use feedback::{DeferredFeedback, FeedbackLink, FeedbackQueue};
pub use host::{HostEvent, LayoutHost, PlacementLog, PlacementRecord};
pub use measure::Aggregate;
pub use place::Placement;
pub use scheduler::{RebuildScheduler, SchedulerState};
pub use tree::{LayoutTree, NodeId};
