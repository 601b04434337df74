// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measurement: fold child constraints into a container aggregate.

use alloc::vec::Vec;

use kurbo::Point;

use crate::axis::Axis;
use crate::config::LinearLayout;
use crate::element::Measurement;
use crate::tree::NodeId;

/// Summed (main axis) or maximal (cross axis) child constraints on one axis,
/// padding and spacing included.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aggregate {
    /// Smallest extent the container can lay its children out in.
    pub min: f64,
    /// Extent at which every child gets its preferred size.
    pub preferred: f64,
    /// Total flexible weight (main axis) or the largest weight (cross axis).
    pub flexible: f64,
}

/// One active child as read for a single pass on one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct ChildSample {
    pub(crate) id: NodeId,
    /// `None` when the child could not be measured.
    pub(crate) measurement: Option<Measurement>,
    /// Self-scale factor, or `1.0` when scaling is off for this axis.
    pub(crate) scale: f64,
    /// Current extent of the child on this axis.
    pub(crate) measured_extent: f64,
    pub(crate) anchor: Point,
}

/// Compute the aggregate for `children` on `axis`.
///
/// `prefilter` is refilled with the indices of children that have both a
/// maximum and a positive flexible weight. On failure the id of the first
/// child without a valid measurement is returned and `prefilter` is left
/// empty.
pub(crate) fn measure_axis(
    layout: &LinearLayout,
    axis: Axis,
    children: &[ChildSample],
    prefilter: &mut Vec<usize>,
) -> Result<Aggregate, NodeId> {
    prefilter.clear();
    let padding = axis.total_inset(layout.padding);
    let main = layout.is_main_axis(axis);

    let mut min = padding;
    let mut preferred = padding;
    let mut flexible = 0.0_f64;

    for (index, child) in children.iter().enumerate() {
        let Some(m) = child.measurement else {
            prefilter.clear();
            return Err(child.id);
        };
        let m = m.scaled(child.scale);
        if m.max.is_some() && m.flexible > 0.0 {
            prefilter.push(index);
        }
        if main {
            min += m.min + layout.spacing;
            preferred += m.preferred + layout.spacing;
            flexible += m.flexible;
        } else {
            min = min.max(m.min + padding);
            preferred = preferred.max(m.preferred + padding);
            flexible = flexible.max(m.flexible);
        }
    }

    if main && !children.is_empty() {
        min -= layout.spacing;
        preferred -= layout.spacing;
    }
    preferred = preferred.max(min);

    Ok(Aggregate {
        min,
        preferred,
        flexible,
    })
}
