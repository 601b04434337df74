// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement: turn a container extent and its aggregate into child offsets
//! and sizes.
//!
//! Placement on an axis is split in two steps. [`plan_axis`] computes the
//! per-container values every child depends on (usable extent, cursor start,
//! flexible multiplier, min/preferred interpolation, effective spacing, and
//! the per-unit share of surplus redistributed from capped children). Then
//! [`place_children`] walks the children with that plan.
//!
//! When the plan for an axis equals the plan used by the previous placement,
//! children before the first dirty one are known to be unchanged, which is
//! what makes incremental placement sound.

use kurbo::Point;

use crate::axis::Axis;
use crate::config::LinearLayout;
use crate::element::Measurement;
use crate::measure::{Aggregate, ChildSample};

/// Where a child was put on one axis, relative to its container's origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
    /// Distance from the container's leading edge.
    pub offset: f64,
    /// Unscaled extent.
    pub size: f64,
    /// Scale applied to `size` when advancing the cursor.
    pub scale: f64,
    /// The child's anchor, passed through.
    pub anchor: Point,
}

impl Placement {
    /// The scaled extent.
    #[inline]
    pub fn extent(&self) -> f64 {
        self.size * self.scale
    }

    /// Trailing edge (`offset + extent`).
    #[inline]
    pub fn end(&self) -> f64 {
        self.offset + self.extent()
    }
}

/// Container-wide inputs to placement on one axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct AxisPlan {
    pub(crate) usable: f64,
    pub(crate) inner_leading: f64,
    pub(crate) cursor_start: f64,
    pub(crate) item_flexible_multiplier: f64,
    pub(crate) min_max_lerp: f64,
    pub(crate) spacing: f64,
    pub(crate) remaining_per_unit: f64,
}

/// Clamp that never panics: a `min` above `max` wins.
#[inline]
pub(crate) fn clamp_lenient(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

#[inline]
fn clamp01(value: f64) -> f64 {
    clamp_lenient(value, 0.0, 1.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Leading and trailing space removed by the container's inner size cap.
pub(crate) fn inner_offsets(layout: &LinearLayout, axis: Axis, extent: f64) -> (f64, f64) {
    match layout.max_inner_size[axis] {
        Some(max_inner) if max_inner >= 0.0 && extent > max_inner => {
            let delta = extent - max_inner;
            let leading = layout.inner_alignment.fraction(axis) * delta;
            (leading, delta - leading)
        }
        _ => (0.0, 0.0),
    }
}

/// Main-axis cell size before the final cap.
#[inline]
fn desired_main(m: &Measurement, plan: &AxisPlan) -> f64 {
    lerp(m.min, m.preferred, plan.min_max_lerp) + m.flexible * plan.item_flexible_multiplier
}

/// Final main-axis cell size for one child.
fn main_cell(m: &Measurement, plan: &AxisPlan) -> f64 {
    let desired = desired_main(m, plan);
    match m.max {
        Some(max) if desired > max => max,
        Some(max) => (desired + m.flexible * plan.remaining_per_unit).min(max),
        None => desired + m.flexible * plan.remaining_per_unit,
    }
}

/// Share of surplus lost to capped children, per unit of remaining flexible weight.
fn remaining_surplus_per_unit(
    children: &[ChildSample],
    prefilter: &[usize],
    plan: &AxisPlan,
    total_flexible: f64,
) -> f64 {
    if !(total_flexible > 0.0 && children.len() > prefilter.len()) {
        return 0.0;
    }
    let mut others = total_flexible;
    let mut remaining = 0.0;
    for &index in prefilter {
        let Some(m) = children.get(index).and_then(|c| c.measurement) else {
            continue;
        };
        let desired = desired_main(&m, plan);
        if let Some(max) = m.max
            && desired > max
        {
            others -= m.flexible;
            remaining += desired - max;
        }
    }
    if remaining <= 0.0 {
        return 0.0;
    }
    if others <= 0.0 {
        tracing::trace!(remaining, others, "surplus redistribution has no flexible receivers");
        return 0.0;
    }
    remaining / others
}

/// Compute the container-wide plan for `axis`.
pub(crate) fn plan_axis(
    layout: &LinearLayout,
    axis: Axis,
    extent: f64,
    aggregate: Aggregate,
    children: &[ChildSample],
    prefilter: &[usize],
) -> AxisPlan {
    let (inner_leading, inner_trailing) = inner_offsets(layout, axis, extent);
    let usable = extent - inner_leading - inner_trailing;
    let padding_leading = axis.leading_inset(layout.padding);

    if !layout.is_main_axis(axis) {
        return AxisPlan {
            usable,
            inner_leading,
            cursor_start: padding_leading + inner_leading,
            ..AxisPlan::default()
        };
    }

    let align = layout.child_alignment.fraction(axis);
    let surplus = usable - aggregate.preferred;
    let mut cursor = padding_leading;
    let mut item_flexible_multiplier = 0.0;
    let mut flexible_spacing = false;
    if surplus > 0.0 {
        if aggregate.flexible == 0.0 {
            if !layout.control_size[axis] || !layout.force_expand[axis] {
                cursor += surplus * align;
            } else {
                flexible_spacing = true;
            }
        } else if aggregate.flexible > 0.0 {
            item_flexible_multiplier = surplus / aggregate.flexible;
        }
    }
    cursor += inner_leading;

    let min_max_lerp = if aggregate.min != aggregate.preferred {
        clamp01((usable - aggregate.min) / (aggregate.preferred - aggregate.min))
    } else {
        0.0
    };

    let gaps = children.len().saturating_sub(1);
    let spacing = if flexible_spacing && gaps > 0 {
        layout.spacing.max(surplus / gaps as f64)
    } else {
        layout.spacing
    };

    let mut plan = AxisPlan {
        usable,
        inner_leading,
        cursor_start: cursor,
        item_flexible_multiplier,
        min_max_lerp,
        spacing,
        remaining_per_unit: 0.0,
    };
    plan.remaining_per_unit =
        remaining_surplus_per_unit(children, prefilter, &plan, aggregate.flexible);
    plan
}

/// Which children a placement pass writes.
pub(crate) enum Writes<'a, F> {
    /// Every child.
    All,
    /// Children at or after this index. Earlier ones still advance the cursor.
    From(usize),
    /// Children accepted by the predicate.
    Only(&'a F),
}

/// Lay out `children` on `axis` with `plan`, calling `emit` for each written child.
///
/// Children without a valid measurement are skipped and do not advance the
/// cursor.
pub(crate) fn place_children<F>(
    layout: &LinearLayout,
    axis: Axis,
    plan: &AxisPlan,
    children: &[ChildSample],
    writes: Writes<'_, F>,
    mut emit: impl FnMut(usize, Placement),
) where
    F: Fn(&ChildSample) -> bool,
{
    let control = layout.control_size[axis];
    let align = layout.child_alignment.fraction(axis);
    let selected = |index: usize, child: &ChildSample| match writes {
        Writes::All => true,
        Writes::From(start) => index >= start,
        Writes::Only(pred) => pred(child),
    };

    if layout.is_main_axis(axis) {
        let mut cursor = plan.cursor_start;
        for (index, child) in children.iter().enumerate() {
            let Some(m) = child.measurement else {
                continue;
            };
            let cell = main_cell(&m, plan);
            if selected(index, child) {
                let (offset, size) = if control {
                    (cursor, cell)
                } else {
                    (cursor + (cell - child.measured_extent) * align, child.measured_extent)
                };
                emit(
                    index,
                    Placement {
                        offset,
                        size,
                        scale: child.scale,
                        anchor: child.anchor,
                    },
                );
            }
            cursor += cell * child.scale + plan.spacing;
        }
    } else {
        let padding = axis.total_inset(layout.padding);
        let inner = plan.usable - padding;
        for (index, child) in children.iter().enumerate() {
            if !selected(index, child) {
                continue;
            }
            let Some(m) = child.measurement else {
                continue;
            };
            let upper = if m.flexible > 0.0 { plan.usable } else { m.preferred };
            let mut required = clamp_lenient(inner, m.min, upper);
            if let Some(max) = m.max
                && required > max
            {
                required = max;
            }
            let start = plan.cursor_start + (inner - required * child.scale) * align;
            let (offset, size) = if control {
                (start, required)
            } else {
                (start + (required - child.measured_extent) * align, child.measured_extent)
            };
            emit(
                index,
                Placement {
                    offset,
                    size,
                    scale: child.scale,
                    anchor: child.anchor,
                },
            );
        }
    }
}
