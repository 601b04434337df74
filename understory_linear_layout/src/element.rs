// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout elements: constraint tuples, measured size, and dirty bits.

use kurbo::{Point, Size, Vec2};

use crate::axis::{Axis, AxisMask, PerAxis};
use crate::config::ForceExpandMode;
use crate::feedback::FeedbackLink;

/// Size constraints for one axis of an element.
///
/// `max` of `None` means unbounded. Hosts that carry a negative sentinel for
/// "no maximum" can use [`AxisConstraints::from_raw`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisConstraints {
    /// Smallest extent the element accepts.
    pub min: f64,
    /// Extent the element asks for when space allows.
    pub preferred: f64,
    /// Relative weight when distributing surplus space.
    pub flexible: f64,
    /// Upper bound on the placed extent.
    pub max: Option<f64>,
}

impl Default for AxisConstraints {
    fn default() -> Self {
        Self::ZERO
    }
}

impl AxisConstraints {
    /// All zero, unbounded.
    pub const ZERO: Self = Self {
        min: 0.0,
        preferred: 0.0,
        flexible: 0.0,
        max: None,
    };

    /// Constraints without an upper bound.
    pub const fn new(min: f64, preferred: f64, flexible: f64) -> Self {
        Self {
            min,
            preferred,
            flexible,
            max: None,
        }
    }

    /// An inflexible element that wants exactly `extent`.
    pub const fn fixed(extent: f64) -> Self {
        Self::new(extent, extent, 0.0)
    }

    /// Set the maximum. Negative values mean unbounded.
    #[must_use]
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = if max < 0.0 { None } else { Some(max) };
        self
    }

    /// Build from a tuple where a negative `max` means unbounded.
    pub fn from_raw(min: f64, preferred: f64, flexible: f64, max: f64) -> Self {
        Self::new(min, preferred, flexible).with_max(max)
    }

    /// Returns `true` if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite()
            && self.preferred.is_finite()
            && self.flexible.is_finite()
            && self.max.is_none_or(f64::is_finite)
    }
}

/// What a container reads from a child on one axis.
///
/// Produced by [`Element::measure`] and already adjusted for the container's
/// control and force-expand settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Measurement {
    /// Minimum extent.
    pub min: f64,
    /// Preferred extent, never below `min` and never above `max`.
    pub preferred: f64,
    /// Flexible weight, never negative.
    pub flexible: f64,
    /// Optional upper bound.
    pub max: Option<f64>,
}

impl Measurement {
    /// A zero-sized, inflexible measurement.
    pub const ZERO: Self = Self {
        min: 0.0,
        preferred: 0.0,
        flexible: 0.0,
        max: None,
    };

    /// Enforce `min <= preferred` and `min <= max`.
    ///
    /// A maximum below the minimum wins: the minimum is lowered to it.
    fn normalized(mut self) -> Self {
        if let Some(max) = self.max
            && max < self.min
        {
            self.min = max;
        }
        if self.preferred < self.min {
            self.preferred = self.min;
        }
        self
    }

    /// Multiply `min`, `preferred`, and `flexible` by `factor`.
    pub(crate) fn scaled(self, factor: f64) -> Self {
        Self {
            min: self.min * factor,
            preferred: self.preferred * factor,
            flexible: self.flexible * factor,
            max: self.max,
        }
    }
}

/// A box participating in linear layout.
///
/// Elements are plain data. They become part of a layout once inserted into a
/// [`LayoutTree`](crate::LayoutTree) and attached to a container.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    constraints: PerAxis<AxisConstraints>,
    measured_size: Size,
    scale: Vec2,
    anchor: Point,
    ignored: bool,
    dirty: AxisMask,
    link: Option<FeedbackLink>,
}

impl Default for Element {
    fn default() -> Self {
        Self::new()
    }
}

impl Element {
    /// A zero-constraint element with unit scale.
    pub fn new() -> Self {
        Self {
            constraints: PerAxis::splat(AxisConstraints::ZERO),
            measured_size: Size::ZERO,
            scale: Vec2::new(1.0, 1.0),
            anchor: Point::ORIGIN,
            ignored: false,
            dirty: AxisMask::empty(),
            link: None,
        }
    }

    /// Builder: constraints for one axis.
    #[must_use]
    pub fn with_constraints(mut self, axis: Axis, constraints: AxisConstraints) -> Self {
        self.constraints[axis] = constraints;
        self
    }

    /// Builder: measured (content) size.
    #[must_use]
    pub fn with_measured_size(mut self, size: Size) -> Self {
        self.measured_size = size;
        self
    }

    /// Builder: self scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Builder: anchor, passed through to placements untouched.
    #[must_use]
    pub fn with_anchor(mut self, anchor: Point) -> Self {
        self.anchor = anchor;
        self
    }

    /// Builder: exclude from layout.
    #[must_use]
    pub fn with_ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Constraints on `axis`.
    pub fn constraints(&self, axis: Axis) -> AxisConstraints {
        self.constraints[axis]
    }

    /// Current size. For controlled axes this is the last placed extent.
    pub fn measured_size(&self) -> Size {
        self.measured_size
    }

    /// Self scale.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Anchor.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Whether the element is excluded from its container's layout.
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Dirty bits not yet accepted by a container.
    pub fn dirty(&self) -> AxisMask {
        self.dirty
    }

    /// Link to the container that lays this element out.
    pub fn link(&self) -> Option<FeedbackLink> {
        self.link
    }

    /// Read this element on `axis` as seen by a container.
    ///
    /// Returns `None` when the constraints are not finite.
    pub fn measure(
        &self,
        axis: Axis,
        control_size: bool,
        force_expand: bool,
        mode: ForceExpandMode,
    ) -> Option<Measurement> {
        let mut m = if control_size {
            let c = self.constraints[axis];
            if !c.is_finite() {
                return None;
            }
            let mut preferred = c.preferred;
            if let Some(max) = c.max
                && preferred > max
            {
                preferred = max;
            }
            Measurement {
                min: c.min,
                preferred,
                flexible: c.flexible,
                max: c.max,
            }
        } else {
            let extent = axis.extent(self.measured_size);
            if !extent.is_finite() {
                return None;
            }
            Measurement {
                min: extent,
                preferred: extent,
                flexible: 0.0,
                max: None,
            }
        };
        if force_expand && (mode == ForceExpandMode::Inflate || !control_size) {
            m.flexible = m.flexible.max(1.0);
        }
        m.flexible = m.flexible.max(0.0);
        Some(m.normalized())
    }

    /// Replace constraints on `axis`. Returns `true` when they changed.
    pub(crate) fn set_constraints(&mut self, axis: Axis, constraints: AxisConstraints) -> bool {
        if self.constraints[axis] == constraints {
            return false;
        }
        self.constraints[axis] = constraints;
        self.dirty |= axis.mask();
        true
    }

    /// Publish a container aggregate as this element's own constraints.
    ///
    /// The element's `max` is kept. Returns `true` when anything changed.
    pub(crate) fn publish_aggregate(&mut self, axis: Axis, min: f64, preferred: f64, flexible: f64) -> bool {
        let max = self.constraints[axis].max;
        self.set_constraints(
            axis,
            AxisConstraints {
                min,
                preferred,
                flexible,
                max,
            },
        )
    }

    /// Replace the measured size. Returns the axes that changed.
    pub(crate) fn set_measured_size(&mut self, size: Size) -> AxisMask {
        let mut changed = AxisMask::empty();
        for axis in Axis::ALL {
            if axis.extent(self.measured_size) != axis.extent(size) {
                changed |= axis.mask();
            }
        }
        self.measured_size = size;
        changed
    }

    /// Silent write of a placed extent; produces no dirty bits.
    pub(crate) fn write_extent(&mut self, axis: Axis, extent: f64) -> bool {
        let old = axis.extent(self.measured_size);
        axis.set_extent(&mut self.measured_size, extent);
        old != extent
    }

    pub(crate) fn set_scale(&mut self, scale: Vec2) -> AxisMask {
        let mut changed = AxisMask::empty();
        for axis in Axis::ALL {
            if axis.component(self.scale) != axis.component(scale) {
                changed |= axis.mask();
            }
        }
        self.scale = scale;
        changed
    }

    pub(crate) fn set_anchor(&mut self, anchor: Point) {
        self.anchor = anchor;
    }

    pub(crate) fn set_ignored(&mut self, ignored: bool) -> bool {
        if self.ignored == ignored {
            return false;
        }
        self.ignored = ignored;
        self.dirty |= AxisMask::IGNORE;
        true
    }

    pub(crate) fn mark_dirty(&mut self, bits: AxisMask) {
        self.dirty |= bits;
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = AxisMask::empty();
    }

    pub(crate) fn set_link(&mut self, link: Option<FeedbackLink>) {
        self.link = link;
    }
}
