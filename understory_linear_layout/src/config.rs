// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container configuration.

use kurbo::Insets;

use crate::axis::{Axis, AxisMask, Orientation, PerAxis};

/// Alignment as a fraction of free space per axis.
///
/// `0.0` is leading (left/top), `0.5` centered, `1.0` trailing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Alignment {
    /// Horizontal fraction.
    pub horizontal: f64,
    /// Vertical fraction.
    pub vertical: f64,
}

impl Default for Alignment {
    fn default() -> Self {
        Self::UPPER_LEFT
    }
}

impl Alignment {
    /// Top left.
    pub const UPPER_LEFT: Self = Self::new(0.0, 0.0);
    /// Top, horizontally centered.
    pub const UPPER_CENTER: Self = Self::new(0.5, 0.0);
    /// Top right.
    pub const UPPER_RIGHT: Self = Self::new(1.0, 0.0);
    /// Left, vertically centered.
    pub const MIDDLE_LEFT: Self = Self::new(0.0, 0.5);
    /// Centered on both axes.
    pub const MIDDLE_CENTER: Self = Self::new(0.5, 0.5);
    /// Right, vertically centered.
    pub const MIDDLE_RIGHT: Self = Self::new(1.0, 0.5);
    /// Bottom left.
    pub const LOWER_LEFT: Self = Self::new(0.0, 1.0);
    /// Bottom, horizontally centered.
    pub const LOWER_CENTER: Self = Self::new(0.5, 1.0);
    /// Bottom right.
    pub const LOWER_RIGHT: Self = Self::new(1.0, 1.0);
}

impl Alignment {
    /// Arbitrary fractions.
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// The fraction on `axis`.
    #[inline]
    pub fn fraction(self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }
}

/// When force-expand gives children a flexible weight of at least one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ForceExpandMode {
    /// Always, even on axes where the container controls child size.
    Inflate,
    /// Only on axes where the container does not control child size.
    #[default]
    KeepSizeWhenChildControl,
}

/// Settings for one linear container.
///
/// Build with [`LinearLayout::horizontal`] or [`LinearLayout::vertical`] and
/// the `with_*` methods, then hand it to
/// [`LayoutTree::insert_container`](crate::LayoutTree::insert_container) or
/// [`LayoutTree::set_layout`](crate::LayoutTree::set_layout).
#[derive(Clone, Debug, PartialEq)]
pub struct LinearLayout {
    /// Stacking direction.
    pub orientation: Orientation,
    /// Space between the container edge and its children.
    pub padding: Insets,
    /// Gap between consecutive children on the main axis.
    pub spacing: f64,
    /// Where children sit inside free space.
    pub child_alignment: Alignment,
    /// Whether the container sets child extents on each axis.
    pub control_size: PerAxis<bool>,
    /// Whether children stretch to fill free space on each axis.
    pub force_expand: PerAxis<bool>,
    /// How `force_expand` interacts with `control_size`.
    pub force_expand_mode: ForceExpandMode,
    /// Multiply child constraints and extents by the child's own scale.
    pub scale_by_self_scale: PerAxis<bool>,
    /// Cap on the usable inner extent per axis.
    pub max_inner_size: PerAxis<Option<f64>>,
    /// Where the capped inner box sits inside the container.
    pub inner_alignment: Alignment,
    /// Lay children out last to first.
    pub reverse_order: bool,
}

impl Default for LinearLayout {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            padding: Insets::ZERO,
            spacing: 0.0,
            child_alignment: Alignment::UPPER_LEFT,
            control_size: PerAxis::splat(true),
            force_expand: PerAxis::splat(false),
            force_expand_mode: ForceExpandMode::default(),
            scale_by_self_scale: PerAxis::splat(false),
            max_inner_size: PerAxis::splat(None),
            inner_alignment: Alignment::MIDDLE_CENTER,
            reverse_order: false,
        }
    }
}

impl LinearLayout {
    /// A left-to-right row with default settings.
    pub fn horizontal() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            ..Self::default()
        }
    }

    /// A top-to-bottom column with default settings.
    pub fn vertical() -> Self {
        Self::default()
    }

    /// Set padding.
    #[must_use]
    pub fn with_padding(mut self, padding: impl Into<Insets>) -> Self {
        self.padding = padding.into();
        self
    }

    /// Set spacing.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set child alignment.
    #[must_use]
    pub fn with_child_alignment(mut self, alignment: Alignment) -> Self {
        self.child_alignment = alignment;
        self
    }

    /// Set size control on one axis.
    #[must_use]
    pub fn with_control_size(mut self, axis: Axis, control: bool) -> Self {
        self.control_size[axis] = control;
        self
    }

    /// Set force-expand on one axis.
    #[must_use]
    pub fn with_force_expand(mut self, axis: Axis, expand: bool) -> Self {
        self.force_expand[axis] = expand;
        self
    }

    /// Set the force-expand mode.
    #[must_use]
    pub fn with_force_expand_mode(mut self, mode: ForceExpandMode) -> Self {
        self.force_expand_mode = mode;
        self
    }

    /// Enable or disable scaling by the child's own scale on one axis.
    #[must_use]
    pub fn with_scale_by_self_scale(mut self, axis: Axis, enabled: bool) -> Self {
        self.scale_by_self_scale[axis] = enabled;
        self
    }

    /// Cap the inner extent on one axis. Negative values remove the cap.
    #[must_use]
    pub fn with_max_inner_size(mut self, axis: Axis, max: Option<f64>) -> Self {
        self.max_inner_size[axis] = max.filter(|m| *m >= 0.0);
        self
    }

    /// Set inner alignment.
    #[must_use]
    pub fn with_inner_alignment(mut self, alignment: Alignment) -> Self {
        self.inner_alignment = alignment;
        self
    }

    /// Lay children out in reverse.
    #[must_use]
    pub fn with_reverse_order(mut self, reverse: bool) -> Self {
        self.reverse_order = reverse;
        self
    }

    /// Axes on which child sizes are controlled.
    ///
    /// Child feedback is only delivered for these axes.
    pub fn children_controlled_axis(&self) -> AxisMask {
        self.control_size.to_mask()
    }

    /// Axes on which children are force-expanded.
    pub fn parent_controlled_axis(&self) -> AxisMask {
        self.force_expand.to_mask()
    }

    /// Returns `true` if `axis` is the stacking axis.
    #[inline]
    pub fn is_main_axis(&self, axis: Axis) -> bool {
        self.orientation.is_main(axis)
    }

    /// Scale factor for a child with the given per-axis scale component.
    #[inline]
    pub(crate) fn scale_factor(&self, axis: Axis, component: f64) -> f64 {
        if self.scale_by_self_scale[axis] {
            component
        } else {
            1.0
        }
    }
}
