// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axes, axis bitmasks, and per-axis storage.
//!
//! Every layout computation in this crate runs once per axis with the same
//! code. [`Axis`] selects which component of a [`Size`], [`Vec2`], or
//! [`Insets`] is being read, and [`PerAxis`] stores one value per axis.

use core::ops::{Index, IndexMut};

use kurbo::{Insets, Size, Vec2};

/// One of the two layout axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis. Extents are widths; offsets grow to the right.
    Horizontal,
    /// The y axis. Extents are heights; offsets grow downward.
    Vertical,
}

impl Axis {
    /// Both axes, horizontal first.
    ///
    /// This is also the order in which passes run during a rebuild.
    pub const ALL: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// Dense index of this axis (`0` for horizontal, `1` for vertical).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }

    /// The perpendicular axis.
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// The single-axis mask for this axis.
    #[inline]
    pub const fn mask(self) -> AxisMask {
        match self {
            Self::Horizontal => AxisMask::HORIZONTAL,
            Self::Vertical => AxisMask::VERTICAL,
        }
    }

    /// The extent of `size` along this axis.
    #[inline]
    pub fn extent(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Overwrite the extent of `size` along this axis.
    #[inline]
    pub fn set_extent(self, size: &mut Size, value: f64) {
        match self {
            Self::Horizontal => size.width = value,
            Self::Vertical => size.height = value,
        }
    }

    /// The component of `v` along this axis.
    #[inline]
    pub fn component(self, v: Vec2) -> f64 {
        match self {
            Self::Horizontal => v.x,
            Self::Vertical => v.y,
        }
    }

    /// The leading inset on this axis (left or top).
    #[inline]
    pub fn leading_inset(self, insets: Insets) -> f64 {
        match self {
            Self::Horizontal => insets.x0,
            Self::Vertical => insets.y0,
        }
    }

    /// The sum of both insets on this axis.
    #[inline]
    pub fn total_inset(self, insets: Insets) -> f64 {
        match self {
            Self::Horizontal => insets.x0 + insets.x1,
            Self::Vertical => insets.y0 + insets.y1,
        }
    }
}

bitflags::bitflags! {
    /// Axis dirty bits carried by elements and container trackers.
    ///
    /// `IGNORE` is a pseudo-axis: it marks a membership or content change that
    /// bypasses the controlled-axis filter and forces full placement.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct AxisMask: u8 {
        /// The horizontal axis.
        const HORIZONTAL = 1 << 0;
        /// The vertical axis.
        const VERTICAL = 1 << 1;
        /// Structural change (membership, ignore flag, content size).
        const IGNORE = 1 << 2;
        /// Both real axes.
        const AXES = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        Self::empty()
    }
}

impl AxisMask {
    /// Returns `true` if the bit for `axis` is set.
    #[inline]
    pub fn has_axis(self, axis: Axis) -> bool {
        self.contains(axis.mask())
    }

    /// Returns `true` if the horizontal bit is set.
    #[inline]
    pub fn has_horizontal(self) -> bool {
        self.contains(Self::HORIZONTAL)
    }

    /// Returns `true` if the vertical bit is set.
    #[inline]
    pub fn has_vertical(self) -> bool {
        self.contains(Self::VERTICAL)
    }

    /// Returns `true` if the structural `IGNORE` bit is set.
    #[inline]
    pub fn has_ignore(self) -> bool {
        self.contains(Self::IGNORE)
    }

    /// The real axes set in this mask, without `IGNORE`.
    #[inline]
    pub fn axes(self) -> Self {
        self & Self::AXES
    }

    /// Iterate the real axes set in this mask.
    pub fn iter_axes(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |a| self.has_axis(*a))
    }
}

/// Direction in which a container stacks its children.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Children are laid out left to right.
    Horizontal,
    /// Children are laid out top to bottom.
    #[default]
    Vertical,
}

impl Orientation {
    /// The axis children are stacked along.
    #[inline]
    pub const fn main_axis(self) -> Axis {
        match self {
            Self::Horizontal => Axis::Horizontal,
            Self::Vertical => Axis::Vertical,
        }
    }

    /// The axis perpendicular to the stacking direction.
    #[inline]
    pub const fn cross_axis(self) -> Axis {
        self.main_axis().other()
    }

    /// Returns `true` if `axis` is the stacking axis.
    #[inline]
    pub fn is_main(self, axis: Axis) -> bool {
        self.main_axis() == axis
    }
}

/// A pair of values, one per [`Axis`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PerAxis<T> {
    /// Value for [`Axis::Horizontal`].
    pub horizontal: T,
    /// Value for [`Axis::Vertical`].
    pub vertical: T,
}

impl<T> PerAxis<T> {
    /// Create a pair from explicit values.
    pub const fn new(horizontal: T, vertical: T) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Apply `f` to both values.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> PerAxis<U> {
        PerAxis {
            horizontal: f(self.horizontal),
            vertical: f(self.vertical),
        }
    }
}

impl<T: Clone> PerAxis<T> {
    /// Use the same value for both axes.
    pub fn splat(value: T) -> Self {
        Self {
            horizontal: value.clone(),
            vertical: value,
        }
    }
}

impl PerAxis<bool> {
    /// The axes whose value is `true`, as a mask.
    pub fn to_mask(self) -> AxisMask {
        let mut mask = AxisMask::empty();
        mask.set(AxisMask::HORIZONTAL, self.horizontal);
        mask.set(AxisMask::VERTICAL, self.vertical);
        mask
    }
}

impl<T> Index<Axis> for PerAxis<T> {
    type Output = T;

    #[inline]
    fn index(&self, axis: Axis) -> &T {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }
}

impl<T> IndexMut<Axis> for PerAxis<T> {
    #[inline]
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }
}
