//! Pixel geometry shared by the resolver, the overlays, and the simulated host.
//!
//! All coordinates are monitor-local integers with the origin at the top-left
//! corner of the monitor; `y` grows downwards.

use std::fmt;

use serde::Deserialize;

/// Pixel-space rectangle with integer coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Rect {
    /// Horizontal origin in pixels.
    pub x: i32,
    /// Vertical origin in pixels.
    pub y: i32,
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl Rect {
    /// Construct a rectangle from origin and size.
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Left edge.
    #[inline]
    #[must_use]
    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Top edge.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.w, self.h, self.x, self.y)
    }
}

/// A point in monitor-local pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Construct a point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The usable part of a monitor: everything below the persistent top bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct WorkArea {
    /// Monitor width in pixels.
    pub width: i32,
    /// Top of the work area (height of the top bar).
    pub y: i32,
    /// Height of the work area.
    pub height: i32,
}

impl WorkArea {
    /// Work area for a monitor of `width x height` with a top bar of `top_bar` pixels.
    #[must_use]
    pub const fn below_top_bar(width: i32, height: i32, top_bar: i32) -> Self {
        Self {
            width,
            y: top_bar,
            height: height - top_bar,
        }
    }
}

/// Monitor edge guarded by a stack overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum Edge {
    /// Windows stacked against `x = 0`.
    Left,
    /// Windows stacked against the monitor's right boundary.
    Right,
}

impl Edge {
    /// Both edges, left first.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// Edge a window belongs to given its current on-screen x.
    #[must_use]
    pub const fn of_x(x: i32, stack_margin: i32) -> Self {
        if x < stack_margin {
            Self::Left
        } else {
            Self::Right
        }
    }

    /// Index of the neighbour that bounds the stack on this edge.
    ///
    /// A window stacked on the left is bounded by the next window in the
    /// space; one stacked on the right by the previous one.
    #[must_use]
    pub fn neighbor_index(self, index: usize) -> Option<usize> {
        match self {
            Self::Left => index.checked_add(1),
            Self::Right => index.checked_sub(1),
        }
    }

    /// Lowercase name used in node names and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
