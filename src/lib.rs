//! Region Quadtree over axis-aligned rectangles.
//! # Contracts:
//! - Every inserted value's bounds must be contained in the region of the tree
//! - Stored values are copies, moving an object means `update`-ing it in the tree
//! - No ordering is guaranteed for values returned by queries
//!
pub mod config;
pub mod error;
pub mod quadtree;

pub use config::QuadtreeConfig;
pub use error::{QuadtreeError, Result};
pub use quadtree::{Iter, Quadtree};

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Coordinate type of the index.
pub trait Scalar:
    Copy
    + Debug
    + PartialOrd
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Div<Output = Self>
{
    const ZERO: Self;
    const TWO: Self;
}

macro_rules! impl_scalar {
    ($($t: ty => $zero: expr, $two: expr);* $(;)?) => {
        $(
            impl Scalar for $t {
                const ZERO: Self = $zero;
                const TWO: Self = $two;
            }
        )*
    };
}

impl_scalar! {
    f32 => 0.0, 2.0;
    f64 => 0.0, 2.0;
    i32 => 0, 2;
    i64 => 0, 2;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point<F> {
    pub x: F,
    pub y: F,
}

impl<F: Scalar> AddAssign for Point<F> {
    fn add_assign(&mut self, p: Self) {
        self.x = self.x + p.x;
        self.y = self.y + p.y;
    }
}

impl<F: Scalar> Add for Point<F> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<F: Scalar> Div<F> for Point<F> {
    type Output = Self;

    fn div(self, rhs: F) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl<F> Point<F> {
    pub fn new(x: F, y: F) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box anchored at its top-left corner.
///
/// `width` and `height` must not be negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect<F> {
    pub left: F,
    pub top: F,
    pub width: F,
    pub height: F,
}

impl<F: Scalar> Rect<F> {
    pub fn new(left: F, top: F, width: F, height: F) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_corners(top_left: Point<F>, size: Point<F>) -> Self {
        Self::new(top_left.x, top_left.y, size.x, size.y)
    }

    pub fn right(&self) -> F {
        self.left + self.width
    }

    pub fn bottom(&self) -> F {
        self.top + self.height
    }

    pub fn top_left(&self) -> Point<F> {
        Point::new(self.left, self.top)
    }

    pub fn size(&self) -> Point<F> {
        Point::new(self.width, self.height)
    }

    pub fn center(&self) -> Point<F> {
        self.top_left() + self.size() / F::TWO
    }

    /// Return whether both extents are non-negative. `false` for NaN extents.
    pub fn is_valid(&self) -> bool {
        self.width >= F::ZERO && self.height >= F::ZERO
    }

    /// Closed containment: `other` may touch the edges of `self`.
    pub fn contains(&self, other: &Self) -> bool {
        self.left <= other.left
            && other.right() <= self.right()
            && self.top <= other.top
            && other.bottom() <= self.bottom()
    }

    /// Open overlap test: boxes that only share an edge or a corner do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.left >= other.right()
            || self.right() <= other.left
            || self.top >= other.bottom()
            || self.bottom() <= other.top)
    }
}
