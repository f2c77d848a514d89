//! Axis-aligned bounding boxes.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Point;

/// Axis-aligned bounding box with inclusive edges.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point. An empty slice yields an inverted box
    /// (`min = +inf`, `max = -inf`) that overlaps nothing.
    pub fn from_points(points: &[Point]) -> Self {
        let mut min = Point::splat(f64::INFINITY);
        let mut max = Point::splat(f64::NEG_INFINITY);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    /// Touching edges count as overlap.
    #[inline]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}
