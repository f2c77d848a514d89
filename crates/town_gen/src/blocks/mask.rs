//! Binary road mask rasterization.
//!
//! The mask is origin-centered: world `(0, 0)` maps to pixel `(w/2, h/2)`, and pixel
//! `(x, y)` covers world `[x - w/2, x + 1 - w/2) × [y - h/2, y + 1 - h/2)`.
use crate::geometry::{closest_point_on_segment, Point};
use crate::roads::Polyline;

/// Extra stroke width so neighbouring blocks never touch through a thin road.
pub const STROKE_MARGIN: f64 = 6.0;

/// Pixels whose center lies within this distance past the stroke edge count as road.
/// Stands in for anti-aliased coverage above a small threshold.
pub(crate) const COVERAGE_SLACK: f64 = 0.5;

/// A `width × height` mask of road (`1`) and open (`0`) pixels.
#[derive(Clone, Debug)]
pub struct RoadMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RoadMask {
    /// Create an empty mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Road flag at the given pixel. Out-of-bounds pixels count as road.
    #[inline]
    pub fn is_road(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return true;
        }
        self.data[y as usize * self.width + x as usize] != 0
    }

    /// Offset from world to pixel-index space.
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Number of road pixels.
    pub fn road_pixels(&self) -> usize {
        self.data.iter().filter(|v| **v != 0).count()
    }

    /// Stroke segment `a`–`b` (world coordinates) with round caps.
    pub fn stroke_segment(&mut self, a: Point, b: Point, stroke_width: f64) {
        if self.data.is_empty() {
            return;
        }
        let origin = self.origin();
        let a = a + origin;
        let b = b + origin;
        let reach = stroke_width / 2.0 + COVERAGE_SLACK;
        let reach_sq = reach * reach;

        let w_i = self.width as isize;
        let h_i = self.height as isize;
        let start_x = ((a.x.min(b.x) - reach).floor() as isize).max(0);
        let end_x = ((a.x.max(b.x) + reach).ceil() as isize).min(w_i - 1);
        let start_y = ((a.y.min(b.y) - reach).floor() as isize).max(0);
        let end_y = ((a.y.max(b.y) + reach).ceil() as isize).min(h_i - 1);
        if start_x > end_x || start_y > end_y {
            return;
        }

        for py in start_y..=end_y {
            let row = py as usize * self.width;
            for px in start_x..=end_x {
                let center = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                let d = center.distance_squared(closest_point_on_segment(center, a, b));
                if d <= reach_sq {
                    self.data[row + px as usize] = 1;
                }
            }
        }
    }
}

/// Rasterize road polylines at `width + STROKE_MARGIN` into a fresh mask.
pub fn rasterize_roads(polylines: &[Polyline], width: usize, height: usize) -> RoadMask {
    let mut mask = RoadMask::new(width, height);
    for line in polylines {
        let stroke = line.width + STROKE_MARGIN;
        for (a, b) in line.segments() {
            mask.stroke_segment(a, b, stroke);
        }
    }
    mask
}
