//! Polygon measurements, containment, simplification and primitive shapes.
use std::f64::consts::TAU;

use super::{Bounds, Point};

/// Signed shoelace area. Positive for counter-clockwise winding in a y-up frame.
pub fn polygon_area(poly: &[Point]) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        area += poly[j].x * poly[i].y - poly[i].x * poly[j].y;
        j = i;
    }
    area / 2.0
}

/// Area-weighted centroid. Falls back to the bounding-box center for (near) zero area.
pub fn polygon_centroid(poly: &[Point]) -> Point {
    let n = poly.len();
    if n == 0 {
        return Point::ZERO;
    }
    let mut c = Point::ZERO;
    let mut area = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        let cross = poly[j].x * poly[i].y - poly[i].x * poly[j].y;
        area += cross;
        c += (poly[j] + poly[i]) * cross;
        j = i;
    }
    area *= 0.5;
    if area.abs() < 1e-6 {
        return Bounds::from_points(poly).center();
    }
    c / (6.0 * area)
}

/// Even-odd point containment.
pub fn point_in_polygon(p: Point, poly: &[Point]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y + 1e-9) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Ramer–Douglas–Peucker simplification of an open point sequence. Endpoints are kept.
pub fn simplify_rdp(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() <= 3 {
        return points.to_vec();
    }
    let eps_sq = epsilon * epsilon;
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((a, b)) = stack.pop() {
        let mut max_dist = 0.0;
        let mut index = None;
        for (i, p) in points.iter().enumerate().take(b).skip(a + 1) {
            let d = p.distance_squared(closest_point_on_segment(*p, points[a], points[b]));
            if d > max_dist {
                max_dist = d;
                index = Some(i);
            }
        }
        if let Some(i) = index {
            if max_dist > eps_sq {
                keep[i] = true;
                stack.push((i, b));
                stack.push((a, i));
            }
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Closest point to `p` on segment `a`–`b`.
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let d = b - a;
    let len_sq = d.length_squared();
    let t = if len_sq > 1e-9 {
        ((p - a).dot(d) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    a + d * t
}

/// Rotate `p` around the origin by `rot` radians.
pub fn rotate(p: Point, rot: f64) -> Point {
    let (s, c) = rot.sin_cos();
    Point::new(p.x * c - p.y * s, p.x * s + p.y * c)
}

/// Rectangle of size `w`×`h` centered at `center`, rotated by `rot`.
/// Corners are emitted counter-clockwise starting at the local `(-w/2, -h/2)` corner.
pub fn rect_polygon(center: Point, w: f64, h: f64, rot: f64) -> Vec<Point> {
    let hw = w / 2.0;
    let hh = h / 2.0;
    [
        Point::new(-hw, -hh),
        Point::new(hw, -hh),
        Point::new(hw, hh),
        Point::new(-hw, hh),
    ]
    .into_iter()
    .map(|p| center + rotate(p, rot))
    .collect()
}

/// Regular polygon approximating a circle around the origin.
pub fn circle_polygon(radius: f64, steps: usize) -> Vec<Point> {
    (0..steps)
        .map(|i| {
            let ang = i as f64 / steps as f64 * TAU;
            Point::new(ang.cos() * radius, ang.sin() * radius)
        })
        .collect()
}
