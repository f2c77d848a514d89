//! Brute-force nearest road segment lookup.
use crate::geometry::{closest_point_on_segment, Point};

use super::merge::Polyline;

/// Closest point on the road network to a query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadHit {
    /// Index of the polyline containing the closest segment.
    pub polyline: usize,
    /// Closest point on that segment.
    pub point: Point,
    /// Distance from the query point.
    pub distance: f64,
    /// Direction of the segment in radians.
    pub angle: f64,
}

/// Scan every segment of every polyline for the one closest to `point`.
/// Returns `None` when there are no segments.
pub fn closest_road(point: Point, polylines: &[Polyline]) -> Option<RoadHit> {
    let mut best: Option<RoadHit> = None;
    for (index, line) in polylines.iter().enumerate() {
        for (a, b) in line.segments() {
            let proj = closest_point_on_segment(point, a, b);
            let distance = point.distance(proj);
            if best.is_none_or(|hit| distance < hit.distance) {
                let d = b - a;
                best = Some(RoadHit {
                    polyline: index,
                    point: proj,
                    distance,
                    angle: d.y.atan2(d.x),
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roads::RoadKind;

    #[test]
    fn finds_nearest_segment_across_polylines() {
        let lines = vec![
            Polyline::new(
                RoadKind::Main,
                4.0,
                vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            ),
            Polyline::new(
                RoadKind::Minor,
                2.0,
                vec![
                    Point::new(0.0, 50.0),
                    Point::new(0.0, 100.0),
                    Point::new(50.0, 100.0),
                ],
            ),
        ];
        let hit = closest_road(Point::new(20.0, 90.0), &lines).expect("hit");
        assert_eq!(hit.polyline, 1);
        assert_eq!(hit.point, Point::new(20.0, 100.0));
        assert!((hit.distance - 10.0).abs() < 1e-12);
        assert_eq!(hit.angle, 0.0);

        let hit = closest_road(Point::new(10.0, 60.0), &lines).expect("hit");
        assert_eq!(hit.point, Point::new(0.0, 60.0));
        assert!((hit.angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn no_segments_means_no_hit() {
        assert!(closest_road(Point::ZERO, &[]).is_none());
        let single = vec![Polyline::new(RoadKind::Main, 1.0, vec![Point::ZERO])];
        assert!(closest_road(Point::ZERO, &single).is_none());
    }
}
