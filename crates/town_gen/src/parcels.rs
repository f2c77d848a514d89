//! Recursive subdivision of blocks into parcels.
//!
//! The largest pending polygon is repeatedly cut along an axis-aligned line until the
//! parcel count reaches a density-dependent target or no piece can be split further.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blocks::{round_i, Block};
use crate::geometry::{polygon_area, polygon_centroid, Bounds, Point};
use crate::params::Params;
use crate::rng::{lerp, rand01, stable_id};

/// Cuts stay at least this far from either bounding-box side.
const CUT_INSET: f64 = 6.0;

/// Bounding boxes whose sides differ by less than this pick their cut axis at random.
const SQUARE_TOLERANCE: f64 = 8.0;

/// Items smaller than `FINALIZE_FACTOR * min_area` are not split again.
const FINALIZE_FACTOR: f64 = 1.8;

/// Concentric zone of the town, measured from the origin.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum District {
    Core,
    Inner,
    Outer,
}

impl District {
    /// Lowercase name, as used in building id signatures.
    pub fn as_str(self) -> &'static str {
        match self {
            District::Core => "core",
            District::Inner => "inner",
            District::Outer => "outer",
        }
    }

    /// District of a point: `< 0.35R` core, `< 0.7R` inner, else outer.
    pub fn for_point(p: Point, town_radius: f64) -> Self {
        let d = p.length();
        if d < town_radius * 0.35 {
            District::Core
        } else if d < town_radius * 0.7 {
            District::Inner
        } else {
            District::Outer
        }
    }

    /// Building size multiplier.
    pub fn scale(self) -> f64 {
        match self {
            District::Core => 0.8,
            District::Inner => 1.0,
            District::Outer => 1.25,
        }
    }
}

impl std::fmt::Display for District {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A buildable lot carved out of a block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Parcel {
    pub id: String,
    pub polygon: Vec<Point>,
    pub block_id: String,
    pub bbox: Bounds,
    pub district: District,
}

/// Cut direction. `X` cuts along a vertical line `x = value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn coord(self, p: Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }
}

/// Smallest parcel area allowed in a district.
pub fn min_parcel_area(params: &Params, district: District) -> f64 {
    let base = params.b_max * params.b_max * 1.5;
    match district {
        District::Core => base * 0.8,
        District::Inner => base * 1.2,
        District::Outer => base * 1.6,
    }
}

/// Parcel count the subdivision aims for at a given density.
pub fn parcel_target(density: f64) -> usize {
    (420.0 * (density / 1.2)).round().max(120.0) as usize
}

/// Clip `poly` against the half-plane `coord <= value` (`keep_less`) or `coord >= value`.
///
/// Points on the line belong to both halves. Returns `None` if fewer than three points
/// remain.
pub fn clip_polygon(
    poly: &[Point],
    axis: Axis,
    value: f64,
    keep_less: bool,
) -> Option<Vec<Point>> {
    let inside = |p: Point| {
        let c = axis.coord(p);
        if keep_less {
            c <= value
        } else {
            c >= value
        }
    };

    let n = poly.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let a = poly[(i + n - 1) % n];
        let b = poly[i];
        match (inside(a), inside(b)) {
            (true, true) => out.push(b),
            (true, false) => out.push(intersect_edge(a, b, axis, value)),
            (false, true) => {
                out.push(intersect_edge(a, b, axis, value));
                out.push(b);
            }
            (false, false) => {}
        }
    }
    (out.len() >= 3).then_some(out)
}

fn intersect_edge(a: Point, b: Point, axis: Axis, value: f64) -> Point {
    let d = b - a;
    match axis {
        Axis::X => {
            if d.x.abs() < 1e-6 {
                return Point::new(value, a.y);
            }
            let t = (value - a.x) / d.x;
            Point::new(value, a.y + d.y * t)
        }
        Axis::Y => {
            if d.y.abs() < 1e-6 {
                return Point::new(a.x, value);
            }
            let t = (value - a.y) / d.y;
            Point::new(a.x + d.x * t, value)
        }
    }
}

/// Split `poly` into the parts on either side of the cut line.
pub fn split_polygon(
    poly: &[Point],
    axis: Axis,
    value: f64,
) -> Option<(Vec<Point>, Vec<Point>)> {
    let a = clip_polygon(poly, axis, value, true)?;
    let b = clip_polygon(poly, axis, value, false)?;
    Some((a, b))
}

fn choose_axis(rng: &mut dyn RngCore, bounds: &Bounds) -> Axis {
    let w = bounds.width();
    let h = bounds.height();
    if (w - h).abs() < SQUARE_TOLERANCE {
        if rand01(rng) < 0.5 {
            Axis::X
        } else {
            Axis::Y
        }
    } else if w > h {
        Axis::X
    } else {
        Axis::Y
    }
}

fn cut_value(rng: &mut dyn RngCore, bounds: &Bounds, axis: Axis) -> f64 {
    let (lo, hi) = match axis {
        Axis::X => (bounds.min.x, bounds.max.x),
        Axis::Y => (bounds.min.y, bounds.max.y),
    };
    lerp(lo + CUT_INSET, hi - CUT_INSET, rand01(rng))
}

#[derive(Debug)]
struct Pending {
    polygon: Vec<Point>,
    area: f64,
    block_id: String,
    district: District,
}

impl Pending {
    fn new(polygon: Vec<Point>, block_id: String, district: District) -> Self {
        let area = polygon_area(&polygon).abs();
        Self {
            polygon,
            area,
            block_id,
            district,
        }
    }
}

/// Remove and return the largest item. Ties go to the earliest.
fn pop_largest(queue: &mut Vec<Pending>) -> Option<Pending> {
    let mut best: Option<(usize, f64)> = None;
    for (i, item) in queue.iter().enumerate() {
        if best.is_none_or(|(_, area)| item.area > area) {
            best = Some((i, item.area));
        }
    }
    best.map(|(i, _)| queue.remove(i))
}

/// Subdivide blocks into parcels.
///
/// Each block takes the district of its centroid, which all of its parcels inherit. The
/// RNG is consumed only for cut axis and position.
pub fn subdivide_blocks(rng: &mut dyn RngCore, params: &Params, blocks: &[Block]) -> Vec<Parcel> {
    let mut queue: Vec<Pending> = blocks
        .iter()
        .map(|block| {
            let district = District::for_point(block.centroid(), params.town_radius);
            Pending::new(block.polygon.clone(), block.id.clone(), district)
        })
        .collect();
    let mut done: Vec<Pending> = Vec::new();

    let target = parcel_target(params.density);
    let max_iterations = target * 6;
    let mut iterations = 0;
    let mut splits = 0usize;

    while queue.len() + done.len() < target && iterations < max_iterations {
        iterations += 1;
        let Some(item) = pop_largest(&mut queue) else {
            break;
        };
        let min_area = min_parcel_area(params, item.district);
        if item.area < min_area * FINALIZE_FACTOR {
            done.push(item);
            continue;
        }

        let bounds = Bounds::from_points(&item.polygon);
        let axis = choose_axis(rng, &bounds);
        let value = cut_value(rng, &bounds, axis);
        let Some((a, b)) = split_polygon(&item.polygon, axis, value) else {
            done.push(item);
            continue;
        };
        let a = Pending::new(a, item.block_id.clone(), item.district);
        let b = Pending::new(b, item.block_id.clone(), item.district);
        if a.area < min_area || b.area < min_area {
            done.push(item);
            continue;
        }
        queue.push(a);
        queue.push(b);
        splits += 1;
    }
    done.append(&mut queue);

    debug!(
        "Parcels: {} from {} blocks ({} splits, {} iterations, target {}).",
        done.len(),
        blocks.len(),
        splits,
        iterations,
        target
    );

    done.into_iter()
        .map(|item| {
            let centroid = polygon_centroid(&item.polygon);
            let signature = format!(
                "{}:{}:{}:{}",
                item.block_id,
                round_i(centroid.x),
                round_i(centroid.y),
                round_i(item.area)
            );
            Parcel {
                id: stable_id("parcel_", &params.seed, &signature),
                bbox: Bounds::from_points(&item.polygon),
                polygon: item.polygon,
                block_id: item.block_id,
                district: item.district,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::make_rng;

    fn square(cx: f64, cy: f64, half: f64) -> Vec<Point> {
        vec![
            Point::new(cx - half, cy - half),
            Point::new(cx + half, cy - half),
            Point::new(cx + half, cy + half),
            Point::new(cx - half, cy + half),
        ]
    }

    fn block(id: &str, polygon: Vec<Point>) -> Block {
        Block {
            id: id.to_owned(),
            area: polygon_area(&polygon).abs(),
            bbox: Bounds::from_points(&polygon),
            polygon,
        }
    }

    #[test]
    fn districts_follow_radius_bands() {
        let r = 100.0;
        assert_eq!(District::for_point(Point::new(34.9, 0.0), r), District::Core);
        assert_eq!(District::for_point(Point::new(0.0, 35.0), r), District::Inner);
        assert_eq!(District::for_point(Point::new(69.0, 0.0), r), District::Inner);
        assert_eq!(District::for_point(Point::new(70.0, 0.0), r), District::Outer);
        assert_eq!(District::Core.to_string(), "core");
    }

    #[test]
    fn min_area_scales_by_district() {
        let params = Params::default();
        let base = 26.0 * 26.0 * 1.5;
        assert_eq!(min_parcel_area(&params, District::Core), base * 0.8);
        assert_eq!(min_parcel_area(&params, District::Inner), base * 1.2);
        assert_eq!(min_parcel_area(&params, District::Outer), base * 1.6);
    }

    #[test]
    fn target_has_a_floor() {
        assert_eq!(parcel_target(1.2), 420);
        assert_eq!(parcel_target(0.05), 120);
        assert_eq!(parcel_target(2.4), 840);
    }

    #[test]
    fn clipping_square_keeps_both_halves() {
        let poly = square(0.0, 0.0, 10.0);
        let (a, b) = split_polygon(&poly, Axis::X, 2.0).expect("split");
        assert!((polygon_area(&a).abs() - 12.0 * 20.0).abs() < 1e-9);
        assert!((polygon_area(&b).abs() - 8.0 * 20.0).abs() < 1e-9);
        assert!(a.iter().all(|p| p.x <= 2.0));
        assert!(b.iter().all(|p| p.x >= 2.0));
    }

    #[test]
    fn clipping_outside_the_polygon_fails() {
        let poly = square(0.0, 0.0, 10.0);
        assert!(clip_polygon(&poly, Axis::Y, 20.0, false).is_none());
        assert!(split_polygon(&poly, Axis::Y, -20.0).is_none());
        // The whole polygon is on the kept side.
        let all = clip_polygon(&poly, Axis::Y, 20.0, true).expect("all");
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn vertical_edge_intersection_is_guarded() {
        let p = intersect_edge(Point::new(3.0, 0.0), Point::new(3.0, 10.0), Axis::X, 5.0);
        assert_eq!(p, Point::new(5.0, 0.0));
        let p = intersect_edge(Point::new(0.0, 0.0), Point::new(10.0, 10.0), Axis::Y, 4.0);
        assert_eq!(p, Point::new(4.0, 4.0));
    }

    #[test]
    fn pop_largest_prefers_earliest_on_ties() {
        let mut queue = vec![
            Pending::new(square(0.0, 0.0, 1.0), "a".into(), District::Core),
            Pending::new(square(0.0, 0.0, 2.0), "b".into(), District::Core),
            Pending::new(square(5.0, 0.0, 2.0), "c".into(), District::Core),
        ];
        assert_eq!(pop_largest(&mut queue).map(|p| p.block_id), Some("b".into()));
        assert_eq!(pop_largest(&mut queue).map(|p| p.block_id), Some("c".into()));
        assert_eq!(pop_largest(&mut queue).map(|p| p.block_id), Some("a".into()));
        assert!(pop_largest(&mut queue).is_none());
    }

    #[test]
    fn subdivision_respects_minimum_area() {
        let params = Params::default().with_town_radius(420.0);
        let blocks = vec![block("block_a", square(0.0, 0.0, 150.0))];
        let mut rng = make_rng("parcels");
        let parcels = subdivide_blocks(&mut rng, &params, &blocks);
        assert!(parcels.len() > 1);
        let min = min_parcel_area(&params, District::Core);
        let total: f64 = parcels.iter().map(|p| polygon_area(&p.polygon).abs()).sum();
        assert!((total - 300.0 * 300.0).abs() < 1e-6, "{total}");
        for p in &parcels {
            assert!(polygon_area(&p.polygon).abs() >= min);
            assert_eq!(p.block_id, "block_a");
            assert_eq!(p.district, District::Core);
            assert!(p.polygon.len() >= 3);
        }
    }

    #[test]
    fn small_blocks_pass_through_whole() {
        let params = Params::default();
        let blocks = vec![block("block_s", square(300.0, 0.0, 20.0))];
        let mut rng = make_rng("x");
        let parcels = subdivide_blocks(&mut rng, &params, &blocks);
        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels[0].polygon, blocks[0].polygon);
        assert_eq!(parcels[0].district, District::Outer);
    }

    #[test]
    fn subdivision_is_deterministic() {
        let params = Params::default();
        let blocks = vec![
            block("block_a", square(-100.0, 0.0, 80.0)),
            block("block_b", square(120.0, 40.0, 60.0)),
        ];
        let a = subdivide_blocks(&mut make_rng("s"), &params, &blocks);
        let b = subdivide_blocks(&mut make_rng("s"), &params, &blocks);
        assert_eq!(a, b);
        assert!(a.iter().all(|p| p.id.starts_with("parcel_")));
    }
}
