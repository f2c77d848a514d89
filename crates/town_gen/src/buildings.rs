//! Building placement on parcels.
//!
//! One rectangular footprint is attempted per parcel, centered on the parcel centroid and
//! aligned with the parcel edge facing the nearest road. Every parcel draws from its own
//! RNG stream keyed by the parcel id, so a building does not depend on how many parcels
//! came before it.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blocks::round_i;
use crate::geometry::{point_in_polygon, polygon_centroid, rect_polygon, Bounds, Point};
use crate::params::Params;
use crate::parcels::{District, Parcel};
use crate::rng::{lerp, rand01, rand_index, rng_for, stable_id};
use crate::roads::{closest_road, Polyline};
use crate::spatial::SpatialGrid;

/// Fill colors buildings pick from.
pub const PALETTE: [&str; 7] = [
    "#6c4a3a", "#715243", "#5d3f33", "#7a5a47", "#4f3a32", "#8a6a53", "#9aa3ab",
];

/// Default fill for buildings without a recorded color.
pub const DEFAULT_FILL: &str = "#6c4a3a";

/// Footprints that do not fit their parcel are shrunk by this factor once.
const SHRINK_FACTOR: f64 = 0.82;

/// Footprints never exceed this share of the parcel bounding box.
const MAX_BBOX_SHARE: f64 = 0.75;

/// Lower bound for the maximum footprint side.
const MIN_MAX_SIDE: f64 = 6.0;

/// Smallest overlap grid cell.
const MIN_GRID_CELL: f64 = 18.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BuildingKind {
    #[default]
    Home,
    Shop,
    Civic,
    Landmark,
}

impl BuildingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildingKind::Home => "home",
            BuildingKind::Shop => "shop",
            BuildingKind::Civic => "civic",
            BuildingKind::Landmark => "landmark",
        }
    }
}

impl std::fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildingStyle {
    pub fill: String,
}

impl Default for BuildingStyle {
    fn default() -> Self {
        Self {
            fill: DEFAULT_FILL.to_owned(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildingMeta {
    pub kind: BuildingKind,
    /// Always at least 1.
    pub levels: u32,
    pub district: District,
}

/// A placed building. The only entity that may be edited after generation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    pub id: String,
    /// Rotated rectangle, four points.
    pub footprint: Vec<Point>,
    pub bbox: Bounds,
    pub style: BuildingStyle,
    pub meta: BuildingMeta,
}

impl Building {
    /// `true` if `p` lies inside the footprint.
    pub fn contains(&self, p: Point) -> bool {
        self.bbox.contains(p) && point_in_polygon(p, &self.footprint)
    }
}

/// Counters describing one placement run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementStats {
    pub parcels: usize,
    pub placed: usize,
    /// Parcels whose footprint did not fit and whose centroid lies outside the parcel.
    pub rejected_fit: usize,
    /// Footprints that overlapped an earlier building.
    pub rejected_overlap: usize,
    /// Footprints that had to be shrunk once.
    pub shrunk: usize,
    /// `true` if a civic building was promoted to landmark.
    pub landmark: bool,
}

/// Direction of the parcel edge whose midpoint is closest to a road, or `0` without roads.
pub fn frontage_angle(polygon: &[Point], polylines: &[Polyline]) -> f64 {
    let n = polygon.len();
    let mut best: Option<(f64, f64)> = None;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let mid = (a + b) * 0.5;
        let Some(hit) = closest_road(mid, polylines) else {
            continue;
        };
        if best.is_none_or(|(dist, _)| hit.distance < dist) {
            let d = b - a;
            best = Some((hit.distance, d.y.atan2(d.x)));
        }
    }
    best.map_or(0.0, |(_, angle)| angle)
}

fn polygon_inside(poly: &[Point], container: &[Point]) -> bool {
    poly.iter().all(|p| point_in_polygon(*p, container))
}

fn pick_kind(rng: &mut dyn RngCore, district: District) -> BuildingKind {
    let (civic, shop) = match district {
        District::Core => (0.18, 0.45),
        District::Inner => (0.1, 0.35),
        District::Outer => {
            return if rand01(rng) < 0.08 {
                BuildingKind::Shop
            } else {
                BuildingKind::Home
            };
        }
    };
    if rand01(rng) < civic {
        BuildingKind::Civic
    } else if rand01(rng) < shop {
        BuildingKind::Shop
    } else {
        BuildingKind::Home
    }
}

fn pick_levels(rng: &mut dyn RngCore, district: District, kind: BuildingKind) -> u32 {
    let mut levels = 1;
    if district == District::Core && rand01(rng) < 0.6 {
        levels += 1;
    }
    if kind == BuildingKind::Civic && rand01(rng) < 0.6 {
        levels += 1;
    }
    if rand01(rng) < 0.1 {
        levels += 1;
    }
    levels
}

fn pick_fill(rng: &mut dyn RngCore) -> String {
    let index = rand_index(rng, PALETTE.len());
    PALETTE[index].to_owned()
}

/// Place at most one building per parcel, in parcel order.
pub fn place_buildings(
    params: &Params,
    parcels: &[Parcel],
    polylines: &[Polyline],
) -> Vec<Building> {
    place_buildings_with_stats(params, parcels, polylines).0
}

/// Place buildings and report rejections.
pub fn place_buildings_with_stats(
    params: &Params,
    parcels: &[Parcel],
    polylines: &[Polyline],
) -> (Vec<Building>, PlacementStats) {
    let mut grid: SpatialGrid<usize> = SpatialGrid::new(params.b_max.max(MIN_GRID_CELL));
    let mut buildings: Vec<Building> = Vec::new();
    let mut stats = PlacementStats {
        parcels: parcels.len(),
        ..Default::default()
    };

    for parcel in parcels {
        let mut rng = rng_for(&params.seed, &parcel.id, "building");
        let centroid = polygon_centroid(&parcel.polygon);
        let district = parcel.district;
        let angle = frontage_angle(&parcel.polygon, polylines);

        let max_w = (parcel.bbox.width() * MAX_BBOX_SHARE).max(MIN_MAX_SIDE);
        let max_h = (parcel.bbox.height() * MAX_BBOX_SHARE).max(MIN_MAX_SIDE);
        let base = lerp(params.b_min, params.b_max, rand01(&mut rng));
        let scale = district.scale();
        let mut w = max_w.min(base * scale * lerp(0.8, 1.2, rand01(&mut rng)));
        let mut h = max_h.min(base * scale * lerp(0.8, 1.3, rand01(&mut rng)));

        let mut footprint = rect_polygon(centroid, w, h, angle);
        if !polygon_inside(&footprint, &parcel.polygon) {
            w *= SHRINK_FACTOR;
            h *= SHRINK_FACTOR;
            footprint = rect_polygon(centroid, w, h, angle);
            stats.shrunk += 1;
            if !polygon_inside(&footprint, &parcel.polygon)
                && !point_in_polygon(centroid, &parcel.polygon)
            {
                debug!("Parcel {}: footprint does not fit.", parcel.id);
                stats.rejected_fit += 1;
                continue;
            }
        }

        let bbox = Bounds::from_points(&footprint);
        if grid.any_overlap(&bbox) {
            stats.rejected_overlap += 1;
            continue;
        }

        let signature = format!(
            "{}:{}:{}:{}:{}",
            round_i(centroid.x),
            round_i(centroid.y),
            round_i(w),
            round_i(h),
            district
        );
        let kind = pick_kind(&mut rng, district);
        let levels = pick_levels(&mut rng, district, kind);
        let fill = pick_fill(&mut rng);

        grid.insert(buildings.len(), bbox);
        buildings.push(Building {
            id: stable_id("b_", &params.seed, &signature),
            footprint,
            bbox,
            style: BuildingStyle { fill },
            meta: BuildingMeta {
                kind,
                levels,
                district,
            },
        });
    }

    stats.landmark = promote_landmark(&mut buildings);
    stats.placed = buildings.len();
    (buildings, stats)
}

/// Turn the core civic building closest to the origin into the landmark.
/// Returns `false` if there is no core civic building.
pub fn promote_landmark(buildings: &mut [Building]) -> bool {
    let mut best: Option<(usize, f64)> = None;
    for (i, b) in buildings.iter().enumerate() {
        if b.meta.kind != BuildingKind::Civic || b.meta.district != District::Core {
            continue;
        }
        let d = b.bbox.center().length_squared();
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    match best {
        Some((i, _)) => {
            buildings[i].meta.kind = BuildingKind::Landmark;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_area;
    use crate::roads::RoadKind;

    fn parcel(id: &str, polygon: Vec<Point>, district: District) -> Parcel {
        Parcel {
            id: id.to_owned(),
            bbox: Bounds::from_points(&polygon),
            polygon,
            block_id: "block_x".to_owned(),
            district,
        }
    }

    fn square(cx: f64, cy: f64, half: f64) -> Vec<Point> {
        vec![
            Point::new(cx - half, cy - half),
            Point::new(cx + half, cy - half),
            Point::new(cx + half, cy + half),
            Point::new(cx - half, cy + half),
        ]
    }

    #[test]
    fn frontage_follows_nearest_edge() {
        let poly = square(0.0, 0.0, 10.0);
        let road = Polyline::new(
            RoadKind::Main,
            4.0,
            vec![Point::new(30.0, -50.0), Point::new(30.0, 50.0)],
        );
        // Right edge runs from (10, -10) to (10, 10).
        let angle = frontage_angle(&poly, &[road]);
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(frontage_angle(&poly, &[]), 0.0);
    }

    #[test]
    fn buildings_fit_their_parcels() {
        let params = Params::default();
        let parcels = vec![
            parcel("p1", square(0.0, 0.0, 30.0), District::Core),
            parcel("p2", square(100.0, 0.0, 30.0), District::Inner),
            parcel("p3", square(300.0, 0.0, 40.0), District::Outer),
        ];
        let (buildings, stats) = place_buildings_with_stats(&params, &parcels, &[]);
        assert_eq!(buildings.len(), 3);
        assert_eq!(stats.placed, 3);
        for (b, p) in buildings.iter().zip(&parcels) {
            assert_eq!(b.footprint.len(), 4);
            assert!(b.footprint.iter().all(|q| point_in_polygon(*q, &p.polygon)));
            assert!(polygon_area(&b.footprint).abs() > 0.0);
            assert!(b.meta.levels >= 1);
            assert_eq!(b.meta.district, p.district);
            assert!(PALETTE.contains(&b.style.fill.as_str()));
            assert!(b.id.starts_with("b_"));
        }
    }

    #[test]
    fn overlapping_parcels_keep_the_first_building() {
        let params = Params::default();
        let parcels = vec![
            parcel("p1", square(0.0, 0.0, 30.0), District::Inner),
            parcel("p2", square(1.0, 1.0, 30.0), District::Inner),
        ];
        let (buildings, stats) = place_buildings_with_stats(&params, &parcels, &[]);
        assert_eq!(buildings.len(), 1);
        assert_eq!(stats.rejected_overlap, 1);
    }

    #[test]
    fn buildings_do_not_depend_on_parcel_order() {
        let params = Params::default();
        let parcels = vec![
            parcel("p1", square(0.0, 0.0, 30.0), District::Core),
            parcel("p2", square(200.0, 0.0, 30.0), District::Inner),
        ];
        let forward = place_buildings(&params, &parcels, &[]);
        let reversed: Vec<_> = parcels.iter().rev().cloned().collect();
        let backward = place_buildings(&params, &reversed, &[]);
        assert_eq!(forward.len(), 2);
        assert_eq!(forward[0], backward[1]);
        assert_eq!(forward[1], backward[0]);
    }

    #[test]
    fn levels_and_kinds_follow_district_tables() {
        struct Const(u32);
        impl RngCore for Const {
            fn next_u32(&mut self) -> u32 {
                self.0
            }
            fn next_u64(&mut self) -> u64 {
                self.0 as u64
            }
            fn fill_bytes(&mut self, dest: &mut [u8]) {
                dest.fill(0);
            }
        }
        // r = 0 everywhere: civic in core and inner, shop outside.
        let mut zero = Const(0);
        assert_eq!(pick_kind(&mut zero, District::Core), BuildingKind::Civic);
        assert_eq!(pick_kind(&mut zero, District::Inner), BuildingKind::Civic);
        assert_eq!(pick_kind(&mut zero, District::Outer), BuildingKind::Shop);
        assert_eq!(pick_levels(&mut zero, District::Core, BuildingKind::Civic), 4);
        assert_eq!(pick_levels(&mut zero, District::Outer, BuildingKind::Home), 2);
        assert_eq!(pick_fill(&mut zero), PALETTE[0]);

        // r close to 1: always home, single level, last color.
        let mut high = Const(u32::MAX);
        assert_eq!(pick_kind(&mut high, District::Core), BuildingKind::Home);
        assert_eq!(pick_levels(&mut high, District::Core, BuildingKind::Civic), 1);
        assert_eq!(pick_fill(&mut high), PALETTE[6]);
    }

    #[test]
    fn landmark_is_the_central_core_civic() {
        let make = |x: f64, kind: BuildingKind, district: District| Building {
            id: format!("b_{x}"),
            footprint: square(x, 0.0, 2.0),
            bbox: Bounds::from_points(&square(x, 0.0, 2.0)),
            style: BuildingStyle::default(),
            meta: BuildingMeta {
                kind,
                levels: 1,
                district,
            },
        };
        let mut buildings = vec![
            make(50.0, BuildingKind::Civic, District::Core),
            make(5.0, BuildingKind::Shop, District::Core),
            make(20.0, BuildingKind::Civic, District::Core),
            make(1.0, BuildingKind::Civic, District::Inner),
        ];
        assert!(promote_landmark(&mut buildings));
        assert_eq!(buildings[2].meta.kind, BuildingKind::Landmark);
        assert_eq!(buildings[0].meta.kind, BuildingKind::Civic);
        assert_eq!(buildings[3].meta.kind, BuildingKind::Civic);

        let mut none = vec![make(1.0, BuildingKind::Home, District::Core)];
        assert!(!promote_landmark(&mut none));
    }
}
