//! Block extraction by rasterizing the road network.
//!
//! Roads are stroked into a binary mask, open regions inside the town are flood filled,
//! each region's outline is traced with marching squares and simplified, and the result
//! becomes a [`Block`]. Working on a raster bounds the cost regardless of road topology,
//! at the price of sub-pixel fidelity.
pub mod contour;
pub mod flood;
pub mod mask;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{circle_polygon, polygon_area, polygon_centroid, simplify_rdp, Bounds, Point};
use crate::params::{Params, Viewport};
use crate::rng::stable_id;
use crate::roads::Polyline;

pub use contour::trace_contour;
pub use flood::{flood_components, Component, Labels};
pub use mask::{rasterize_roads, RoadMask};

/// Components and polygons smaller than this many square units are discarded.
pub const MIN_BLOCK_AREA: f64 = 140.0;

/// RDP tolerance in raster units.
pub const SIMPLIFY_EPSILON: f64 = 2.0;

/// Vertex count of the fallback circle block.
pub const FALLBACK_STEPS: usize = 48;

/// Fallback circle radius as a fraction of the town radius.
pub const FALLBACK_RADIUS_FACTOR: f64 = 0.92;

/// A road-bounded region of the town.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: String,
    pub polygon: Vec<Point>,
    /// Absolute polygon area.
    pub area: f64,
    pub bbox: Bounds,
}

impl Block {
    fn new(id: String, polygon: Vec<Point>) -> Self {
        let area = polygon_area(&polygon).abs();
        let bbox = Bounds::from_points(&polygon);
        Self {
            id,
            polygon,
            area,
            bbox,
        }
    }

    pub fn centroid(&self) -> Point {
        polygon_centroid(&self.polygon)
    }
}

/// Counters describing one extraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockStats {
    /// Components found by the flood fill.
    pub components: usize,
    /// Components rejected for touching the raster edge.
    pub edge_components: usize,
    /// Components rejected for not bordering any road.
    pub unbounded: usize,
    /// Components or polygons rejected for size, shape or position.
    pub rejected: usize,
    /// `true` if no block survived and the fallback circle was emitted.
    pub fallback: bool,
}

/// Extract blocks from the road polylines.
pub fn extract_blocks(params: &Params, polylines: &[Polyline], viewport: Viewport) -> Vec<Block> {
    extract_blocks_with_stats(params, polylines, viewport).0
}

/// Extract blocks and report what was discarded along the way.
///
/// Never returns an empty list: when every component is rejected, a single circular block
/// at `FALLBACK_RADIUS_FACTOR * town_radius` is produced instead.
pub fn extract_blocks_with_stats(
    params: &Params,
    polylines: &[Polyline],
    viewport: Viewport,
) -> (Vec<Block>, BlockStats) {
    let (w, h) = viewport.pixel_size();
    let mask = rasterize_roads(polylines, w, h);
    let (labels, components) = flood_components(&mask, params.town_radius);
    let origin = mask.origin();
    let r2 = params.town_radius * params.town_radius;

    let mut stats = BlockStats {
        components: components.len(),
        ..Default::default()
    };
    let mut blocks = Vec::new();

    for comp in &components {
        if comp.touches_edge {
            stats.edge_components += 1;
            continue;
        }
        if !comp.touches_road {
            stats.unbounded += 1;
            continue;
        }
        if (comp.area as f64) < MIN_BLOCK_AREA {
            stats.rejected += 1;
            continue;
        }
        let Some(contour) = trace_contour(&labels, comp) else {
            stats.rejected += 1;
            continue;
        };

        let world: Vec<Point> = contour.into_iter().map(|p| p - origin).collect();
        let simplified = simplify_rdp(&world, SIMPLIFY_EPSILON);
        if simplified.len() < 4 {
            stats.rejected += 1;
            continue;
        }
        let area = polygon_area(&simplified).abs();
        if area < MIN_BLOCK_AREA {
            stats.rejected += 1;
            continue;
        }
        let centroid = polygon_centroid(&simplified);
        if centroid.length_squared() > r2 {
            debug!(
                "Dropping component {} with centroid outside the town ({:.1}, {:.1}).",
                comp.label, centroid.x, centroid.y
            );
            stats.rejected += 1;
            continue;
        }

        let signature = format!(
            "{}:{}:{}",
            round_i(centroid.x),
            round_i(centroid.y),
            round_i(area)
        );
        blocks.push(Block::new(
            stable_id("block_", &params.seed, &signature),
            simplified,
        ));
    }

    if blocks.is_empty() {
        warn!(
            "No blocks survived extraction ({} components); using fallback circle.",
            stats.components
        );
        stats.fallback = true;
        blocks.push(fallback_block(params));
    }

    (blocks, stats)
}

/// Circular block covering most of the town.
pub fn fallback_block(params: &Params) -> Block {
    let polygon = circle_polygon(params.town_radius * FALLBACK_RADIUS_FACTOR, FALLBACK_STEPS);
    let area = polygon_area(&polygon).abs();
    let id = stable_id(
        "block_",
        &params.seed,
        &format!("fallback:{}", round_i(area)),
    );
    Block::new(id, polygon)
}

/// Round half away from zero, matching the signatures used in ids.
#[inline]
pub(crate) fn round_i(v: f64) -> i64 {
    v.round() as i64
}
