//! Planar geometry used across the pipeline.
//!
//! Points are [`glam::DVec2`] in world units with the town center at the origin.
//! Polygons are plain point slices; the closing edge from the last vertex back to the
//! first is implicit.
pub mod bounds;
pub mod polygon;

pub use bounds::Bounds;
pub use polygon::{
    circle_polygon, closest_point_on_segment, point_in_polygon, polygon_area, polygon_centroid,
    rect_polygon, rotate, simplify_rdp,
};

/// A point in world space.
pub type Point = glam::DVec2;
