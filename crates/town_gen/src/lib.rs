#![forbid(unsafe_code)]
//! town_gen: Deterministic procedural town layouts from a string seed.
//!
//! Modules:
//! - rng: seeded streams, per-entity sub-streams and stable ids
//! - geometry, spatial: polygon helpers and a uniform hash grid
//! - decor: fields, a pond and trees around the town
//! - roads: road graph synthesis, polyline merging, nearest-road queries
//! - blocks: road mask rasterization, flood fill, marching squares, simplification
//! - parcels: recursive axis-aligned subdivision of blocks
//! - buildings: footprint placement with overlap rejection
//! - town: the pipeline runner and its events
//! - scene: versioned scene aggregate with selection, edits and migration
//!
//! For examples, see README and the `town_gen_examples` crate.
pub mod blocks;
pub mod buildings;
pub mod decor;
pub mod error;
pub mod geometry;
pub mod params;
pub mod parcels;
pub mod rng;
pub mod roads;
pub mod scene;
pub mod spatial;
pub mod town;

/// Convenient re-exports for common types. Import with `use town_gen::prelude::*;`.
pub mod prelude {
    pub use crate::blocks::{extract_blocks, Block};
    pub use crate::buildings::{place_buildings, Building, BuildingKind, BuildingMeta};
    pub use crate::decor::{generate_decor, Decor};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Bounds, Point};
    pub use crate::params::{Params, Viewport};
    pub use crate::parcels::{subdivide_blocks, District, Parcel};
    pub use crate::rng::{make_rng, rng_for, stable_id, TownRng};
    pub use crate::roads::{
        merge_polylines, synthesize_road_graph, Polyline, RoadGraph, RoadKind, Roads,
    };
    pub use crate::scene::{LegacySceneV1, Scene, SceneRecord, SCENE_VERSION};
    pub use crate::spatial::SpatialGrid;
    pub use crate::town::{
        generate_town, generate_town_with_events, EventSink, FnSink, MultiSink, Stage, Town,
        TownEvent, TownEventKind, TownGenerator, VecSink,
    };
}
