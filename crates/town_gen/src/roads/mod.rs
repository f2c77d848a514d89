//! Road network: graph synthesis, polyline merging and nearest-road queries.
//!
//! The graph is the owned representation; [`Polyline`]s are derived from it with
//! [`merge_polylines`] and are what rasterization and frontage lookups consume.
pub mod graph;
pub mod merge;
pub mod nearest;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use graph::{synthesize_road_graph, NodeIndex, RoadEdge, RoadGraph, RoadKind, RoadNode};
pub use merge::{merge_polylines, Polyline};
pub use nearest::{closest_road, RoadHit};

/// Roads layer of a town: the graph plus its merged polylines.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Roads {
    pub graph: RoadGraph,
    pub polylines: Vec<Polyline>,
}

impl Roads {
    /// Wrap a graph, deriving its polylines.
    pub fn from_graph(graph: RoadGraph) -> Self {
        let polylines = merge_polylines(&graph);
        Self { graph, polylines }
    }
}
