//! High-level runner chaining the generation stages into a [`Town`].
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::blocks::{extract_blocks_with_stats, Block};
use crate::buildings::{place_buildings_with_stats, Building, BuildingKind};
use crate::decor::{generate_decor, Decor};
use crate::error::Result;
use crate::params::{Params, Viewport};
use crate::parcels::{subdivide_blocks, Parcel};
use crate::rng::make_rng;
use crate::roads::{synthesize_road_graph, Roads};
use crate::town::events::{EventSink, TownEvent, TownEventKind, TownSummary};

/// Pipeline stage, in execution order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Decor,
    Roads,
    Blocks,
    Parcels,
    Buildings,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Decor,
        Stage::Roads,
        Stage::Blocks,
        Stage::Parcels,
        Stage::Buildings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Decor => "decor",
            Stage::Roads => "roads",
            Stage::Blocks => "blocks",
            Stage::Parcels => "parcels",
            Stage::Buildings => "buildings",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All layers of a generated town.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Town {
    pub roads: Roads,
    pub blocks: Vec<Block>,
    pub parcels: Vec<Parcel>,
    pub buildings: Vec<Building>,
    pub decor: Decor,
}

impl Town {
    /// Item counts per layer.
    pub fn summary(&self) -> TownSummary {
        TownSummary {
            road_nodes: self.roads.graph.nodes.len(),
            road_edges: self.roads.graph.edges.len(),
            polylines: self.roads.polylines.len(),
            blocks: self.blocks.len(),
            parcels: self.parcels.len(),
            buildings: self.buildings.len(),
            trees: self.decor.trees.len(),
        }
    }
}

/// Validated parameters and viewport ready to generate towns.
#[derive(Debug, Clone)]
pub struct TownGenerator {
    /// Parameters applied to every run.
    pub params: Params,
    /// Raster size used for block extraction.
    pub viewport: Viewport,
}

impl TownGenerator {
    pub fn try_new(params: Params, viewport: Viewport) -> Result<Self> {
        params.validate()?;
        viewport.validate()?;
        Ok(Self { params, viewport })
    }

    pub fn new(params: Params, viewport: Viewport) -> Self {
        debug_assert!(params.validate().is_ok(), "params must be valid");
        debug_assert!(viewport.validate().is_ok(), "viewport must be valid");
        Self { params, viewport }
    }

    /// Generates a town.
    pub fn generate(&self) -> Town {
        run_pipeline(&self.params, self.viewport, &mut ())
    }

    pub fn generate_with_events(&self, sink: &mut dyn EventSink) -> Town {
        run_pipeline(&self.params, self.viewport, sink)
    }
}

/// Validate `params` and `viewport`, then generate a town.
pub fn generate_town(params: &Params, viewport: Viewport) -> Result<Town> {
    Ok(TownGenerator::try_new(params.clone(), viewport)?.generate())
}

/// Like [`generate_town`], reporting progress to `sink`.
pub fn generate_town_with_events(
    params: &Params,
    viewport: Viewport,
    sink: &mut dyn EventSink,
) -> Result<Town> {
    Ok(TownGenerator::try_new(params.clone(), viewport)?.generate_with_events(sink))
}

fn stage_started(sink: &mut dyn EventSink, stage: Stage) {
    if sink.wants(TownEventKind::StageStarted) {
        sink.send(TownEvent::StageStarted { stage });
    }
}

fn stage_finished(sink: &mut dyn EventSink, stage: Stage, items: usize, rejected: usize) {
    if sink.wants(TownEventKind::StageFinished) {
        sink.send(TownEvent::StageFinished {
            stage,
            items,
            rejected,
        });
    }
}

fn warning(sink: &mut dyn EventSink, stage: Stage, message: String) {
    if sink.wants(TownEventKind::Warning) {
        sink.send(TownEvent::Warning {
            context: format!("stage:{stage}"),
            message,
        });
    }
}

/// Run every stage on one shared stream, in the fixed order decor, roads, blocks,
/// parcels. Buildings draw from per-parcel streams only.
fn run_pipeline(params: &Params, viewport: Viewport, sink: &mut dyn EventSink) -> Town {
    let started = Instant::now();
    if sink.wants(TownEventKind::RunStarted) {
        sink.send(TownEvent::RunStarted {
            params: params.clone(),
            viewport,
        });
    }

    let mut rng = make_rng(&params.seed);

    stage_started(sink, Stage::Decor);
    let decor = generate_decor(&mut rng, params.town_radius);
    stage_finished(sink, Stage::Decor, decor.fields.len() + decor.trees.len(), 0);

    stage_started(sink, Stage::Roads);
    let roads = Roads::from_graph(synthesize_road_graph(&mut rng, params));
    info!(
        "Stage {}: {} nodes, {} edges, {} polylines.",
        Stage::Roads,
        roads.graph.nodes.len(),
        roads.graph.edges.len(),
        roads.polylines.len()
    );
    stage_finished(sink, Stage::Roads, roads.graph.edges.len(), 0);

    stage_started(sink, Stage::Blocks);
    let (blocks, block_stats) = extract_blocks_with_stats(params, &roads.polylines, viewport);
    info!(
        "Stage {}: {} blocks from {} components ({} on the edge, {} unbounded, {} rejected).",
        Stage::Blocks,
        blocks.len(),
        block_stats.components,
        block_stats.edge_components,
        block_stats.unbounded,
        block_stats.rejected
    );
    if block_stats.fallback {
        if sink.wants(TownEventKind::FallbackBlock) {
            sink.send(TownEvent::FallbackBlock {
                components: block_stats.components,
            });
        }
        warning(
            sink,
            Stage::Blocks,
            "No road-bounded block survived; using the fallback circle".into(),
        );
    }
    stage_finished(
        sink,
        Stage::Blocks,
        blocks.len(),
        block_stats.edge_components + block_stats.unbounded + block_stats.rejected,
    );

    stage_started(sink, Stage::Parcels);
    let parcels = subdivide_blocks(&mut rng, params, &blocks);
    info!("Stage {}: {} parcels.", Stage::Parcels, parcels.len());
    stage_finished(sink, Stage::Parcels, parcels.len(), 0);

    stage_started(sink, Stage::Buildings);
    let (buildings, placement) = place_buildings_with_stats(params, &parcels, &roads.polylines);
    info!(
        "Stage {}: {} buildings on {} parcels ({} did not fit, {} overlapped).",
        Stage::Buildings,
        buildings.len(),
        placement.parcels,
        placement.rejected_fit,
        placement.rejected_overlap
    );
    if buildings.is_empty() && !parcels.is_empty() {
        warn!("No building could be placed on {} parcels.", parcels.len());
        warning(
            sink,
            Stage::Buildings,
            format!("No building could be placed on {} parcels", parcels.len()),
        );
    }
    if sink.wants(TownEventKind::LandmarkChosen) {
        if let Some(landmark) = buildings
            .iter()
            .find(|b| b.meta.kind == BuildingKind::Landmark)
        {
            sink.send(TownEvent::LandmarkChosen {
                building_id: landmark.id.clone(),
            });
        }
    }
    stage_finished(
        sink,
        Stage::Buildings,
        buildings.len(),
        placement.rejected_fit + placement.rejected_overlap,
    );

    let town = Town {
        roads,
        blocks,
        parcels,
        buildings,
        decor,
    };
    let summary = town.summary();
    info!(
        "Generated town '{}' in {:.1} ms: {} blocks, {} parcels, {} buildings.",
        params.seed,
        started.elapsed().as_secs_f64() * 1000.0,
        summary.blocks,
        summary.parcels,
        summary.buildings
    );
    if sink.wants(TownEventKind::RunFinished) {
        sink.send(TownEvent::RunFinished { summary });
    }
    town
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::town::events::VecSink;

    fn small_params() -> Params {
        Params::new("runner").with_town_radius(200.0)
    }

    #[test]
    fn try_new_rejects_invalid_input() {
        let bad = Params::default().with_town_radius(-1.0);
        assert!(matches!(
            TownGenerator::try_new(bad, Viewport::new(100.0, 100.0)),
            Err(Error::InvalidParams(_))
        ));
        assert!(matches!(
            TownGenerator::try_new(Params::default(), Viewport::new(0.0, 100.0)),
            Err(Error::InvalidViewport { .. })
        ));
    }

    #[test]
    fn stages_are_reported_in_order() {
        let params = small_params();
        let mut sink = VecSink::new();
        let town = generate_town_with_events(&params, Viewport::fitting(&params), &mut sink)
            .expect("valid input");

        let started: Vec<Stage> = sink
            .as_slice()
            .iter()
            .filter_map(|e| match e {
                TownEvent::StageStarted { stage } => Some(*stage),
                _ => None,
            })
            .collect();
        assert_eq!(started, Stage::ALL);

        assert!(matches!(
            sink.as_slice().first(),
            Some(TownEvent::RunStarted { .. })
        ));
        match sink.as_slice().last() {
            Some(TownEvent::RunFinished { summary }) => assert_eq!(*summary, town.summary()),
            other => panic!("unexpected last event {other:?}"),
        }
    }

    #[test]
    fn events_do_not_change_the_result() {
        let params = small_params();
        let vp = Viewport::fitting(&params);
        let plain = generate_town(&params, vp).expect("valid input");
        let mut sink = VecSink::new();
        let observed = generate_town_with_events(&params, vp, &mut sink).expect("valid input");
        assert_eq!(plain, observed);
    }

    #[test]
    fn missing_roads_report_the_fallback() {
        let params = small_params().with_main_roads(0).with_ring_roads(0);
        let mut sink = VecSink::filtered([TownEventKind::FallbackBlock]);
        let town = generate_town_with_events(&params, Viewport::fitting(&params), &mut sink)
            .expect("valid input");
        assert_eq!(town.blocks.len(), 1);
        assert_eq!(town.blocks[0], crate::blocks::fallback_block(&params));
        assert_eq!(sink.len(), 1);
    }
}
