//! Scene aggregate: a versioned town with selection, building edits and migration of
//! older scene records.
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::blocks::Block;
use crate::buildings::{Building, BuildingKind, BuildingMeta, BuildingStyle, DEFAULT_FILL};
use crate::decor::Decor;
use crate::error::{Error, Result};
use crate::geometry::{polygon_centroid, Bounds, Point};
use crate::params::{Params, Viewport};
use crate::parcels::{District, Parcel};
use crate::roads::{merge_polylines, Polyline, RoadGraph, Roads};
use crate::town::{generate_town, Town};

/// Version written by this crate.
pub const SCENE_VERSION: u32 = 2;

/// A generated town together with the parameters that produced it and the current
/// building selection.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub version: u32,
    pub params: Params,
    pub layers: Town,
    selection: BTreeSet<String>,
}

impl Scene {
    /// Empty scene for `params`.
    pub fn new(params: Params) -> Self {
        Self {
            version: SCENE_VERSION,
            params,
            layers: Town::default(),
            selection: BTreeSet::new(),
        }
    }

    /// Generate a scene from scratch.
    pub fn generate(params: Params, viewport: Viewport) -> Result<Self> {
        let mut scene = Self::new(params);
        scene.regenerate(viewport)?;
        Ok(scene)
    }

    /// Replace every layer with a fresh town from the current parameters. Clears the
    /// selection and discards any building edits.
    pub fn regenerate(&mut self, viewport: Viewport) -> Result<()> {
        let town = generate_town(&self.params, viewport)?;
        self.selection.clear();
        self.layers = town;
        Ok(())
    }

    /// Install already generated layers. Selected ids that no longer exist are dropped.
    pub fn apply(&mut self, town: Town) {
        self.layers = town;
        let layers = &self.layers;
        self.selection
            .retain(|id| layers.buildings.iter().any(|b| &b.id == id));
    }

    pub fn buildings(&self) -> &[Building] {
        &self.layers.buildings
    }

    pub fn building(&self, id: &str) -> Option<&Building> {
        self.layers.buildings.iter().find(|b| b.id == id)
    }

    fn building_mut(&mut self, id: &str) -> Result<&mut Building> {
        self.layers
            .buildings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| Error::UnknownBuilding { id: id.to_owned() })
    }

    /// Add a building to the selection.
    pub fn select(&mut self, id: &str) -> Result<()> {
        if self.building(id).is_none() {
            return Err(Error::UnknownBuilding { id: id.to_owned() });
        }
        self.selection.insert(id.to_owned());
        Ok(())
    }

    /// Remove a building from the selection. Returns `false` if it was not selected.
    pub fn deselect(&mut self, id: &str) -> bool {
        self.selection.remove(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Selected building ids in ascending order.
    pub fn selection(&self) -> impl Iterator<Item = &str> {
        self.selection.iter().map(String::as_str)
    }

    pub fn set_building_fill(&mut self, id: &str, fill: impl Into<String>) -> Result<()> {
        self.building_mut(id)?.style.fill = fill.into();
        Ok(())
    }

    pub fn set_building_kind(&mut self, id: &str, kind: BuildingKind) -> Result<()> {
        self.building_mut(id)?.meta.kind = kind;
        Ok(())
    }

    /// Set the level count, clamped to at least 1.
    pub fn set_building_levels(&mut self, id: &str, levels: u32) -> Result<()> {
        self.building_mut(id)?.meta.levels = levels.max(1);
        Ok(())
    }

    /// Remove a building and its selection entry.
    pub fn delete_building(&mut self, id: &str) -> Result<Building> {
        let index = self
            .layers
            .buildings
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| Error::UnknownBuilding { id: id.to_owned() })?;
        self.selection.remove(id);
        debug!("Deleted building {}.", id);
        Ok(self.layers.buildings.remove(index))
    }

    /// Topmost building under `point`. Later buildings are drawn over earlier ones and
    /// win.
    pub fn hit_test(&self, point: Point) -> Option<&Building> {
        self.layers.buildings.iter().rev().find(|b| b.contains(point))
    }

    /// Re-derive road polylines from the graph if they are missing. Returns `true` if
    /// they were rebuilt.
    pub fn ensure_polylines(&mut self) -> bool {
        let roads = &mut self.layers.roads;
        if !roads.polylines.is_empty() || roads.graph.edges.is_empty() {
            return false;
        }
        roads.polylines = merge_polylines(&roads.graph);
        true
    }
}

/// Building as stored by version 1 scenes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyBuildingV1 {
    pub id: String,
    pub poly: Vec<Point>,
    pub color: Option<String>,
}

/// Version 1 scene: roads were a flat polyline list without a graph and buildings had
/// no metadata.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LegacySceneV1 {
    pub params: Params,
    pub roads: Vec<Polyline>,
    pub blocks: Vec<Block>,
    pub parcels: Vec<Parcel>,
    pub buildings: Vec<LegacyBuildingV1>,
    pub decor: Decor,
}

/// Upgrade a version 1 scene.
///
/// The road graph is rebuilt from the polylines; buildings become homes with one level
/// in the district of their centroid, filled with their old color or the default fill.
pub fn migrate_v1_to_v2(v1: LegacySceneV1) -> Scene {
    let LegacySceneV1 {
        params,
        roads,
        blocks,
        parcels,
        buildings,
        decor,
    } = v1;

    let graph = RoadGraph::from_polylines(&roads);
    let buildings = buildings
        .into_iter()
        .map(|b| {
            let district = District::for_point(polygon_centroid(&b.poly), params.town_radius);
            Building {
                id: b.id,
                bbox: Bounds::from_points(&b.poly),
                footprint: b.poly,
                style: BuildingStyle {
                    fill: b.color.unwrap_or_else(|| DEFAULT_FILL.to_owned()),
                },
                meta: BuildingMeta {
                    kind: BuildingKind::Home,
                    levels: 1,
                    district,
                },
            }
        })
        .collect();

    let mut scene = Scene::new(params);
    scene.layers = Town {
        roads: Roads {
            graph,
            polylines: roads,
        },
        blocks,
        parcels,
        buildings,
        decor,
    };
    scene
}

/// A scene of any supported version.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneRecord {
    V1(LegacySceneV1),
    /// A current-layout scene; its `version` field is checked on upgrade.
    V2(Scene),
}

impl SceneRecord {
    pub fn version(&self) -> u32 {
        match self {
            SceneRecord::V1(_) => 1,
            SceneRecord::V2(scene) => scene.version,
        }
    }

    /// Apply one migration step.
    fn step(self) -> Result<SceneRecord> {
        match self {
            SceneRecord::V1(v1) => Ok(SceneRecord::V2(migrate_v1_to_v2(v1))),
            SceneRecord::V2(scene) => Err(Error::UnsupportedSceneVersion {
                found: scene.version,
                current: SCENE_VERSION,
            }),
        }
    }

    /// Migrate to [`SCENE_VERSION`]. Versions newer than current, or current-layout
    /// records carrying an older tag, are rejected.
    pub fn upgrade(self) -> Result<Scene> {
        let from = self.version();
        if from > SCENE_VERSION {
            return Err(Error::UnsupportedSceneVersion {
                found: from,
                current: SCENE_VERSION,
            });
        }
        let mut record = self;
        loop {
            match record {
                SceneRecord::V2(scene) if scene.version == SCENE_VERSION => {
                    if from != SCENE_VERSION {
                        info!("Upgraded scene from version {} to {}.", from, SCENE_VERSION);
                    }
                    return Ok(scene);
                }
                other => record = other.step()?,
            }
        }
    }
}

impl From<LegacySceneV1> for SceneRecord {
    fn from(value: LegacySceneV1) -> Self {
        SceneRecord::V1(value)
    }
}

impl From<Scene> for SceneRecord {
    fn from(value: Scene) -> Self {
        SceneRecord::V2(value)
    }
}
