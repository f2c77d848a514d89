use town_gen::prelude::*;
use town_gen::scene::{migrate_v1_to_v2, LegacyBuildingV1};
use town_gen_examples::{init_tracing, params_from_args};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let params = params_from_args()?;
    let viewport = Viewport::fitting(&params);
    let mut scene = Scene::generate(params.clone(), viewport)?;

    // Pick the building under the town center, or the first one.
    let target = scene
        .hit_test(Point::ZERO)
        .or_else(|| scene.buildings().first())
        .map(|b| b.id.clone())
        .ok_or_else(|| anyhow::anyhow!("town has no buildings"))?;

    scene.select(&target)?;
    scene.set_building_fill(&target, "#c0392b")?;
    scene.set_building_kind(&target, BuildingKind::Shop)?;
    scene.set_building_levels(&target, 3)?;
    if let Some(b) = scene.building(&target) {
        println!(
            "edited {}: {} with {} levels, fill {}",
            b.id, b.meta.kind, b.meta.levels, b.style.fill
        );
    }

    let removed = scene.delete_building(&target)?;
    println!(
        "deleted {}; selected: {}; {} buildings left",
        removed.id,
        scene.is_selected(&target),
        scene.buildings().len()
    );

    // A version 1 scene with only polylines and bare building outlines.
    let legacy = LegacySceneV1 {
        params: params.clone(),
        roads: scene.layers.roads.polylines.clone(),
        blocks: scene.layers.blocks.clone(),
        parcels: Vec::new(),
        buildings: scene
            .buildings()
            .iter()
            .take(3)
            .map(|b| LegacyBuildingV1 {
                id: b.id.clone(),
                poly: b.footprint.clone(),
                color: None,
            })
            .collect(),
        decor: scene.layers.decor.clone(),
    };
    let direct = migrate_v1_to_v2(legacy.clone());
    let upgraded = SceneRecord::from(legacy).upgrade()?;
    println!(
        "upgraded v1 scene to v{}: {} road nodes, {} buildings, chain matches direct step: {}",
        upgraded.version,
        upgraded.layers.roads.graph.nodes.len(),
        upgraded.buildings().len(),
        upgraded == direct
    );

    Ok(())
}
