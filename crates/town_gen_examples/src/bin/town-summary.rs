use town_gen::prelude::*;
use town_gen_examples::{init_tracing, params_from_args, render_town_ascii, AsciiConfig};

fn main() -> anyhow::Result<()> {
    init_tracing();
    // Usage: town-summary [seed] [radius]
    let params = params_from_args()?;
    let viewport = Viewport::fitting(&params);

    // Print stage results as they arrive.
    let mut sink = FnSink::new(|event| match event {
        TownEvent::StageFinished {
            stage,
            items,
            rejected,
        } => println!("{stage:>10}: {items:>5} items, {rejected:>5} rejected"),
        TownEvent::FallbackBlock { components } => {
            println!("    blocks: fallback circle ({components} components found)")
        }
        TownEvent::LandmarkChosen { building_id } => println!("  landmark: {building_id}"),
        _ => {}
    });
    let generator = TownGenerator::try_new(params, viewport)?;
    let town = generator.generate_with_events(&mut sink);

    let mut counts = [0usize; 4];
    for b in &town.buildings {
        let slot = match b.meta.kind {
            BuildingKind::Home => 0,
            BuildingKind::Shop => 1,
            BuildingKind::Civic => 2,
            BuildingKind::Landmark => 3,
        };
        counts[slot] += 1;
    }
    println!(
        "buildings: {} home, {} shop, {} civic, {} landmark",
        counts[0], counts[1], counts[2], counts[3]
    );

    print!("{}", render_town_ascii(&town, &AsciiConfig::default()));
    Ok(())
}
