use town_gen::buildings::place_buildings;
use town_gen::prelude::*;
use town_gen_examples::{init_tracing, params_from_args};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let params = params_from_args()?;
    let viewport = Viewport::fitting(&params);

    // Same seed, same town.
    let a = generate_town(&params, viewport)?;
    let b = generate_town(&params, viewport)?;
    println!("identical runs: {}", a == b);

    // Another seed changes everything downstream of the shared stream.
    let other = generate_town(&params.clone().with_seed(format!("{}-2", params.seed)), viewport)?;
    let shared = other
        .buildings
        .iter()
        .filter(|x| a.buildings.iter().any(|y| y.id == x.id))
        .count();
    println!(
        "other seed: {} buildings, {} ids shared with the first town",
        other.buildings.len(),
        shared
    );

    // Buildings draw from per-parcel streams, so placing parcels in reverse order keeps
    // every building that survives overlap rejection in both runs.
    let mut reversed = a.parcels.clone();
    reversed.reverse();
    let backward = place_buildings(&params, &reversed, &a.roads.polylines);
    let same = backward
        .iter()
        .filter(|x| {
            a.buildings
                .iter()
                .any(|y| y.id == x.id && y.footprint == x.footprint)
        })
        .count();
    println!(
        "reversed parcels: {} of {} buildings unchanged",
        same,
        backward.len()
    );

    Ok(())
}
