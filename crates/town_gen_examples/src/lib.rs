#![forbid(unsafe_code)]

mod rendering;

pub use rendering::{init_tracing, render_town_ascii, AsciiConfig};

/// Read `seed` and an optional town radius from the command line.
pub fn params_from_args() -> anyhow::Result<town_gen::params::Params> {
    let mut args = std::env::args().skip(1);
    let mut params = town_gen::params::Params::default();
    if let Some(seed) = args.next() {
        params = params.with_seed(seed);
    }
    if let Some(radius) = args.next() {
        let radius: f64 = radius
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid radius '{radius}': {e}"))?;
        params = params.with_town_radius(radius);
    }
    Ok(params.clamped())
}
