use std::time::Duration;

use criterion::{Criterion, Throughput};
use town_gen::params::{Params, Viewport};

pub const SAMPLE_SIZE: usize = 10;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(3);

/// Town radii benchmarked, smallest first.
pub const RADII: [f64; 3] = [180.0, 300.0, 420.0];

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

pub fn bench_params(radius: f64) -> (Params, Viewport) {
    let params = Params::new("bench").with_town_radius(radius);
    let viewport = Viewport::fitting(&params);
    (params, viewport)
}
