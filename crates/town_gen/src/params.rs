//! Generation parameters and the viewport that sizes the block raster.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunable inputs of one generation run. Together with the seed they fully
/// determine the output.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    /// Seed string keying every random stream.
    pub seed: String,
    /// Radius of the town boundary in world units.
    pub town_radius: f64,
    /// Number of radial main roads.
    pub main_roads: u32,
    /// Number of concentric ring roads.
    pub ring_roads: u32,
    /// Street and parcel density multiplier; `1.2` is the reference density.
    pub density: f64,
    /// Lower building size bound in world units.
    pub b_min: f64,
    /// Upper building size bound in world units.
    pub b_max: f64,
    /// Base road width in world units.
    pub road_width: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            seed: "winack".to_owned(),
            town_radius: 420.0,
            main_roads: 9,
            ring_roads: 2,
            density: 1.2,
            b_min: 10.0,
            b_max: 26.0,
            road_width: 8.0,
        }
    }
}

impl Params {
    /// Default parameters with the given seed.
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    pub fn with_town_radius(mut self, town_radius: f64) -> Self {
        self.town_radius = town_radius;
        self
    }

    pub fn with_main_roads(mut self, main_roads: u32) -> Self {
        self.main_roads = main_roads;
        self
    }

    pub fn with_ring_roads(mut self, ring_roads: u32) -> Self {
        self.ring_roads = ring_roads;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// Sets both building size bounds.
    pub fn with_building_size(mut self, b_min: f64, b_max: f64) -> Self {
        self.b_min = b_min;
        self.b_max = b_max;
        self
    }

    pub fn with_road_width(mut self, road_width: f64) -> Self {
        self.road_width = road_width;
        self
    }

    /// Coerce raw user input into valid parameters.
    ///
    /// Non-finite values take their defaults, the radius and road width are raised to
    /// at least 1, density to at least 0.05, and `b_max` to at least `b_min + 1`.
    pub fn clamped(self) -> Self {
        let defaults = Params::default();
        let finite_or = |v: f64, d: f64| if v.is_finite() { v } else { d };

        let town_radius = finite_or(self.town_radius, defaults.town_radius).max(1.0);
        let density = finite_or(self.density, defaults.density).max(0.05);
        let road_width = finite_or(self.road_width, defaults.road_width).max(1.0);
        let b_min = finite_or(self.b_min, defaults.b_min).max(1.0);
        let b_max = finite_or(self.b_max, defaults.b_max).max(b_min + 1.0);

        Self {
            seed: self.seed,
            town_radius,
            main_roads: self.main_roads,
            ring_roads: self.ring_roads,
            density,
            b_min,
            b_max,
            road_width,
        }
    }

    /// Validates the parameters, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("town_radius", self.town_radius),
            ("density", self.density),
            ("b_min", self.b_min),
            ("b_max", self.b_max),
            ("road_width", self.road_width),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(Error::InvalidParams(format!("{name} must be finite")));
            }
        }
        if self.town_radius <= 0.0 {
            return Err(Error::InvalidParams("town_radius must be > 0".into()));
        }
        if self.density <= 0.0 {
            return Err(Error::InvalidParams("density must be > 0".into()));
        }
        if self.road_width <= 0.0 {
            return Err(Error::InvalidParams("road_width must be > 0".into()));
        }
        if self.b_min <= 0.0 {
            return Err(Error::InvalidParams("b_min must be > 0".into()));
        }
        if self.b_max <= self.b_min {
            return Err(Error::InvalidParams(format!(
                "b_max ({}) must be greater than b_min ({})",
                self.b_max, self.b_min
            )));
        }
        Ok(())
    }
}

/// Size of the raster the block extractor draws roads into, in world units.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Square viewport that fits the whole town plus a margin.
    pub fn fitting(params: &Params) -> Self {
        let side = (params.town_radius * 2.0 + 80.0).ceil();
        Self::new(side, side)
    }

    /// Raster dimensions in whole pixels, at least one each.
    pub fn pixel_size(&self) -> (usize, usize) {
        (
            self.width.floor().max(1.0) as usize,
            self.height.floor().max(1.0) as usize,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width < 1.0
            || self.height < 1.0
        {
            return Err(Error::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl From<mint::Vector2<f64>> for Viewport {
    fn from(v: mint::Vector2<f64>) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<(f64, f64)> for Viewport {
    fn from((width, height): (f64, f64)) -> Self {
        Self::new(width, height)
    }
}
