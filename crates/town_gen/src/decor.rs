//! Countryside decor around the town: fields, a pond and scattered trees.
use std::f64::consts::TAU;

use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{rect_polygon, Point};
use crate::rng::{lerp, rand01, rand_centered, rand_range};

/// Shade of a field patch.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldTone {
    Light,
    Mid,
    Dark,
}

/// A rotated rectangular field outside the town.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub id: String,
    pub polygon: Vec<Point>,
    pub tone: FieldTone,
}

/// An elliptical pond.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Water {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    pub rot: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tree {
    pub position: Point,
    pub size: f64,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

/// Decor layer of a town.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decor {
    pub fields: Vec<Field>,
    pub water: Water,
    pub trees: Vec<Tree>,
    pub town_boundary: Circle,
}

/// Trees closer than this fraction of the radius to the center are dropped.
const TREE_CLEARING: f64 = 0.25;

/// Generate decor for a town of radius `town_radius`.
///
/// Draw order is fixed (fields, water, then trees) so that later pipeline stages sharing
/// the stream see the same state for a given seed.
pub fn generate_decor(rng: &mut dyn RngCore, town_radius: f64) -> Decor {
    let r = town_radius;

    let field_count = 8 + (rand01(rng) * 7.0).floor() as usize;
    let mut fields = Vec::with_capacity(field_count);
    for i in 0..field_count {
        let ang = rand01(rng) * TAU;
        let dist = rand_range(rng, r * 1.2, r * 2.0);
        let center = Point::new(ang.cos() * dist, ang.sin() * dist);
        let w = rand_range(rng, r * 0.6, r * 1.2);
        let h = rand_range(rng, r * 0.4, r * 1.0);
        let rot = rand_centered(rng, 0.8);
        let tone = if rand01(rng) < 0.45 {
            FieldTone::Light
        } else if rand01(rng) < 0.6 {
            FieldTone::Mid
        } else {
            FieldTone::Dark
        };
        fields.push(Field {
            id: format!("field_{i}"),
            polygon: rect_polygon(center, w, h, rot),
            tone,
        });
    }

    let pond_ang = rand01(rng) * TAU;
    let pond_dist = rand_range(rng, r * 1.25, r * 1.7);
    let water = Water {
        center: Point::new(pond_ang.cos() * pond_dist, pond_ang.sin() * pond_dist),
        rx: rand_range(rng, r * 0.10, r * 0.18),
        ry: rand_range(rng, r * 0.08, r * 0.15),
        rot: rand_centered(rng, 0.6),
    };

    let tree_attempts = 420 + (rand01(rng) * 280.0).floor() as usize;
    let mut trees = Vec::with_capacity(tree_attempts);
    for _ in 0..tree_attempts {
        let a = rand01(rng) * TAU;
        let d = lerp(r * 0.5, r * 2.3, rand01(rng).powf(0.6));
        let x = a.cos() * d + rand_centered(rng, 40.0);
        let y = a.sin() * d + rand_centered(rng, 40.0);
        let position = Point::new(x, y);
        if position.length() < r * TREE_CLEARING {
            continue;
        }
        trees.push(Tree {
            position,
            size: rand_range(rng, 1.0, 2.4),
        });
    }

    debug!("Decor: {} fields, {} trees.", fields.len(), trees.len());

    Decor {
        fields,
        water,
        trees,
        town_boundary: Circle {
            center: Point::ZERO,
            radius: r,
        },
    }
}
