use glam::DVec2;
use town_gen::buildings::BuildingKind;
use town_gen::geometry::closest_point_on_segment;
use town_gen::roads::RoadKind;
use town_gen::town::Town;
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Character grid settings for [`render_town_ascii`].
#[derive(Debug, Clone, Copy)]
pub struct AsciiConfig {
    pub cols: usize,
    pub rows: usize,
    /// World units shown beyond the town radius on each side.
    pub margin: f64,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            cols: 96,
            rows: 48,
            margin: 40.0,
        }
    }
}

impl AsciiConfig {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            ..Default::default()
        }
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }
}

fn building_glyph(kind: BuildingKind) -> char {
    match kind {
        BuildingKind::Home => 'h',
        BuildingKind::Shop => 's',
        BuildingKind::Civic => 'C',
        BuildingKind::Landmark => '@',
    }
}

fn road_glyph(kind: RoadKind) -> char {
    match kind {
        RoadKind::Main => '#',
        RoadKind::Ring => 'o',
        RoadKind::Minor => '+',
    }
}

/// Render a town as text, one character per cell. Buildings draw over roads, roads
/// over water and trees.
pub fn render_town_ascii(town: &Town, config: &AsciiConfig) -> String {
    let cols = config.cols.max(1);
    let rows = config.rows.max(1);
    let half = town.decor.town_boundary.radius + config.margin;
    let cell = DVec2::new(2.0 * half / cols as f64, 2.0 * half / rows as f64);
    let to_world =
        |c: usize, r: usize| DVec2::new(c as f64 + 0.5, r as f64 + 0.5) * cell - DVec2::splat(half);

    let mut grid = vec![vec![' '; cols]; rows];
    for (r, line) in grid.iter_mut().enumerate() {
        for (c, slot) in line.iter_mut().enumerate() {
            let p = to_world(c, r);
            if p.length() <= town.decor.town_boundary.radius {
                *slot = '.';
            }

            let water = &town.decor.water;
            let local = p - water.center;
            let (s, co) = (-water.rot).sin_cos();
            let q = DVec2::new(local.x * co - local.y * s, local.x * s + local.y * co);
            if water.rx > 0.0
                && water.ry > 0.0
                && (q.x / water.rx).powi(2) + (q.y / water.ry).powi(2) <= 1.0
            {
                *slot = '~';
            }
            if town
                .decor
                .trees
                .iter()
                .any(|t| t.position.distance(p) <= t.size.max(cell.x * 0.5))
            {
                *slot = 't';
            }

            let reach = cell.max_element() * 0.5;
            for road in &town.roads.polylines {
                if road.segments().any(|(a, b)| {
                    p.distance(closest_point_on_segment(p, a, b)) <= (road.width / 2.0).max(reach)
                }) {
                    *slot = road_glyph(road.kind);
                }
            }

            if let Some(b) = town.buildings.iter().rev().find(|b| b.contains(p)) {
                *slot = building_glyph(b.meta.kind);
            }
        }
    }

    let mut out = String::with_capacity((cols + 1) * rows);
    for line in grid {
        out.extend(line);
        out.push('\n');
    }
    out
}
