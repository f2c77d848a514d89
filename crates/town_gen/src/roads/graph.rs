//! Road graph model and the radial/ring/minor synthesizer.
use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, TAU};

use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::Point;
use crate::params::Params;
use crate::rng::{chance, lerp, rand01, rand_centered, rand_index, rand_range};

use super::merge::Polyline;

/// Index of a node in [`RoadGraph::nodes`].
pub type NodeIndex = usize;

/// Road classification. Width and rendering depend on it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoadKind {
    Main,
    Ring,
    Minor,
}

impl RoadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadKind::Main => "main",
            RoadKind::Ring => "ring",
            RoadKind::Minor => "minor",
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RoadNode {
    pub id: String,
    pub position: Point,
}

/// Undirected edge between two nodes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RoadEdge {
    pub id: String,
    pub a: NodeIndex,
    pub b: NodeIndex,
    pub kind: RoadKind,
    pub width: f64,
}

impl RoadEdge {
    /// The endpoint opposite `node`.
    #[inline]
    pub fn other(&self, node: NodeIndex) -> NodeIndex {
        if self.a == node {
            self.b
        } else {
            self.a
        }
    }

    #[inline]
    pub fn touches(&self, node: NodeIndex) -> bool {
        self.a == node || self.b == node
    }
}

/// Road network. Node ids are `n1, n2, ...` and edge ids `e1, e2, ...` in creation order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoadGraph {
    pub nodes: Vec<RoadNode>,
    pub edges: Vec<RoadEdge>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, position: Point) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(RoadNode {
            id: format!("n{}", index + 1),
            position,
        });
        index
    }

    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex, kind: RoadKind, width: f64) {
        debug_assert!(a < self.nodes.len() && b < self.nodes.len());
        let id = format!("e{}", self.edges.len() + 1);
        self.edges.push(RoadEdge {
            id,
            a,
            b,
            kind,
            width,
        });
    }

    #[inline]
    pub fn position(&self, node: NodeIndex) -> Point {
        self.nodes[node].position
    }

    /// `true` if an edge joins `a` and `b` directly.
    pub fn connected(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.edges
            .iter()
            .any(|e| (e.a == a && e.b == b) || (e.a == b && e.b == a))
    }

    /// Adjacency lists: for each node, the indices of its incident edges in edge order.
    pub fn incident_edges(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for (i, e) in self.edges.iter().enumerate() {
            adjacency[e.a].push(i);
            if e.b != e.a {
                adjacency[e.b].push(i);
            }
        }
        adjacency
    }

    /// Rebuild a graph from polylines, welding points with identical coordinates into
    /// one node. Used when only polylines were persisted.
    pub fn from_polylines(polylines: &[Polyline]) -> Self {
        let mut graph = RoadGraph::new();
        let mut index: HashMap<(u64, u64), NodeIndex> = HashMap::new();
        let mut node_for = |graph: &mut RoadGraph, p: Point| {
            *index
                .entry((p.x.to_bits(), p.y.to_bits()))
                .or_insert_with(|| graph.add_node(p))
        };
        for line in polylines {
            let mut prev: Option<NodeIndex> = None;
            for &p in &line.points {
                let n = node_for(&mut graph, p);
                if let Some(a) = prev {
                    if a != n {
                        graph.add_edge(a, n, line.kind, line.width);
                    }
                }
                prev = Some(n);
            }
        }
        graph
    }
}

/// Width of main spines.
pub fn main_width(params: &Params) -> f64 {
    params.road_width * 1.6
}

/// Width of ring roads.
pub fn ring_width(params: &Params) -> f64 {
    (params.road_width * 1.15).max(3.0)
}

/// Width of minor branches and snapping connectors.
pub fn minor_width(params: &Params) -> f64 {
    (params.road_width * 0.7).max(2.0)
}

/// Width of the optional bend segment at the end of a minor branch.
pub fn minor_bend_width(params: &Params) -> f64 {
    (params.road_width * 0.65).max(2.0)
}

/// Number of minor branch attempts for the given density.
pub fn minor_target(params: &Params) -> usize {
    ((818.0 * (params.density / 1.2)).round() as usize).max(120)
}

/// Distance under which ring nodes are snapped to the nearest foreign node.
pub fn snap_distance(params: &Params) -> f64 {
    (params.road_width * 2.5).max(18.0)
}

/// Synthesize the road graph for a town.
///
/// Draws happen in a fixed order: main spines, ring roads, then minor branches. The
/// snapping pass is deterministic and draws nothing.
pub fn synthesize_road_graph(rng: &mut dyn RngCore, params: &Params) -> RoadGraph {
    let r = params.town_radius;
    let mut graph = RoadGraph::new();
    let center = graph.add_node(Point::ZERO);

    add_main_spines(&mut graph, center, rng, params);
    let rings = add_ring_roads(&mut graph, rng, params);
    add_minor_branches(&mut graph, center, rng, params);
    let snapped = snap_rings(&mut graph, &rings, params);

    debug!(
        "Road graph (R={}): {} nodes, {} edges, {} rings, {} snaps.",
        r,
        graph.nodes.len(),
        graph.edges.len(),
        rings.len(),
        snapped
    );
    graph
}

fn add_main_spines(
    graph: &mut RoadGraph,
    center: NodeIndex,
    rng: &mut dyn RngCore,
    params: &Params,
) {
    let r = params.town_radius;
    let count = params.main_roads as usize;
    let width = main_width(params);
    for i in 0..count {
        let ang = i as f64 / count as f64 * TAU + rand_centered(rng, 0.2);
        let len = r * (0.9 + rand01(rng) * 0.12);
        let mid_dist = len * (0.45 + rand01(rng) * 0.1);

        let mid = Point::new(
            ang.cos() * mid_dist + rand_centered(rng, r * 0.08),
            ang.sin() * mid_dist + rand_centered(rng, r * 0.08),
        );
        let end = Point::new(
            ang.cos() * len + rand_centered(rng, r * 0.06),
            ang.sin() * len + rand_centered(rng, r * 0.06),
        );

        let mid_id = graph.add_node(mid);
        let end_id = graph.add_node(end);
        graph.add_edge(center, mid_id, RoadKind::Main, width);
        graph.add_edge(mid_id, end_id, RoadKind::Main, width);
    }
}

/// Returns the node indices of each ring in loop order.
fn add_ring_roads(
    graph: &mut RoadGraph,
    rng: &mut dyn RngCore,
    params: &Params,
) -> Vec<Vec<NodeIndex>> {
    let r = params.town_radius;
    let count = params.ring_roads as usize;
    let width = ring_width(params);
    let mut rings = Vec::with_capacity(count);
    for i in 0..count {
        let t = (i + 1) as f64 / (count + 1) as f64;
        let radius = lerp(r * 0.28, r * 0.82, t) * rand_range(rng, 0.95, 1.05);
        let segments = ((24.0 + radius / 12.0).round() as usize).max(18);

        let mut members = Vec::with_capacity(segments);
        for s in 0..segments {
            let ang = s as f64 / segments as f64 * TAU + rand_centered(rng, 0.02);
            let x = ang.cos() * radius + rand_centered(rng, 3.0);
            let y = ang.sin() * radius + rand_centered(rng, 3.0);
            let id = graph.add_node(Point::new(x, y));
            if let Some(&prev) = members.last() {
                graph.add_edge(prev, id, RoadKind::Ring, width);
            }
            members.push(id);
        }
        if let (Some(&first), Some(&last)) = (members.first(), members.last()) {
            if first != last {
                graph.add_edge(last, first, RoadKind::Ring, width);
            }
        }
        rings.push(members);
    }
    rings
}

fn add_minor_branches(
    graph: &mut RoadGraph,
    center: NodeIndex,
    rng: &mut dyn RngCore,
    params: &Params,
) {
    let r = params.town_radius;
    let anchors: Vec<NodeIndex> = (0..graph.nodes.len()).filter(|&n| n != center).collect();
    if anchors.is_empty() {
        return;
    }
    let width = minor_width(params);
    let bend_width = minor_bend_width(params);

    for _ in 0..minor_target(params) {
        let pick = rand_index(rng, anchors.len());
        let anchor = anchors[pick];
        let origin = graph.position(anchor);
        let side = if chance(rng, 0.5) { FRAC_PI_2 } else { -FRAC_PI_2 };
        let ang = origin.y.atan2(origin.x) + side + rand_centered(rng, 0.6);
        let len = rand_range(rng, r * 0.08, r * 0.22);
        let end = origin + Point::new(ang.cos(), ang.sin()) * len;
        if end.length() > r * 1.05 {
            continue;
        }
        let end_id = graph.add_node(end);
        graph.add_edge(anchor, end_id, RoadKind::Minor, width);

        if chance(rng, 0.35) {
            let bend = end
                + Point::new(
                    rand_centered(rng, len * 0.6),
                    rand_centered(rng, len * 0.6),
                );
            let bend_id = graph.add_node(bend);
            graph.add_edge(end_id, bend_id, RoadKind::Minor, bend_width);
        }
    }
}

/// Connect each ring node to its nearest node off its own ring when that node lies
/// within the snap distance and is not already adjacent. Returns the number of edges added.
fn snap_rings(graph: &mut RoadGraph, rings: &[Vec<NodeIndex>], params: &Params) -> usize {
    let max_dist = snap_distance(params);
    let width = minor_width(params);
    let mut ring_of = vec![None; graph.nodes.len()];
    for (ring, members) in rings.iter().enumerate() {
        for &n in members {
            ring_of[n] = Some(ring);
        }
    }

    let mut added = 0;
    for (ring, members) in rings.iter().enumerate() {
        for &node in members {
            let p = graph.position(node);
            let mut best: Option<(NodeIndex, f64)> = None;
            for (other, candidate) in graph.nodes.iter().enumerate() {
                if other == node || ring_of[other] == Some(ring) {
                    continue;
                }
                let d = p.distance(candidate.position);
                if d <= max_dist && best.is_none_or(|(_, bd)| d < bd) {
                    best = Some((other, d));
                }
            }
            if let Some((other, _)) = best {
                if !graph.connected(node, other) {
                    graph.add_edge(node, other, RoadKind::Minor, width);
                    added += 1;
                }
            }
        }
    }
    added
}
