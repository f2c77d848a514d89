//! Collapse graph edges into maximal polylines.
//!
//! Edges are grouped by `(kind, width)`. Within a group, walks start at nodes whose
//! group degree is not 2 (endpoints and branch points) and follow unvisited edges through
//! degree-2 chains. Edges left over afterwards belong to pure cycles and are emitted as
//! closed polylines whose last point repeats the first.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};

use super::graph::{NodeIndex, RoadGraph, RoadKind};

/// A merged run of road segments sharing one kind and width.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub kind: RoadKind,
    pub width: f64,
    pub points: Vec<Point>,
}

impl Polyline {
    pub fn new(kind: RoadKind, width: f64, points: Vec<Point>) -> Self {
        Self {
            kind,
            width,
            points,
        }
    }

    /// `true` when the last point repeats the first.
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.points)
    }
}

struct Group {
    kind: RoadKind,
    width: f64,
    edges: Vec<usize>,
}

/// Merge the graph's edges into polylines.
///
/// Groups are emitted in order of first appearance in the edge list, and walks inside a
/// group start from nodes in index order, so the output depends only on the graph.
pub fn merge_polylines(graph: &RoadGraph) -> Vec<Polyline> {
    let mut groups: Vec<Group> = Vec::new();
    for (i, e) in graph.edges.iter().enumerate() {
        match groups
            .iter_mut()
            .find(|g| g.kind == e.kind && g.width.to_bits() == e.width.to_bits())
        {
            Some(g) => g.edges.push(i),
            None => groups.push(Group {
                kind: e.kind,
                width: e.width,
                edges: vec![i],
            }),
        }
    }

    let mut out = Vec::new();
    for group in &groups {
        merge_group(graph, group, &mut out);
    }
    out
}

fn merge_group(graph: &RoadGraph, group: &Group, out: &mut Vec<Polyline>) {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
    for &ei in &group.edges {
        let e = &graph.edges[ei];
        adjacency[e.a].push(ei);
        adjacency[e.b].push(ei);
    }
    let mut visited = vec![false; graph.edges.len()];
    let guard = group.edges.len() + 2;

    let mut walk = |start: NodeIndex, first_edge: usize, visited: &mut Vec<bool>| {
        let mut points = vec![graph.position(start)];
        let mut current = start;
        let mut edge = first_edge;
        for _ in 0..guard {
            visited[edge] = true;
            let next = graph.edges[edge].other(current);
            points.push(graph.position(next));
            current = next;
            if current == start || adjacency[current].len() != 2 {
                break;
            }
            match adjacency[current].iter().copied().find(|&e| !visited[e]) {
                Some(e) => edge = e,
                None => break,
            }
        }
        if points.len() >= 2 {
            out.push(Polyline::new(group.kind, group.width, points));
        }
    };

    for node in 0..graph.nodes.len() {
        let degree = adjacency[node].len();
        if degree == 0 || degree == 2 {
            continue;
        }
        for k in 0..degree {
            let e = adjacency[node][k];
            if !visited[e] {
                walk(node, e, &mut visited);
            }
        }
    }

    for &e in &group.edges {
        if !visited[e] {
            walk(graph.edges[e].a, e, &mut visited);
        }
    }
}
