//! Marching-squares boundary tracing for labelled components.
//!
//! Each 2×2 cell of pixels `(x, y)`, `(x+1, y)`, `(x+1, y+1)`, `(x, y+1)` yields a 4-bit
//! corner code; the table in [`cell_segments`] emits the boundary segments between edge
//! midpoints. Midpoints sit on half-integer coordinates and are keyed exactly by
//! doubling them.
use std::collections::HashMap;

use crate::geometry::Point;

use super::flood::{Component, Labels};

/// Doubled pixel coordinates of an edge midpoint.
type Key = (i64, i64);

#[inline]
fn key_to_point(k: Key) -> Point {
    Point::new(k.0 as f64 / 2.0, k.1 as f64 / 2.0)
}

/// Boundary segments for one cell, as doubled coordinates, given the cell's top-left
/// pixel `(x, y)` and its corner code (`v0 | v1 << 1 | v2 << 2 | v3 << 3`).
fn cell_segments(x: i64, y: i64, code: u8) -> [Option<(Key, Key)>; 2] {
    let (x2, y2) = (x * 2, y * 2);
    let top = (x2 + 1, y2);
    let right = (x2 + 2, y2 + 1);
    let bottom = (x2 + 1, y2 + 2);
    let left = (x2, y2 + 1);
    match code {
        1 => [Some((left, top)), None],
        2 => [Some((top, right)), None],
        3 => [Some((left, right)), None],
        4 => [Some((right, bottom)), None],
        5 => [Some((left, top)), Some((right, bottom))],
        6 => [Some((top, bottom)), None],
        7 => [Some((left, bottom)), None],
        8 => [Some((bottom, left)), None],
        9 => [Some((top, bottom)), None],
        10 => [Some((top, right)), Some((bottom, left))],
        11 => [Some((right, bottom)), None],
        12 => [Some((right, left)), None],
        13 => [Some((top, right)), None],
        14 => [Some((top, left)), None],
        _ => [None, None],
    }
}

/// All boundary segments of `comp`, scanning its bounding box grown by one pixel so the
/// outline closes on every side.
pub fn boundary_segments(labels: &Labels, comp: &Component) -> Vec<(Key, Key)> {
    let label = comp.label;
    let mut segments = Vec::new();
    let x0 = comp.min_x as i64 - 1;
    let y0 = comp.min_y as i64 - 1;
    let x1 = comp.max_x as i64;
    let y1 = comp.max_y as i64;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let at = |dx: i64, dy: i64| labels.is((x + dx) as isize, (y + dy) as isize, label);
            let code = at(0, 0) as u8
                | (at(1, 0) as u8) << 1
                | (at(1, 1) as u8) << 2
                | (at(0, 1) as u8) << 3;
            if code == 0 || code == 15 {
                continue;
            }
            segments.extend(cell_segments(x, y, code).into_iter().flatten());
        }
    }
    segments
}

/// Trace the outline of `comp` into an ordered point sequence in pixel-index space.
///
/// Tracing starts at the first segment found (the top-most boundary, which is on the
/// outer outline) and follows each point's neighbours, preferring not to step back to the
/// previous point. Returns `None` for outlines shorter than four points.
pub fn trace_contour(labels: &Labels, comp: &Component) -> Option<Vec<Point>> {
    let segments = boundary_segments(labels, comp);
    let &(start, _) = segments.first()?;

    let mut neighbors: HashMap<Key, Vec<Key>> = HashMap::with_capacity(segments.len() * 2);
    for &(a, b) in &segments {
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
    }

    let mut contour = vec![key_to_point(start)];
    let mut current = start;
    let mut prev: Option<Key> = None;
    for _ in 0..segments.len() * 2 {
        let Some(options) = neighbors.get(&current) else {
            break;
        };
        let Some(&first) = options.first() else {
            break;
        };
        let next = match prev {
            Some(p) if options.len() > 1 => {
                options.iter().copied().find(|k| *k != p).unwrap_or(first)
            }
            _ => first,
        };
        prev = Some(current);
        current = next;
        if current == start {
            break;
        }
        contour.push(key_to_point(current));
    }

    (contour.len() >= 4).then_some(contour)
}
