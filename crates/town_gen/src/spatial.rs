//! Uniform hash grid for bounding-box queries.
//!
//! Items are stored once in a slot list; each grid cell keeps slot indices of the items
//! whose bounds touch it. Queries return every matching item at most once.
use std::collections::HashMap;

use crate::geometry::Bounds;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellRange {
    min_x: i64,
    max_x: i64,
    min_y: i64,
    max_y: i64,
}

/// Bucketed spatial index over items with axis-aligned bounds.
#[derive(Clone, Debug)]
pub struct SpatialGrid<T> {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
    slots: Vec<(T, Bounds)>,
}

impl<T> SpatialGrid<T> {
    /// Create an empty grid. Non-positive or non-finite cell sizes fall back to `1.0`.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            slots: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn cell_range(&self, bounds: &Bounds) -> CellRange {
        let cs = self.cell_size;
        CellRange {
            min_x: (bounds.min.x / cs).floor() as i64,
            max_x: (bounds.max.x / cs).floor() as i64,
            min_y: (bounds.min.y / cs).floor() as i64,
            max_y: (bounds.max.y / cs).floor() as i64,
        }
    }

    fn cells_of(&self, bounds: &Bounds) -> impl Iterator<Item = (i64, i64)> {
        let r = self.cell_range(bounds);
        (r.min_y..=r.max_y).flat_map(move |y| (r.min_x..=r.max_x).map(move |x| (x, y)))
    }

    /// Insert an item covering `bounds`.
    pub fn insert(&mut self, item: T, bounds: Bounds) {
        let slot = self.slots.len();
        let keys: Vec<_> = self.cells_of(&bounds).collect();
        for key in keys {
            self.cells.entry(key).or_default().push(slot);
        }
        self.slots.push((item, bounds));
    }

    /// Slots touched by `bounds`, ascending and de-duplicated.
    fn query_slots(&self, bounds: &Bounds) -> Vec<usize> {
        let mut slots: Vec<usize> = self
            .cells_of(bounds)
            .filter_map(|key| self.cells.get(&key))
            .flatten()
            .copied()
            .collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    /// Items stored in cells touched by `bounds`, each at most once, with their bounds.
    /// Candidates are coarse: callers still test the returned bounds.
    pub fn query(&self, bounds: &Bounds) -> Vec<(&T, &Bounds)> {
        self.query_slots(bounds)
            .into_iter()
            .map(|slot| {
                let (item, b) = &self.slots[slot];
                (item, b)
            })
            .collect()
    }

    /// `true` if any stored bounds overlap `bounds`.
    pub fn any_overlap(&self, bounds: &Bounds) -> bool {
        self.query(bounds).iter().any(|(_, b)| b.overlaps(bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Bounds {
        Bounds::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn invalid_cell_size_falls_back() {
        assert_eq!(SpatialGrid::<u8>::new(0.0).cell_size(), 1.0);
        assert_eq!(SpatialGrid::<u8>::new(f64::NAN).cell_size(), 1.0);
        assert_eq!(SpatialGrid::<u8>::new(18.0).cell_size(), 18.0);
    }

    #[test]
    fn query_returns_spanning_items_once() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert("wide", rect(-25.0, -5.0, 25.0, 5.0));
        grid.insert("far", rect(100.0, 100.0, 105.0, 105.0));

        let hits = grid.query(&rect(-30.0, -30.0, 30.0, 30.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(*hits[0].0, "wide");
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn query_yields_insertion_order() {
        let mut grid = SpatialGrid::new(5.0);
        // "late" sits in an earlier cell than "early" but was inserted second.
        grid.insert("early", rect(20.0, 20.0, 40.0, 40.0));
        grid.insert("late", rect(0.0, 0.0, 30.0, 30.0));
        let hits: Vec<_> = grid
            .query(&rect(0.0, 0.0, 40.0, 40.0))
            .into_iter()
            .map(|(item, _)| *item)
            .collect();
        assert_eq!(hits, vec!["early", "late"]);
    }

    #[test]
    fn any_overlap_tests_exact_bounds() {
        let mut grid = SpatialGrid::new(50.0);
        grid.insert(1u32, rect(0.0, 0.0, 10.0, 10.0));
        // Same cell, disjoint bounds.
        assert!(!grid.any_overlap(&rect(20.0, 20.0, 30.0, 30.0)));
        assert!(grid.any_overlap(&rect(5.0, 5.0, 30.0, 30.0)));
    }

    #[test]
    fn negative_coordinates_map_to_distinct_cells() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert('a', rect(-9.0, -9.0, -1.0, -1.0));
        assert!(grid.query(&rect(1.0, 1.0, 9.0, 9.0)).is_empty());
        assert_eq!(grid.query(&rect(-5.0, -5.0, -4.0, -4.0)).len(), 1);
    }
}
