//! Connected-component labelling of open (non-road) pixels inside the town.
use std::collections::VecDeque;

use super::mask::RoadMask;

/// Flood fill only reaches this far past the town radius.
pub const FILL_RADIUS_FACTOR: f64 = 1.02;

/// One 4-connected region of open pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Component {
    /// Label written into [`Labels::data`] for this component, starting at 1.
    pub label: u32,
    /// Pixel count.
    pub area: usize,
    pub min_x: usize,
    pub max_x: usize,
    pub min_y: usize,
    pub max_y: usize,
    /// `true` if the region reaches the raster border, i.e. lies outside the town.
    pub touches_edge: bool,
    /// `true` if any pixel of the region borders a road pixel. Regions bounded only by
    /// the fill radius are not enclosed by roads.
    pub touches_road: bool,
}

/// Per-pixel component labels; `0` marks road or unreached pixels.
#[derive(Clone, Debug)]
pub struct Labels {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>,
}

impl Labels {
    /// `true` if pixel `(x, y)` carries `label`. Out-of-bounds pixels never match.
    #[inline]
    pub fn is(&self, x: isize, y: isize, label: u32) -> bool {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return false;
        }
        self.data[y as usize * self.width + x as usize] == label
    }
}

const NEIGHBORS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Label every open region within `FILL_RADIUS_FACTOR * town_radius` of the center.
///
/// Pixels on the outermost ring of the raster are never filled. Components are returned
/// in row-major discovery order.
pub fn flood_components(mask: &RoadMask, town_radius: f64) -> (Labels, Vec<Component>) {
    let (w, h) = (mask.width, mask.height);
    let mut labels = Labels {
        width: w,
        height: h,
        data: vec![0; w * h],
    };
    let mut components = Vec::new();
    if w < 3 || h < 3 {
        return (labels, components);
    }

    let fill_r = town_radius * FILL_RADIUS_FACTOR;
    let fill_r2 = fill_r * fill_r;
    let half_w = w as f64 / 2.0;
    let half_h = h as f64 / 2.0;
    let in_town = |x: usize, y: usize| {
        let wx = x as f64 - half_w;
        let wy = y as f64 - half_h;
        wx * wx + wy * wy <= fill_r2
    };

    let mut next_label = 0u32;
    let mut queue = VecDeque::new();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            if mask.data[idx] != 0 || labels.data[idx] != 0 || !in_town(x, y) {
                continue;
            }

            next_label += 1;
            let mut comp = Component {
                label: next_label,
                area: 0,
                min_x: x,
                max_x: x,
                min_y: y,
                max_y: y,
                touches_edge: false,
                touches_road: false,
            };
            labels.data[idx] = next_label;
            queue.push_back((x, y));

            while let Some((cx, cy)) = queue.pop_front() {
                comp.area += 1;
                if cx <= 1 || cy <= 1 || cx >= w - 2 || cy >= h - 2 {
                    comp.touches_edge = true;
                }
                comp.min_x = comp.min_x.min(cx);
                comp.max_x = comp.max_x.max(cx);
                comp.min_y = comp.min_y.min(cy);
                comp.max_y = comp.max_y.max(cy);

                for (ox, oy) in NEIGHBORS {
                    let nx = cx as isize + ox;
                    let ny = cy as isize + oy;
                    if mask.data[ny as usize * w + nx as usize] != 0 {
                        comp.touches_road = true;
                    }
                    if nx <= 0 || ny <= 0 || nx >= w as isize - 1 || ny >= h as isize - 1 {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    let nidx = ny * w + nx;
                    if mask.data[nidx] != 0 || labels.data[nidx] != 0 || !in_town(nx, ny) {
                        continue;
                    }
                    labels.data[nidx] = next_label;
                    queue.push_back((nx, ny));
                }
            }

            components.push(comp);
        }
    }

    (labels, components)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mask with a rectangular road frame from (x0, y0) to (x1, y1) inclusive.
    fn framed_mask(w: usize, h: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> RoadMask {
        let mut mask = RoadMask::new(w, h);
        for x in x0..=x1 {
            mask.data[y0 * w + x] = 1;
            mask.data[y1 * w + x] = 1;
        }
        for y in y0..=y1 {
            mask.data[y * w + x0] = 1;
            mask.data[y * w + x1] = 1;
        }
        mask
    }

    #[test]
    fn frame_separates_inside_from_outside() {
        let mask = framed_mask(40, 40, 10, 10, 29, 29);
        let (labels, comps) = flood_components(&mask, 1000.0);
        assert_eq!(comps.len(), 2);

        let outside = comps[0];
        assert!(outside.touches_edge);
        assert!(outside.touches_road);

        let inside = comps[1];
        assert!(!inside.touches_edge);
        assert!(inside.touches_road);
        assert_eq!(inside.area, 18 * 18);
        assert_eq!((inside.min_x, inside.max_x), (11, 28));
        assert_eq!((inside.min_y, inside.max_y), (11, 28));
        assert!(labels.is(15, 15, inside.label));
        assert!(!labels.is(10, 15, inside.label));
    }

    #[test]
    fn radius_bounds_the_fill() {
        let mask = RoadMask::new(41, 41);
        let (labels, comps) = flood_components(&mask, 5.0);
        assert_eq!(comps.len(), 1);
        assert!(!comps[0].touches_edge);
        assert!(!comps[0].touches_road);
        // Nothing beyond 1.02 * radius from the center is labelled.
        assert!(!labels.is(20 + 7, 20, comps[0].label));
        assert!(labels.is(20 + 5, 20, comps[0].label));
    }

    #[test]
    fn tiny_rasters_have_no_components() {
        let (_, comps) = flood_components(&RoadMask::new(2, 2), 10.0);
        assert!(comps.is_empty());
    }

    #[test]
    fn labels_reject_out_of_bounds() {
        let labels = Labels {
            width: 2,
            height: 2,
            data: vec![1; 4],
        };
        assert!(labels.is(1, 1, 1));
        assert!(!labels.is(-1, 0, 1));
        assert!(!labels.is(2, 0, 1));
    }
}
