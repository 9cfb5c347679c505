use image::{GrayImage, Luma};

use crate::traits::SkeletonExtractor;

/// Zhang-Suen iterative thinning.
///
/// Reduces a binary mask to a 1-pixel-wide, connectivity-preserving
/// skeleton. Deterministic: both sub-iterations mark pixels against a frozen
/// snapshot and delete simultaneously, so the result does not depend on scan
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZhangSuenThinner;

/// Offsets of the 8-neighborhood in Zhang-Suen order: P2..P9, clockwise
/// starting from the pixel directly above.
const NEIGHBORS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

struct Grid {
    w: i32,
    h: i32,
    cells: Vec<bool>,
}

impl Grid {
    fn from_mask(mask: &GrayImage) -> Self {
        let (w, h) = mask.dimensions();
        let cells = mask.pixels().map(|p| p[0] > 0).collect();
        Self {
            w: w as i32,
            h: h as i32,
            cells,
        }
    }

    fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.w || y >= self.h {
            return false;
        }
        self.cells[(y * self.w + x) as usize]
    }

    fn neighborhood(&self, x: i32, y: i32) -> [bool; 8] {
        let mut n = [false; 8];
        for (i, (dx, dy)) in NEIGHBORS.iter().enumerate() {
            n[i] = self.get(x + dx, y + dy);
        }
        n
    }
}

/// Number of 0->1 transitions in the circular P2..P9 sequence.
fn transitions(n: &[bool; 8]) -> usize {
    (0..8).filter(|&i| !n[i] && n[(i + 1) % 8]).count()
}

impl ZhangSuenThinner {
    fn pass(grid: &Grid, first_subiteration: bool, to_delete: &mut Vec<(i32, i32)>) {
        to_delete.clear();
        for y in 0..grid.h {
            for x in 0..grid.w {
                if !grid.get(x, y) {
                    continue;
                }
                let n = grid.neighborhood(x, y);
                let count = n.iter().filter(|&&b| b).count();
                if !(2..=6).contains(&count) || transitions(&n) != 1 {
                    continue;
                }
                // n[0]=P2 (N), n[2]=P4 (E), n[4]=P6 (S), n[6]=P8 (W)
                let ok = if first_subiteration {
                    !(n[0] && n[2] && n[4]) && !(n[2] && n[4] && n[6])
                } else {
                    !(n[0] && n[2] && n[6]) && !(n[0] && n[4] && n[6])
                };
                if ok {
                    to_delete.push((x, y));
                }
            }
        }
    }
}

impl SkeletonExtractor for ZhangSuenThinner {
    fn skeletonize(&self, mask: &GrayImage) -> GrayImage {
        let mut grid = Grid::from_mask(mask);
        let mut to_delete = Vec::new();

        loop {
            let mut changed = false;
            for first in [true, false] {
                Self::pass(&grid, first, &mut to_delete);
                for &(x, y) in &to_delete {
                    grid.cells[(y * grid.w + x) as usize] = false;
                }
                changed |= !to_delete.is_empty();
            }
            if !changed {
                break;
            }
        }

        let mut out = GrayImage::new(mask.width(), mask.height());
        for y in 0..grid.h {
            for x in 0..grid.w {
                if grid.cells[(y * grid.w + x) as usize] {
                    out.put_pixel(x as u32, y as u32, Luma([255u8]));
                }
            }
        }
        out
    }
}
