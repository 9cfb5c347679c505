use image::GrayImage;

use crate::{traits::SkeletonTopology, types::PixelPoint};

/// Circular 8-neighborhood offsets: E, NE, N, NW, W, SW, S, SE.
const RING: [(i64, i64); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

fn neighborhood(skeleton: &GrayImage, x: u32, y: u32) -> [bool; 8] {
    let (w, h) = skeleton.dimensions();
    let mut ring = [false; 8];
    for (i, (dx, dy)) in RING.iter().enumerate() {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
            continue;
        }
        ring[i] = skeleton.get_pixel(nx as u32, ny as u32)[0] > 0;
    }
    ring
}

/// Crossing number: background-to-foreground transitions when circling the
/// 8-neighborhood once. 1 at a curve terminus, 2 along curve interior, 3+
/// where distinct branches leave the pixel.
fn crossing_number(ring: &[bool; 8]) -> usize {
    (0..8).filter(|&i| !ring[i] && ring[(i + 1) % 8]).count()
}

/// Classify every skeleton pixel of a thinned mask.
///
/// One foreground 8-neighbor makes an endpoint. A junction needs three or
/// more neighbors AND a crossing number of at least three: a 1-pixel curve
/// stepping diagonally can give an interior pixel three neighbors (the
/// staircase corner), but only two of them start separate branches, so the
/// raw neighbor count alone over-reports branch points and would shatter
/// smooth curves downstream. Both lists come out in raster-scan order, which
/// tracing relies on for deterministic seed selection.
pub fn classify_skeleton(skeleton: &GrayImage) -> SkeletonTopology {
    let mut topology = SkeletonTopology::default();
    for (x, y, p) in skeleton.enumerate_pixels() {
        if p[0] == 0 {
            continue;
        }
        let ring = neighborhood(skeleton, x, y);
        let count = ring.iter().filter(|&&b| b).count();
        match count {
            1 => topology.endpoints.push(PixelPoint::new(x, y)),
            n if n >= 3 && crossing_number(&ring) >= 3 => {
                topology.junctions.push(PixelPoint::new(x, y));
            }
            _ => {}
        }
    }
    topology
}
