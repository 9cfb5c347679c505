use std::collections::HashSet;

use image::GrayImage;
use tracing::debug;

use crate::{
    algorithms::topology::classify_skeleton,
    traits::{PathTracer, SkeletonTopology},
    types::{Path, PathSet, PixelPoint},
};

/// 8-neighbor direction table: E, NE, N, NW, W, SW, S, SE.
const DX: [i32; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DY: [i32; 8] = [0, -1, -1, -1, 0, 1, 1, 1];

/// Candidate direction offsets relative to the incoming direction, nearest
/// angle first. Keeps walks following the curve instead of doubling back at
/// staircase pixels.
const TURN_PREFERENCE: [usize; 8] = [0, 1, 7, 2, 6, 3, 5, 4];

/// Walks a skeleton into ordered pixel chains.
///
/// Seeds walks from endpoints first, then junctions (one walk per unvisited
/// branch), then sweeps in raster order for leftover pixels so pure cycles
/// with no endpoint or junction are still captured. Every skeleton pixel is
/// consumed by at most one path; junction pixels are the exception and may
/// terminate several branches.
#[derive(Debug, Clone)]
pub struct SkeletonPathTracer {
    /// Minimum pixel count for a path seeded at an endpoint or junction.
    pub min_path_len: usize,
    /// Minimum pixel count for a path found by the cycle sweep.
    pub min_cycle_len: usize,
    /// A cycle-sweep path sharing more than this many pixels with a retained
    /// path is a duplicate and is discarded.
    pub max_shared_pixels: usize,
    /// Endpoint separation below which a traced path is tagged closed.
    pub closed_distance: f64,
}

impl Default for SkeletonPathTracer {
    fn default() -> Self {
        Self {
            min_path_len: 10,
            min_cycle_len: 20,
            max_shared_pixels: 5,
            closed_distance: 5.0,
        }
    }
}

struct TraceGrid {
    w: i32,
    h: i32,
    fg: Vec<bool>,
    junction: Vec<bool>,
    visited: Vec<bool>,
}

impl TraceGrid {
    fn new(skeleton: &GrayImage, topology: &SkeletonTopology) -> Self {
        let (w, h) = skeleton.dimensions();
        let fg: Vec<bool> = skeleton.pixels().map(|p| p[0] > 0).collect();
        let len = fg.len();
        let mut junction = vec![false; len];
        for j in &topology.junctions {
            junction[(j.y * w + j.x) as usize] = true;
        }
        Self {
            w: w as i32,
            h: h as i32,
            fg,
            junction,
            visited: vec![false; len],
        }
    }

    fn idx(&self, p: PixelPoint) -> usize {
        (p.y as i32 * self.w + p.x as i32) as usize
    }

    fn neighbor(&self, p: PixelPoint, dir: usize) -> Option<PixelPoint> {
        let nx = p.x as i32 + DX[dir];
        let ny = p.y as i32 + DY[dir];
        if nx < 0 || ny < 0 || nx >= self.w || ny >= self.h {
            return None;
        }
        Some(PixelPoint::new(nx as u32, ny as u32))
    }

    fn is_fg(&self, p: PixelPoint) -> bool {
        self.fg[self.idx(p)]
    }

    fn is_junction(&self, p: PixelPoint) -> bool {
        self.junction[self.idx(p)]
    }

    fn is_visited(&self, p: PixelPoint) -> bool {
        self.visited[self.idx(p)]
    }

    fn visit(&mut self, p: PixelPoint) {
        let i = self.idx(p);
        self.visited[i] = true;
    }

    /// First unvisited foreground neighbor in fixed table order. Used for the
    /// initial step out of a seed, where there is no incoming direction.
    fn first_step(&self, p: PixelPoint) -> Option<(usize, PixelPoint)> {
        (0..8).find_map(|d| {
            let n = self.neighbor(p, d)?;
            (self.is_fg(n) && !self.is_visited(n)).then_some((d, n))
        })
    }

    /// Next unvisited foreground neighbor, preferring the direction closest
    /// to the incoming one.
    fn next_step(&self, p: PixelPoint, dir: usize) -> Option<(usize, PixelPoint)> {
        TURN_PREFERENCE.iter().find_map(|&off| {
            let d = (dir + off) % 8;
            let n = self.neighbor(p, d)?;
            (self.is_fg(n) && !self.is_visited(n)).then_some((d, n))
        })
    }

    /// Junction neighbor other than `prev`, if any. Lets a walk that ran out
    /// of unvisited pixels still anchor its tail to an already-consumed
    /// branch point.
    fn adjacent_junction(&self, p: PixelPoint, prev: PixelPoint) -> Option<PixelPoint> {
        (0..8).find_map(|d| {
            let n = self.neighbor(p, d)?;
            (self.is_fg(n) && self.is_junction(n) && n != prev).then_some(n)
        })
    }
}

impl SkeletonPathTracer {
    /// Extend a walk from `start` through `first`, consuming unvisited pixels
    /// until the walk hits a junction or runs out of continuations. Junction
    /// pixels are appended for connectivity but never marked visited here, so
    /// they stay available as seeds for their other branches.
    fn extend_walk(
        &self,
        grid: &mut TraceGrid,
        path: &mut Vec<PixelPoint>,
        start: PixelPoint,
        first: PixelPoint,
        first_dir: usize,
    ) {
        if grid.is_junction(first) {
            path.push(first);
            return;
        }
        grid.visit(first);
        path.push(first);

        let mut prev = start;
        let mut cur = first;
        let mut dir = first_dir;
        loop {
            match grid.next_step(cur, dir) {
                Some((_, next)) if grid.is_junction(next) => {
                    path.push(next);
                    break;
                }
                Some((d, next)) => {
                    grid.visit(next);
                    path.push(next);
                    prev = cur;
                    cur = next;
                    dir = d;
                }
                None => {
                    if let Some(j) = grid.adjacent_junction(cur, prev) {
                        path.push(j);
                    }
                    break;
                }
            }
        }
    }

    fn shared_pixels(path: &[PixelPoint], retained: &[HashSet<PixelPoint>]) -> usize {
        retained
            .iter()
            .map(|set| path.iter().filter(|p| set.contains(p)).count())
            .max()
            .unwrap_or(0)
    }
}

impl PathTracer for SkeletonPathTracer {
    fn trace(&self, skeleton: &GrayImage) -> PathSet {
        let topology = classify_skeleton(skeleton);
        let mut grid = TraceGrid::new(skeleton, &topology);
        let mut raw: Vec<Vec<PixelPoint>> = Vec::new();

        // Endpoint seeds: each open curve is walked exactly once, from
        // whichever of its endpoints comes first in raster order.
        for &e in &topology.endpoints {
            if grid.is_visited(e) {
                continue;
            }
            grid.visit(e);
            let mut path = vec![e];
            if let Some((d, next)) = grid.first_step(e) {
                self.extend_walk(&mut grid, &mut path, e, next, d);
            }
            if path.len() >= self.min_path_len {
                raw.push(path);
            }
        }

        // Junction seeds: one walk per remaining unvisited branch.
        for &j in &topology.junctions {
            if grid.is_visited(j) {
                continue;
            }
            grid.visit(j);
            for d in 0..8 {
                let Some(n) = grid.neighbor(j, d) else { continue };
                if !grid.is_fg(n) || grid.is_visited(n) {
                    continue;
                }
                let mut path = vec![j];
                self.extend_walk(&mut grid, &mut path, j, n, d);
                if path.len() >= self.min_path_len {
                    raw.push(path);
                }
            }
        }

        // Raster sweep for pixels no seed reached: pure cycles.
        let mut retained_sets: Vec<HashSet<PixelPoint>> =
            raw.iter().map(|p| p.iter().copied().collect()).collect();
        for y in 0..grid.h as u32 {
            for x in 0..grid.w as u32 {
                let p = PixelPoint::new(x, y);
                if !grid.is_fg(p) || grid.is_visited(p) {
                    continue;
                }
                grid.visit(p);
                let mut path = vec![p];
                if let Some((d, next)) = grid.first_step(p) {
                    self.extend_walk(&mut grid, &mut path, p, next, d);
                }
                if path.len() >= self.min_cycle_len
                    && Self::shared_pixels(&path, &retained_sets) <= self.max_shared_pixels
                {
                    retained_sets.push(path.iter().copied().collect());
                    raw.push(path);
                }
            }
        }

        debug!(
            endpoints = topology.endpoints.len(),
            junctions = topology.junctions.len(),
            paths = raw.len(),
            "traced skeleton"
        );

        PathSet::new(
            raw.iter()
                .map(|pixels| Path::from_pixels(pixels, self.closed_distance))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PathKind;
    use image::Luma;

    fn skeleton_from(points: &[(u32, u32)]) -> GrayImage {
        let mut img = GrayImage::new(64, 64);
        for &(x, y) in points {
            img.put_pixel(x, y, Luma([255u8]));
        }
        img
    }

    #[test]
    fn straight_line_traces_to_one_ordered_open_path() {
        let pts: Vec<(u32, u32)> = (5..35).map(|x| (x, 10)).collect();
        let set = SkeletonPathTracer::default().trace(&skeleton_from(&pts));
        assert_eq!(set.len(), 1);
        let path = &set.paths[0];
        assert_eq!(path.kind, PathKind::Open);
        assert_eq!(path.len(), 30);
        // Ordered: consecutive points are 8-adjacent.
        for w in path.points.windows(2) {
            assert!((w[0].x - w[1].x).abs() <= 1.0);
            assert!((w[0].y - w[1].y).abs() <= 1.0);
            assert_ne!(w[0], w[1]);
        }
        assert_eq!(path.points.first().unwrap().x, 5.0);
        assert_eq!(path.points.last().unwrap().x, 34.0);
    }

    #[test]
    fn short_segment_is_dropped() {
        let pts: Vec<(u32, u32)> = (5..10).map(|x| (x, 10)).collect();
        let set = SkeletonPathTracer::default().trace(&skeleton_from(&pts));
        assert!(set.is_empty());
    }

    #[test]
    fn two_disjoint_strokes_trace_separately() {
        let mut pts: Vec<(u32, u32)> = (5..35).map(|x| (x, 10)).collect();
        pts.extend((5..35).map(|x| (x, 40)));
        let set = SkeletonPathTracer::default().trace(&skeleton_from(&pts));
        assert_eq!(set.len(), 2);
        let ys: Vec<f64> = set.iter().map(|p| p.points[0].y).collect();
        assert_eq!(ys, vec![10.0, 40.0]);
    }

    #[test]
    fn cross_splits_into_branches_anchored_at_junction() {
        // Vertical and horizontal arms meeting at (30, 30).
        let mut pts: Vec<(u32, u32)> = (10..51).map(|x| (x, 30)).collect();
        pts.extend((10..51).filter(|&y| y != 30).map(|y| (30, y)));
        let set = SkeletonPathTracer::default().trace(&skeleton_from(&pts));
        assert_eq!(set.len(), 4);
        // Every branch ends (or starts) at the junction.
        for path in set.iter() {
            let touches = path
                .points
                .iter()
                .any(|p| (p.x - 30.0).abs() <= 1.0 && (p.y - 30.0).abs() <= 1.0);
            assert!(touches, "branch does not reach the junction");
        }
    }

    #[test]
    fn ring_traces_to_one_closed_path() {
        // Diamond ring around (30, 30): every pixel has exactly two diagonal
        // neighbors, so the loop is only reachable by the raster sweep.
        let r = 12u32;
        let mut pts = Vec::new();
        for k in 0..=r {
            pts.push((30 + k, 18 + k));
            pts.push((42 - k, 30 + k));
            pts.push((30 - k, 42 - k));
            pts.push((18 + k, 30 - k));
        }
        let set = SkeletonPathTracer::default().trace(&skeleton_from(&pts));
        assert_eq!(set.len(), 1);
        let path = &set.paths[0];
        assert_eq!(path.kind, PathKind::Closed);
        assert!(path.len() >= 20);
        let first = path.points.first().unwrap();
        let last = path.points.last().unwrap();
        assert!(first.distance(last) < 5.0);
    }

    #[test]
    fn paths_share_at_most_a_few_pixels() {
        let mut pts: Vec<(u32, u32)> = (10..51).map(|x| (x, 30)).collect();
        pts.extend((10..51).filter(|&y| y != 30).map(|y| (30, y)));
        let set = SkeletonPathTracer::default().trace(&skeleton_from(&pts));

        let sets: Vec<HashSet<(u64, u64)>> = set
            .iter()
            .map(|p| {
                p.points
                    .iter()
                    .map(|q| (q.x as u64, q.y as u64))
                    .collect()
            })
            .collect();
        for i in 0..sets.len() {
            for j in (i + 1)..sets.len() {
                let shared = sets[i].intersection(&sets[j]).count();
                assert!(shared <= 5, "paths {i} and {j} share {shared} pixels");
            }
        }
    }

    #[test]
    fn blank_skeleton_traces_to_nothing() {
        let set = SkeletonPathTracer::default().trace(&GrayImage::new(32, 32));
        assert!(set.is_empty());
    }
}
