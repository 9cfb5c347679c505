use geo::Simplify;

use crate::{
    traits::PathSimplifier,
    types::{Path, Point},
};

/// Ramer-Douglas-Peucker vertex reduction.
///
/// Endpoints are always kept, so the closed/open tag of the input carries
/// over unchanged. Paths with fewer than three points pass through as-is.
#[derive(Debug, Clone)]
pub struct RdpSimplifier {
    /// Maximum perpendicular deviation, in pixels.
    pub tolerance: f64,
}

impl Default for RdpSimplifier {
    fn default() -> Self {
        Self { tolerance: 0.8 }
    }
}

impl PathSimplifier for RdpSimplifier {
    fn simplify(&self, path: &Path) -> Path {
        if path.len() < 3 {
            return path.clone();
        }
        let simplified = path.to_line_string().simplify(&self.tolerance);
        let points = simplified
            .coords()
            .map(|c| Point::new(c.x, c.y))
            .collect();
        Path::new(points, path.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PathKind, PixelPoint};

    fn open_path(points: Vec<Point>) -> Path {
        Path::new(points, PathKind::Open)
    }

    #[test]
    fn collinear_run_collapses_to_endpoints() {
        let path = open_path((0..50).map(|x| Point::new(x as f64, 7.0)).collect());
        let out = RdpSimplifier::default().simplify(&path);
        assert_eq!(out.len(), 2);
        assert_eq!(out.points[0], Point::new(0.0, 7.0));
        assert_eq!(out.points[1], Point::new(49.0, 7.0));
    }

    #[test]
    fn corner_survives_simplification() {
        let mut pts: Vec<Point> = (0..20).map(|x| Point::new(x as f64, 0.0)).collect();
        pts.extend((1..20).map(|y| Point::new(19.0, y as f64)));
        let out = RdpSimplifier::default().simplify(&open_path(pts));
        assert_eq!(out.len(), 3);
        assert!(out.points.contains(&Point::new(19.0, 0.0)));
    }

    #[test]
    fn output_never_grows() {
        let path = Path::from_pixels(
            &(0..30)
                .map(|i| PixelPoint::new(i, (i % 3) as u32))
                .collect::<Vec<_>>(),
            5.0,
        );
        let out = RdpSimplifier::default().simplify(&path);
        assert!(out.len() <= path.len());
        assert!(out.len() >= 2);
    }

    #[test]
    fn kind_is_preserved() {
        let mut pts: Vec<Point> = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 1.0),
        ];
        pts.insert(1, Point::new(5.0, 0.1));
        let path = Path::new(pts, PathKind::Closed);
        let out = RdpSimplifier::default().simplify(&path);
        assert_eq!(out.kind, PathKind::Closed);
    }

    #[test]
    fn two_point_path_passes_through() {
        let path = open_path(vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)]);
        let out = RdpSimplifier::default().simplify(&path);
        assert_eq!(out, path);
    }
}
