use geo_types::{Coord, LineString};
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate on the skeleton grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

impl PixelPoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another pixel.
    pub fn distance(&self, other: &PixelPoint) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Floating-point coordinate produced by simplification and smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<PixelPoint> for Point {
    fn from(p: PixelPoint) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// Whether a path's endpoints coincide (within the closed-path threshold).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathKind {
    Open,
    Closed,
}

/// An ordered, non-empty point sequence traced along the skeleton.
///
/// Consecutive points are never identical; the `kind` tag records whether
/// the start and end lie within the closed-path distance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Point>,
    pub kind: PathKind,
}

impl Path {
    pub fn new(points: Vec<Point>, kind: PathKind) -> Self {
        Self { points, kind }
    }

    /// Build a path from pixel coordinates, tagging it closed when the
    /// endpoints are within `closed_distance`.
    pub fn from_pixels(pixels: &[PixelPoint], closed_distance: f64) -> Self {
        let kind = match (pixels.first(), pixels.last()) {
            (Some(a), Some(b)) if pixels.len() > 2 && a.distance(b) < closed_distance => {
                PathKind::Closed
            }
            _ => PathKind::Open,
        };
        Self {
            points: pixels.iter().map(|&p| Point::from(p)).collect(),
            kind,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.kind == PathKind::Closed
    }

    /// Convert to a geo-types LineString for geometric operations.
    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(
            self.points
                .iter()
                .map(|p| Coord { x: p.x, y: p.y })
                .collect(),
        )
    }
}

/// The ordered collection of paths extracted from one image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSet {
    pub paths: Vec<Path>,
}

impl PathSet {
    pub fn new(paths: Vec<Path>) -> Self {
        Self { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter()
    }
}

/// Non-fatal conditions produced while a run still succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingWarning {
    /// Thinning produced no foreground pixels.
    EmptySkeleton,
    /// Tracing retained no paths.
    NoPaths,
}

/// Result record for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizeOutput {
    /// SVG document embedding the binary mask as a raster preview.
    pub mask_svg: String,
    /// SVG document with one stroked path primitive per extracted path.
    pub paths_svg: String,
    /// Count of raw paths found before simplification and smoothing.
    pub paths_count: usize,
    /// Non-fatal degeneracies encountered during the run.
    pub warnings: Vec<ProcessingWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_distance() {
        let a = PixelPoint::new(0, 0);
        let b = PixelPoint::new(3, 4);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn path_from_pixels_tags_closed_loop() {
        let ring: Vec<PixelPoint> = vec![
            PixelPoint::new(0, 0),
            PixelPoint::new(5, 0),
            PixelPoint::new(5, 5),
            PixelPoint::new(0, 5),
            PixelPoint::new(0, 1),
        ];
        let path = Path::from_pixels(&ring, 5.0);
        assert_eq!(path.kind, PathKind::Closed);
    }

    #[test]
    fn path_from_pixels_tags_open_stroke() {
        let stroke: Vec<PixelPoint> = (0..20).map(|x| PixelPoint::new(x, 0)).collect();
        let path = Path::from_pixels(&stroke, 5.0);
        assert_eq!(path.kind, PathKind::Open);
    }

    #[test]
    fn two_point_path_is_never_closed() {
        let path = Path::from_pixels(&[PixelPoint::new(0, 0), PixelPoint::new(1, 0)], 5.0);
        assert_eq!(path.kind, PathKind::Open);
    }
}
