use image::GrayImage;

use crate::{
    error::Result,
    types::{Path, PathSet, PixelPoint},
};

/// Trait for binary-mask preprocessing steps (denoise, threshold, cleanup).
///
/// Implementations take a grayscale or binary image and return a new image;
/// preprocessors are chained in sequence by the pipeline.
pub trait ImagePreprocessor: Send + Sync {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for topology-preserving thinning of a binary mask.
pub trait SkeletonExtractor: Send + Sync {
    /// Thin the binary mask to a 1-pixel-wide skeleton. Empty masks are
    /// valid and produce an empty skeleton.
    fn skeletonize(&self, mask: &GrayImage) -> GrayImage;
}

/// Trait for walking a skeleton into ordered raw paths.
pub trait PathTracer: Send + Sync {
    fn trace(&self, skeleton: &GrayImage) -> PathSet;
}

/// Trait for per-path vertex reduction.
pub trait PathSimplifier: Send + Sync {
    fn simplify(&self, path: &Path) -> Path;
}

/// Outcome of smoothing a single path.
///
/// Spline fitting can fail on degenerate input; the fallback is part of the
/// contract rather than an incidental recovery, so the variant is surfaced.
#[derive(Debug, Clone, PartialEq)]
pub enum SmoothOutcome {
    /// The spline fit succeeded; the path was resampled from the curve.
    Fitted(Path),
    /// The fit was ill-conditioned; moving-average smoothing was applied.
    Fallback(Path),
    /// The path was too short to smooth and passed through unchanged.
    Unchanged(Path),
}

impl SmoothOutcome {
    pub fn into_path(self) -> Path {
        match self {
            Self::Fitted(p) | Self::Fallback(p) | Self::Unchanged(p) => p,
        }
    }
}

/// Trait for per-path curve smoothing.
pub trait PathSmoother: Send + Sync {
    fn smooth(&self, path: &Path) -> SmoothOutcome;
}

/// Endpoints and junctions of a skeleton, in raster-scan order.
#[derive(Debug, Clone, Default)]
pub struct SkeletonTopology {
    pub endpoints: Vec<PixelPoint>,
    pub junctions: Vec<PixelPoint>,
}
