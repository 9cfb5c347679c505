//! Raster line art to vector paths.
//!
//! Takes a photograph or scan of line work, isolates the ink as a binary
//! mask, thins it to a one-pixel skeleton, walks the skeleton into ordered
//! paths, then simplifies and smooths each path before serializing the lot
//! as SVG.
//!
//! ```no_run
//! use linetrace::{Pipeline, VectorizeConfig};
//!
//! # fn main() -> linetrace::Result<()> {
//! let image = image::open("drawing.jpg")?;
//! let output = Pipeline::from_config(&VectorizeConfig::default()).process(&image)?;
//! std::fs::write("drawing.svg", &output.paths_svg)?;
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod debug;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod traits;
pub mod types;

pub use debug::DebugSink;
pub use error::{LinetraceError, Result};
pub use io::svg::SvgOptions;
pub use pipeline::{Pipeline, PipelineBuilder, VectorizeConfig};
pub use traits::{
    ImagePreprocessor, PathSimplifier, PathSmoother, PathTracer, SkeletonExtractor, SmoothOutcome,
};
pub use types::{
    Path, PathKind, PathSet, PixelPoint, Point, ProcessingWarning, VectorizeOutput,
};

use image::DynamicImage;

/// Convenience entry point: run the default pipeline with `config`.
pub fn vectorize(image: &DynamicImage, config: &VectorizeConfig) -> Result<VectorizeOutput> {
    Pipeline::from_config(config).process(image)
}
