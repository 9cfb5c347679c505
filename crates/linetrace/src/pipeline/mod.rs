pub mod builder;

pub use builder::PipelineBuilder;

use image::DynamicImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    debug::DebugSink,
    error::{LinetraceError, Result},
    io::svg::{SvgOptions, mask_to_svg, paths_to_svg},
    traits::{
        ImagePreprocessor, PathSimplifier, PathSmoother, PathTracer, SkeletonExtractor,
        SmoothOutcome,
    },
    types::{Path, PathSet, ProcessingWarning, VectorizeOutput},
};

/// Tuning knobs for the default pipeline.
///
/// All fields have defaults, so a config file only needs to name the values
/// it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct VectorizeConfig {
    /// RDP simplification tolerance in pixels.
    pub tolerance: f64,
    /// Spline smoothing factor.
    pub smoothing: f64,
    /// Samples per smoothed path.
    pub num_points: usize,
    /// Connected components below this pixel area are dropped.
    pub min_component_area: usize,
    /// SVG document scale multiplier.
    pub scale: f64,
    /// SVG stroke width.
    pub stroke_width: f64,
}

impl Default for VectorizeConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.8,
            smoothing: 0.002,
            num_points: 200,
            min_component_area: 50,
            scale: 1.0,
            stroke_width: 1.2,
        }
    }
}

/// The staged raster-to-vector pipeline.
///
/// Stages are trait objects so individual steps can be swapped out; the
/// builder wires up the default chain.
pub struct Pipeline {
    pub(crate) preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    pub(crate) skeletonizer: Box<dyn SkeletonExtractor>,
    pub(crate) tracer: Box<dyn PathTracer>,
    pub(crate) simplifier: Box<dyn PathSimplifier>,
    pub(crate) smoother: Box<dyn PathSmoother>,
    pub(crate) svg_options: SvgOptions,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn from_config(config: &VectorizeConfig) -> Self {
        PipelineBuilder::from_config(config).build()
    }

    pub fn process(&self, image: &DynamicImage) -> Result<VectorizeOutput> {
        self.process_with_debug(image, None)
    }

    /// Run the full pipeline, optionally writing intermediate images.
    pub fn process_with_debug(
        &self,
        image: &DynamicImage,
        debug_sink: Option<&DebugSink>,
    ) -> Result<VectorizeOutput> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(LinetraceError::invalid_image("image has zero dimensions"));
        }

        let mut mask = image.to_luma8();
        for stage in &self.preprocessors {
            mask = stage.preprocess(&mask)?;
        }
        if let Some(sink) = debug_sink {
            sink.save_image("binary.png", &mask);
        }

        let skeleton = self.skeletonizer.skeletonize(&mask);
        if let Some(sink) = debug_sink {
            sink.save_image("skeleton.png", &skeleton);
        }

        let mut warnings = Vec::new();
        if skeleton.pixels().all(|p| p[0] == 0) {
            warn!("thinning produced an empty skeleton");
            warnings.push(ProcessingWarning::EmptySkeleton);
        }

        let raw = self.tracer.trace(&skeleton);
        let paths_count = raw.len();
        if raw.is_empty() {
            warn!("no paths retained from skeleton");
            warnings.push(ProcessingWarning::NoPaths);
        }

        let mut fallbacks = 0usize;
        let processed: Vec<Path> = raw
            .iter()
            .map(|path| {
                let simplified = self.simplifier.simplify(path);
                match self.smoother.smooth(&simplified) {
                    SmoothOutcome::Fitted(p) | SmoothOutcome::Unchanged(p) => p,
                    SmoothOutcome::Fallback(p) => {
                        fallbacks += 1;
                        p
                    }
                }
            })
            .collect();
        if fallbacks > 0 {
            debug!(fallbacks, "spline fit fell back to moving average");
        }

        let paths_svg = paths_to_svg(&PathSet::new(processed), width, height, &self.svg_options);
        let mask_svg = mask_to_svg(&mask, &self.svg_options)?;

        info!(width, height, paths = paths_count, "vectorized image");
        Ok(VectorizeOutput {
            mask_svg,
            paths_svg,
            paths_count,
            warnings,
        })
    }
}
