use crate::{
    algorithms::{
        AdaptiveThreshold, BilateralDenoise, ComponentAreaFilter, MorphologicalCleanup,
        RdpSimplifier, SkeletonPathTracer, SplineSmoother, ZhangSuenThinner,
    },
    io::svg::SvgOptions,
    pipeline::{Pipeline, VectorizeConfig},
    traits::{ImagePreprocessor, PathSimplifier, PathSmoother, PathTracer, SkeletonExtractor},
};

/// Fluent constructor for [`Pipeline`].
///
/// Any stage left unset gets the default implementation; preprocessors left
/// empty get the standard denoise/threshold/cleanup/filter chain.
#[derive(Default)]
pub struct PipelineBuilder {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    skeletonizer: Option<Box<dyn SkeletonExtractor>>,
    tracer: Option<Box<dyn PathTracer>>,
    simplifier: Option<Box<dyn PathSimplifier>>,
    smoother: Option<Box<dyn PathSmoother>>,
    svg_options: Option<SvgOptions>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a builder whose stage parameters come from a config record.
    pub fn from_config(config: &VectorizeConfig) -> Self {
        Self::new()
            .preprocessor(BilateralDenoise::default())
            .preprocessor(AdaptiveThreshold::default())
            .preprocessor(MorphologicalCleanup::default())
            .preprocessor(ComponentAreaFilter {
                min_area: config.min_component_area,
            })
            .simplifier(RdpSimplifier {
                tolerance: config.tolerance,
            })
            .smoother(SplineSmoother {
                smoothing: config.smoothing,
                num_points: config.num_points,
            })
            .svg_options(SvgOptions {
                scale: config.scale,
                stroke_width: config.stroke_width,
            })
    }

    pub fn preprocessor(mut self, stage: impl ImagePreprocessor + 'static) -> Self {
        self.preprocessors.push(Box::new(stage));
        self
    }

    pub fn skeletonizer(mut self, stage: impl SkeletonExtractor + 'static) -> Self {
        self.skeletonizer = Some(Box::new(stage));
        self
    }

    pub fn tracer(mut self, stage: impl PathTracer + 'static) -> Self {
        self.tracer = Some(Box::new(stage));
        self
    }

    pub fn simplifier(mut self, stage: impl PathSimplifier + 'static) -> Self {
        self.simplifier = Some(Box::new(stage));
        self
    }

    pub fn smoother(mut self, stage: impl PathSmoother + 'static) -> Self {
        self.smoother = Some(Box::new(stage));
        self
    }

    pub fn svg_options(mut self, options: SvgOptions) -> Self {
        self.svg_options = Some(options);
        self
    }

    pub fn build(self) -> Pipeline {
        let preprocessors = if self.preprocessors.is_empty() {
            vec![
                Box::new(BilateralDenoise::default()) as Box<dyn ImagePreprocessor>,
                Box::new(AdaptiveThreshold::default()),
                Box::new(MorphologicalCleanup::default()),
                Box::new(ComponentAreaFilter::default()),
            ]
        } else {
            self.preprocessors
        };

        Pipeline {
            preprocessors,
            skeletonizer: self
                .skeletonizer
                .unwrap_or_else(|| Box::new(ZhangSuenThinner)),
            tracer: self
                .tracer
                .unwrap_or_else(|| Box::new(SkeletonPathTracer::default())),
            simplifier: self
                .simplifier
                .unwrap_or_else(|| Box::new(RdpSimplifier::default())),
            smoother: self
                .smoother
                .unwrap_or_else(|| Box::new(SplineSmoother::default())),
            svg_options: self.svg_options.unwrap_or_default(),
        }
    }
}
