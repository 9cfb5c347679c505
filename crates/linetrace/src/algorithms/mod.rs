pub mod preprocessing;
pub mod simplification;
pub mod skeleton;
pub mod smoothing;
pub mod topology;
pub mod tracing;

pub use preprocessing::{
    AdaptiveThreshold, BilateralDenoise, ComponentAreaFilter, MorphologicalCleanup,
};
pub use simplification::RdpSimplifier;
pub use skeleton::ZhangSuenThinner;
pub use smoothing::SplineSmoother;
pub use topology::classify_skeleton;
pub use tracing::SkeletonPathTracer;
