pub mod bleaching;
pub mod clahe;
pub mod color;
pub mod enhancer;
pub mod kmeans;
pub mod morphology;

pub use bleaching::{BleachingEstimator, BleachingReport, DominantColor, HealthStatus};
pub use enhancer::Enhancer;
pub use morphology::{Morphology, MorphologyClassifier, MorphologyFeatures, MorphologyReport};
