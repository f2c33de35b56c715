pub mod analysis;
pub mod common;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod species;
pub mod store;

pub use analysis::{HealthStatus, Morphology};
pub use common::CoralImage;
pub use config::Settings;
pub use error::AppError;
pub use pipeline::{AnalysisResult, CoralAnalysisOrchestrator, CoralAnalysisService};
pub use species::{SpeciesCatalog, SpeciesResolver};
pub use store::{persist_result, JsonLinesResultStore, PersistOutcome, ResultStore};
