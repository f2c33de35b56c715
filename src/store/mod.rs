pub mod json_lines;
pub mod memory;

pub use json_lines::JsonLinesResultStore;
pub use memory::InMemoryResultStore;

use crate::error::AppError;
use crate::pipeline::AnalysisResult;
use crate::report::AnalysisRecord;
use tracing::{info, warn};

/// Persistence for analysis records.
pub trait ResultStore: Send + Sync {
    /// Store a record and return its assigned id.
    fn save(&self, record: AnalysisRecord) -> Result<u64, AppError>;

    /// All stored records, newest first.
    fn list(&self) -> Result<Vec<AnalysisRecord>, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved(u64),
    Skipped(String),
    /// Carries a user-facing notice; the analysis itself is unaffected.
    Failed(String),
}

/// Save a result when a species was matched. Store failures never propagate.
pub fn persist_result(store: &dyn ResultStore, result: &AnalysisResult) -> PersistOutcome {
    if result.species.record.is_none() {
        return PersistOutcome::Skipped("No species match, nothing saved".to_string());
    }

    match store.save(result.to_record()) {
        Ok(id) => {
            info!("Saved analysis of {} as record {}", result.filename, id);
            PersistOutcome::Saved(id)
        }
        Err(e) => {
            warn!("Could not save analysis of {}: {}", result.filename, e);
            PersistOutcome::Failed(format!("Analysis not saved: {}", e))
        }
    }
}
