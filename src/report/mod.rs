pub mod insights;
pub mod record;

pub use insights::{insights, ConservationGuidance, GuidanceTier, SpeciesNotes};
pub use record::AnalysisRecord;
