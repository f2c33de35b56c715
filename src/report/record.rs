use crate::analysis::bleaching::HealthStatus;
use crate::analysis::morphology::Morphology;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flat, persisted summary of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Assigned by the store on save; 0 until then.
    #[serde(default)]
    pub id: u64,
    pub analysis_id: Uuid,
    pub filename: String,
    pub timestamp: DateTime<Utc>,
    pub predicted_species: String,
    pub species_confidence: f32,
    pub health_status: HealthStatus,
    pub health_confidence: f32,
    pub bleaching_percentage: f32,
    pub morphology: Morphology,
    pub family: String,
    pub genus: String,
    pub insights: Vec<String>,
}
