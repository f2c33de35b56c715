use super::stage_timings::StageTimings;
use crate::analysis::bleaching::BleachingReport;
use crate::analysis::morphology::MorphologyReport;
use crate::report::{insights, AnalysisRecord, ConservationGuidance, SpeciesNotes};
use crate::species::SpeciesMatch;
use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnalysisStage {
    Enhance,
    Morphology,
    Bleaching,
    Species,
}

impl AnalysisStage {
    /// Execution order.
    pub const ALL: [AnalysisStage; 4] = [
        AnalysisStage::Enhance,
        AnalysisStage::Morphology,
        AnalysisStage::Bleaching,
        AnalysisStage::Species,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStage::Enhance => "Enhance",
            AnalysisStage::Morphology => "Morphology",
            AnalysisStage::Bleaching => "Bleaching",
            AnalysisStage::Species => "Species",
        }
    }

    /// 1-based position in [`AnalysisStage::ALL`].
    pub fn step(&self) -> usize {
        match self {
            AnalysisStage::Enhance => 1,
            AnalysisStage::Morphology => 2,
            AnalysisStage::Bleaching => 3,
            AnalysisStage::Species => 4,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AnalysisStage::Enhance => "Enhancing image quality...",
            AnalysisStage::Morphology => "Analyzing coral morphology...",
            AnalysisStage::Bleaching => "Detecting health status...",
            AnalysisStage::Species => "Identifying species...",
        }
    }
}

/// Everything produced for one photograph.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub filename: String,
    pub analyzed_at: DateTime<Utc>,
    /// `None` when the image could not be decoded.
    pub dimensions: Option<(u32, u32)>,
    /// Display copy; analytic stages never read it.
    #[serde(skip)]
    pub enhanced: Option<RgbImage>,
    pub morphology: MorphologyReport,
    pub bleaching: BleachingReport,
    pub species: SpeciesMatch,
    pub timings: StageTimings,
}

impl AnalysisResult {
    /// Sentinel result for input that could not be read.
    pub fn unreadable(filename: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            analyzed_at: Utc::now(),
            dimensions: None,
            enhanced: None,
            morphology: MorphologyReport::unknown(),
            bleaching: BleachingReport::unreadable(),
            species: SpeciesMatch::none(),
            timings: StageTimings::new(),
        }
    }

    pub fn is_readable(&self) -> bool {
        self.dimensions.is_some()
    }

    pub fn insights(&self) -> Vec<String> {
        insights(
            self.morphology.morphology,
            self.bleaching.health_status,
            self.bleaching.bleaching_percentage,
            self.species.record.as_ref(),
        )
    }

    pub fn guidance(&self) -> Option<ConservationGuidance> {
        ConservationGuidance::for_status(self.bleaching.health_status)
    }

    pub fn species_notes(&self) -> Option<SpeciesNotes> {
        self.species.record.as_ref().map(SpeciesNotes::for_record)
    }

    /// Flatten into a persistable record; the store assigns the id.
    pub fn to_record(&self) -> AnalysisRecord {
        let record = self.species.record.as_ref();
        let or_unknown = |value: Option<&String>| {
            value.cloned().unwrap_or_else(|| "Unknown".to_string())
        };
        AnalysisRecord {
            id: 0,
            analysis_id: self.id,
            filename: self.filename.clone(),
            timestamp: self.analyzed_at,
            predicted_species: or_unknown(record.map(|r| &r.common_name)),
            species_confidence: self.species.confidence,
            health_status: self.bleaching.health_status,
            health_confidence: self.bleaching.confidence,
            bleaching_percentage: self.bleaching.bleaching_percentage,
            morphology: self.morphology.morphology,
            family: or_unknown(record.map(|r| &r.family)),
            genus: or_unknown(record.map(|r| &r.genus)),
            insights: self.insights(),
        }
    }
}
