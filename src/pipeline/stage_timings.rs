use super::core::AnalysisStage;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Per-stage durations of one analysis, kept in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageTimings {
    durations: IndexMap<AnalysisStage, Duration>,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stage; repeated stages accumulate.
    pub fn record(&mut self, stage: AnalysisStage, duration: Duration) {
        *self.durations.entry(stage).or_insert(Duration::ZERO) += duration;
    }

    pub fn get(&self, stage: AnalysisStage) -> Duration {
        self.durations.get(&stage).copied().unwrap_or(Duration::ZERO)
    }

    pub fn total(&self) -> Duration {
        self.durations.values().sum()
    }

    pub fn stages(&self) -> impl Iterator<Item = (AnalysisStage, Duration)> + '_ {
        self.durations.iter().map(|(stage, d)| (*stage, *d))
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

/// Serialized as `{ "Enhance": <micros>, ... }`.
impl Serialize for StageTimings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let micros: IndexMap<&str, u64> = self
            .durations
            .iter()
            .map(|(stage, d)| (stage.as_str(), d.as_micros() as u64))
            .collect();
        micros.serialize(serializer)
    }
}
