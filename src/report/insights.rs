use crate::analysis::bleaching::HealthStatus;
use crate::analysis::morphology::Morphology;
use crate::species::{BleachingResistance, SpeciesRecord};
use serde::Serialize;
use std::fmt;

/// The four summary lines stored with every analysis record.
pub fn insights(
    morphology: Morphology,
    status: HealthStatus,
    bleaching_percentage: f32,
    species: Option<&SpeciesRecord>,
) -> Vec<String> {
    vec![
        format!("Morphology: {}", morphology.label()),
        format!("Health: {}", status.label()),
        format!("Bleaching: {:.1}%", bleaching_percentage),
        format!(
            "Species: {}",
            species.map_or("Unknown", |s| s.common_name.as_str())
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GuidanceTier {
    ImmediateAction,
    IncreasedVigilance,
    Maintenance,
}

impl GuidanceTier {
    pub fn title(&self) -> &'static str {
        match self {
            GuidanceTier::ImmediateAction => "Immediate action required",
            GuidanceTier::IncreasedVigilance => "Increased vigilance needed",
            GuidanceTier::Maintenance => "Healthy - maintenance phase",
        }
    }
}

/// Field recommendations keyed on the health status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConservationGuidance {
    pub tier: GuidanceTier,
    pub actions: [&'static str; 5],
    pub outlook: &'static str,
}

impl ConservationGuidance {
    /// `None` for `Unknown`: there is nothing to recommend on an unreadable image.
    pub fn for_status(status: HealthStatus) -> Option<Self> {
        let guidance = match status {
            HealthStatus::SeverelyBleached | HealthStatus::ModeratelyBleached => Self {
                tier: GuidanceTier::ImmediateAction,
                actions: [
                    "Document & report: record GPS coordinates and report to the local marine authority",
                    "Temperature monitoring: check sea surface temperature anomalies",
                    "Stress reduction: identify and mitigate local stressors (pollution, tourism)",
                    "Regular monitoring: document changes every 48 hours",
                    "Shading consideration: evaluate artificial shading feasibility",
                ],
                outlook: "Expected recovery: 6-12 months with improved conditions",
            },
            HealthStatus::MildStress | HealthStatus::Watch => Self {
                tier: GuidanceTier::IncreasedVigilance,
                actions: [
                    "Weekly monitoring: document color changes and growth",
                    "Water quality check: test for nutrients and sedimentation",
                    "Comparative analysis: compare with historical images",
                    "Community alert: inform local conservation groups",
                    "Preventive measures: reduce nearby human activity",
                ],
                outlook: "Risk level: medium, could progress to bleaching",
            },
            HealthStatus::Healthy => Self {
                tier: GuidanceTier::Maintenance,
                actions: [
                    "Regular surveys: include in quarterly reef surveys",
                    "Baseline data: document as a healthy reference",
                    "Protection maintenance: ensure existing protections remain",
                    "Community education: use as an example of healthy coral",
                    "Research value: suitable for growth rate studies",
                ],
                outlook: "Status: stable, continue current management",
            },
            HealthStatus::Unknown => return None,
        };
        Some(guidance)
    }
}

impl fmt::Display for ConservationGuidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.tier.title())?;
        for (i, action) in self.actions.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, action)?;
        }
        write!(f, "  {}", self.outlook)
    }
}

/// Per-species remarks shown next to a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesNotes {
    pub common_name: String,
    pub bleaching_resistance: BleachingResistance,
    pub typical_habitat: String,
    pub conservation_priority: String,
    pub recovery_potential: &'static str,
}

impl SpeciesNotes {
    pub fn for_record(record: &SpeciesRecord) -> Self {
        let recovery_potential = if record.bleaching_resistance == BleachingResistance::High {
            "High"
        } else {
            "Medium-Low"
        };
        Self {
            common_name: record.common_name.clone(),
            bleaching_resistance: record.bleaching_resistance,
            typical_habitat: record.keywords.clone(),
            conservation_priority: record.conservation_status.clone(),
            recovery_potential,
        }
    }
}

impl fmt::Display for SpeciesNotes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Notes for {}:", self.common_name)?;
        writeln!(f, "  Bleaching resistance: {}", self.bleaching_resistance)?;
        writeln!(f, "  Typical habitat: {}", self.typical_habitat)?;
        writeln!(f, "  Conservation priority: {}", self.conservation_priority)?;
        write!(f, "  Recovery potential: {}", self.recovery_potential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::SpeciesCatalog;

    #[test]
    fn insights_have_four_lines_in_order() {
        let catalog = SpeciesCatalog::reference();
        let lines = insights(
            Morphology::Branching,
            HealthStatus::Watch,
            6.6667,
            catalog.first(),
        );
        assert_eq!(
            lines,
            vec![
                "Morphology: Branching",
                "Health: Watch",
                "Bleaching: 6.7%",
                "Species: Staghorn Coral",
            ]
        );
    }

    #[test]
    fn insights_without_species_say_unknown() {
        let lines = insights(Morphology::Unknown, HealthStatus::Unknown, 0.0, None);
        assert_eq!(lines[3], "Species: Unknown");
    }

    #[test]
    fn guidance_tiers_follow_status() {
        let tier = |s| ConservationGuidance::for_status(s).map(|g| g.tier);
        assert_eq!(tier(HealthStatus::SeverelyBleached), Some(GuidanceTier::ImmediateAction));
        assert_eq!(tier(HealthStatus::ModeratelyBleached), Some(GuidanceTier::ImmediateAction));
        assert_eq!(tier(HealthStatus::MildStress), Some(GuidanceTier::IncreasedVigilance));
        assert_eq!(tier(HealthStatus::Watch), Some(GuidanceTier::IncreasedVigilance));
        assert_eq!(tier(HealthStatus::Healthy), Some(GuidanceTier::Maintenance));
        assert_eq!(tier(HealthStatus::Unknown), None);
    }

    #[test]
    fn recovery_potential_tracks_resistance() {
        let catalog = SpeciesCatalog::reference();
        for record in catalog.records() {
            let notes = SpeciesNotes::for_record(record);
            let expected = if record.bleaching_resistance == BleachingResistance::High {
                "High"
            } else {
                "Medium-Low"
            };
            assert_eq!(notes.recovery_potential, expected, "{}", record.common_name);
        }
    }
}
