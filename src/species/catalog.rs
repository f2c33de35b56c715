use crate::analysis::morphology::Morphology;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BleachingResistance {
    Low,
    Medium,
    High,
}

impl fmt::Display for BleachingResistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BleachingResistance::Low => "Low",
            BleachingResistance::Medium => "Medium",
            BleachingResistance::High => "High",
        };
        f.write_str(label)
    }
}

/// Static reference entry for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub common_name: String,
    pub scientific_name: String,
    pub family: String,
    pub genus: String,
    pub morphology: Morphology,
    pub bleaching_resistance: BleachingResistance,
    pub conservation_status: String,
    pub color_patterns: String,
    pub typical_size_cm: u32,
    pub keywords: String,
}

impl SpeciesRecord {
    #[allow(clippy::too_many_arguments)]
    fn new(
        common_name: &str,
        scientific_name: &str,
        family: &str,
        genus: &str,
        morphology: Morphology,
        bleaching_resistance: BleachingResistance,
        conservation_status: &str,
        color_patterns: &str,
        typical_size_cm: u32,
        keywords: &str,
    ) -> Self {
        Self {
            common_name: common_name.to_string(),
            scientific_name: scientific_name.to_string(),
            family: family.to_string(),
            genus: genus.to_string(),
            morphology,
            bleaching_resistance,
            conservation_status: conservation_status.to_string(),
            color_patterns: color_patterns.to_string(),
            typical_size_cm,
            keywords: keywords.to_string(),
        }
    }
}

/// Immutable reference dataset, built once and shared by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesCatalog {
    records: Vec<SpeciesRecord>,
}

impl SpeciesCatalog {
    pub fn new(records: Vec<SpeciesRecord>) -> Self {
        Self { records }
    }

    /// The nine built-in records, in lookup order.
    pub fn reference() -> Self {
        use BleachingResistance::{High, Low, Medium};
        use Morphology::{Boulder, Branching, Plate, PlateTable, Soft};

        Self::new(vec![
            SpeciesRecord::new(
                "Staghorn Coral", "Acropora cervicornis", "Acroporidae", "Acropora",
                Branching, Low, "Critically Endangered", "Brown/Yellow", 300,
                "Thick branches, antler-like",
            ),
            SpeciesRecord::new(
                "Elkhorn Coral", "Acropora palmata", "Acroporidae", "Acropora",
                Branching, Low, "Critically Endangered", "Golden brown", 350,
                "Flat branches, elk antler shape",
            ),
            SpeciesRecord::new(
                "Table Coral", "Acropora hyacinthus", "Acroporidae", "Acropora",
                PlateTable, Medium, "Vulnerable", "Blue/Purple", 200,
                "Horizontal plates, tiered",
            ),
            SpeciesRecord::new(
                "Great Star Coral", "Montastraea cavernosa", "Merulinidae", "Montastraea",
                Boulder, Medium, "Vulnerable", "Green/Brown", 150,
                "Massive, star-shaped polyps",
            ),
            SpeciesRecord::new(
                "Mustard Hill Coral", "Porites astreoides", "Poritidae", "Porites",
                Boulder, High, "Least Concern", "Yellow/Green", 100,
                "Small mounds, mustard color",
            ),
            SpeciesRecord::new(
                "Brain Coral", "Diploria labyrinthiformis", "Merulinidae", "Diploria",
                Boulder, High, "Near Threatened", "Brown/Green", 180,
                "Grooved like brain",
            ),
            SpeciesRecord::new(
                "Leaf Coral", "Pavona decussata", "Agariciidae", "Pavona",
                Plate, Medium, "Least Concern", "Cream/Brown", 120,
                "Leaf-like plates",
            ),
            SpeciesRecord::new(
                "Flower Coral", "Mussa angulosa", "Faviidae", "Mussa",
                Boulder, Low, "Vulnerable", "Red/Orange", 80,
                "Large fleshy polyps",
            ),
            SpeciesRecord::new(
                "Soft Coral", "Sinularia flexibilis", "Alcyoniidae", "Sinularia",
                Soft, Medium, "Data Deficient", "Various", 150,
                "Flexible, tree-like",
            ),
        ])
    }

    pub fn records(&self) -> &[SpeciesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&SpeciesRecord> {
        self.records.first()
    }

    pub fn first_with_morphology(&self, morphology: Morphology) -> Option<&SpeciesRecord> {
        self.records.iter().find(|r| r.morphology == morphology)
    }
}
