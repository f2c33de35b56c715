use super::catalog::{SpeciesCatalog, SpeciesRecord};
use crate::analysis::morphology::Morphology;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Flat confidence reported for any match. Not a similarity score.
pub const MATCH_CONFIDENCE: f32 = 85.5;

/// Keyword rules checked in order; the first rule whose keyword occurs in
/// the descriptor picks the first record of its category.
const KEYWORD_RULES: &[(&[&str], Morphology)] = &[
    (&["branch"], Morphology::Branching),
    (&["boulder", "massive"], Morphology::Boulder),
    (&["plate", "table"], Morphology::PlateTable),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesMatch {
    pub record: Option<SpeciesRecord>,
    pub confidence: f32,
}

impl SpeciesMatch {
    pub fn none() -> Self {
        Self {
            record: None,
            confidence: 0.0,
        }
    }
}

/// Placeholder identification by case-insensitive keyword containment.
///
/// Descriptors matching no rule fall back to the first record of the table.
#[derive(Debug, Clone)]
pub struct SpeciesResolver {
    catalog: Arc<SpeciesCatalog>,
}

impl SpeciesResolver {
    pub fn new(catalog: Arc<SpeciesCatalog>) -> Self {
        Self { catalog }
    }

    pub fn identify(&self, descriptor: &str) -> SpeciesMatch {
        let text = descriptor.to_lowercase();
        let rule = KEYWORD_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)));

        let record = match rule {
            Some((_, morphology)) => self.catalog.first_with_morphology(*morphology),
            None => self.catalog.first(),
        };

        match record {
            Some(record) => {
                debug!("'{}' matched {}", descriptor, record.common_name);
                SpeciesMatch {
                    record: Some(record.clone()),
                    confidence: MATCH_CONFIDENCE,
                }
            }
            None => SpeciesMatch::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> SpeciesResolver {
        SpeciesResolver::new(Arc::new(SpeciesCatalog::reference()))
    }

    fn name(m: &SpeciesMatch) -> &str {
        &m.record.as_ref().unwrap().common_name
    }

    #[test]
    fn branch_resolves_to_first_branching_record() {
        let resolver = resolver();
        for text in ["branching coral", "BRANCH", "a branched colony"] {
            let m = resolver.identify(text);
            assert_eq!(name(&m), "Staghorn Coral");
            assert_eq!(m.confidence, 85.5);
        }
    }

    #[test]
    fn rules_apply_in_priority_order() {
        let resolver = resolver();
        assert_eq!(name(&resolver.identify("massive dome")), "Great Star Coral");
        assert_eq!(name(&resolver.identify("plate/table coral")), "Table Coral");
        // "branch" outranks "table"
        assert_eq!(name(&resolver.identify("table with branches")), "Staghorn Coral");
    }

    #[test]
    fn unmatched_text_falls_back_to_first_record() {
        let resolver = resolver();
        assert_eq!(name(&resolver.identify("encrusting coral")), "Staghorn Coral");
        assert_eq!(name(&resolver.identify("unknown coral")), "Staghorn Coral");
    }

    #[test]
    fn empty_catalog_yields_no_match() {
        let resolver = SpeciesResolver::new(Arc::new(SpeciesCatalog::new(Vec::new())));
        assert_eq!(resolver.identify("branching coral"), SpeciesMatch::none());
    }

    #[test]
    fn category_without_records_yields_no_match() {
        let catalog = SpeciesCatalog::new(
            SpeciesCatalog::reference()
                .records()
                .iter()
                .filter(|r| r.morphology != Morphology::PlateTable)
                .cloned()
                .collect(),
        );
        let resolver = SpeciesResolver::new(Arc::new(catalog));
        assert_eq!(resolver.identify("plate coral"), SpeciesMatch::none());
    }
}
