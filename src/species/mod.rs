pub mod catalog;
pub mod resolver;

pub use catalog::{BleachingResistance, SpeciesCatalog, SpeciesRecord};
pub use resolver::{SpeciesMatch, SpeciesResolver, MATCH_CONFIDENCE};
