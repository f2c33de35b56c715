use crate::error::AppError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `CORALSCAN__BLEACHING__SEED=7`.
pub const ENV_PREFIX: &str = "CORALSCAN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub enhancement: EnhancementConfig,
    pub bleaching: BleachingConfig,
    pub morphology: MorphologyConfig,
    pub store: StoreConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enhancement: EnhancementConfig::default(),
            bleaching: BleachingConfig::default(),
            morphology: MorphologyConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Settings {
    /// Layer defaults, an optional settings file and `CORALSCAN__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.enhancement.validate()?;
        self.bleaching.validate()?;
        self.morphology.validate()?;
        Ok(())
    }
}

/// Display-only colour-cast correction and sharpening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementConfig {
    pub clip_limit: f32,
    pub tile_cols: u32,
    pub tile_rows: u32,
    /// Weight kept from the original blue-yellow chroma; the rest goes to neutral.
    pub blue_retention: f32,
    pub neutral_chroma: u8,
    pub sharpen: bool,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tile_cols: 8,
            tile_rows: 8,
            blue_retention: 0.7,
            neutral_chroma: 128,
            sharpen: true,
        }
    }
}

impl EnhancementConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.clip_limit <= 0.0 {
            return Err(AppError::Config(
                "Enhancement clip limit must be positive".to_string(),
            ));
        }
        if self.tile_cols == 0 || self.tile_rows == 0 {
            return Err(AppError::Config(
                "Enhancement tile grid must be at least 1x1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.blue_retention) {
            return Err(AppError::Config(
                "Blue retention must be between 0.0 and 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleStrategy {
    /// First pixels in row-major order.
    Leading,
    /// Evenly spaced pixels across the whole image.
    Strided,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BleachingConfig {
    /// Saturation ceiling (0-255 scale) for a near-white pixel.
    pub white_max_saturation: u8,
    /// Value floor (0-255 scale) for a near-white pixel.
    pub white_min_value: u8,
    pub clusters: usize,
    pub initializations: usize,
    pub seed: u64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub max_samples: usize,
    pub sample_strategy: SampleStrategy,
    pub white_weight: f32,
    pub diversity_weight: f32,
    pub healthy_weight: f32,
}

impl Default for BleachingConfig {
    fn default() -> Self {
        Self {
            white_max_saturation: 30,
            white_min_value: 180,
            clusters: 5,
            initializations: 10,
            seed: 42,
            max_iterations: 300,
            tolerance: 1e-4,
            max_samples: 5000,
            sample_strategy: SampleStrategy::Leading,
            white_weight: 0.6,
            diversity_weight: 0.2,
            healthy_weight: 0.2,
        }
    }
}

impl BleachingConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.clusters == 0 {
            return Err(AppError::Config(
                "At least one colour cluster is required".to_string(),
            ));
        }
        if self.initializations == 0 {
            return Err(AppError::Config(
                "At least one k-means initialization is required".to_string(),
            ));
        }
        if self.max_samples < self.clusters {
            return Err(AppError::Config(format!(
                "Sample size {} is smaller than cluster count {}",
                self.max_samples, self.clusters
            )));
        }
        let weights = self.white_weight + self.diversity_weight + self.healthy_weight;
        if (weights - 1.0).abs() > 1e-3 {
            return Err(AppError::Config(format!(
                "Bleaching weights must sum to 1.0, got {weights:.3}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyConfig {
    pub canny_low: f32,
    pub canny_high: f32,
    pub branching_max_circularity: f64,
    pub encrusting_min_circularity: f64,
    pub plate_min_aspect: f64,
    pub plate_max_aspect: f64,
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            branching_max_circularity: 0.3,
            encrusting_min_circularity: 0.6,
            plate_min_aspect: 1.5,
            plate_max_aspect: 0.667,
        }
    }
}

impl MorphologyConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.canny_low > self.canny_high {
            return Err(AppError::Config(
                "Canny low threshold must not exceed the high threshold".to_string(),
            ));
        }
        if self.branching_max_circularity > self.encrusting_min_circularity {
            return Err(AppError::Config(
                "Circularity cut-offs overlap".to_string(),
            ));
        }
        if self.plate_max_aspect >= self.plate_min_aspect {
            return Err(AppError::Config(
                "Plate aspect bounds overlap".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("coral_analyses.jsonl"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn rejects_unbalanced_weights() {
        let mut settings = Settings::default();
        settings.bleaching.white_weight = 0.9;
        assert!(matches!(settings.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn rejects_inverted_canny_thresholds() {
        let config = MorphologyConfig {
            canny_low: 200.0,
            ..MorphologyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn environment_overrides_nested_keys() {
        std::env::set_var("CORALSCAN__STORE__ENABLED", "true");
        std::env::set_var("CORALSCAN__BLEACHING__MAX_ITERATIONS", "120");
        let settings = Settings::load(None);
        std::env::remove_var("CORALSCAN__STORE__ENABLED");
        std::env::remove_var("CORALSCAN__BLEACHING__MAX_ITERATIONS");

        let settings = settings.unwrap();
        assert!(settings.store.enabled);
        assert_eq!(settings.bleaching.max_iterations, 120);
        assert_eq!(settings.bleaching.seed, 42);
    }

    #[test]
    fn loads_partial_file_over_defaults() {
        let path = std::env::temp_dir().join(format!("coralscan-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[bleaching]\nseed = 7\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.bleaching.seed, 7);
        assert_eq!(settings.bleaching.clusters, 5);
        assert_eq!(settings.morphology.canny_high, 150.0);
    }
}
