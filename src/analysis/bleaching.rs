use super::color::UnitHsv;
use super::kmeans::{KMeans, Point3};
use crate::config::{BleachingConfig, SampleStrategy};
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Brown-to-green hue bands a living, pigmented colony tends to show.
const HEALTHY_HUE_BANDS: [(f32, f32); 2] = [(0.05, 0.2), (0.2, 0.4)];
const HEALTHY_SATURATION: (f32, f32) = (0.3, 0.8);
const HEALTHY_VALUE: (f32, f32) = (0.3, 0.7);
const PALE_MAX_SATURATION: f32 = 0.3;
const PALE_MIN_VALUE: f32 = 0.7;

const MIN_CONFIDENCE: f32 = 30.0;
const MAX_CONFIDENCE: f32 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "Severely Bleached")]
    SeverelyBleached,
    #[serde(rename = "Moderately Bleached")]
    ModeratelyBleached,
    #[serde(rename = "Mild Stress")]
    MildStress,
    Watch,
    Healthy,
    /// Input could not be read.
    Unknown,
}

impl HealthStatus {
    /// Thresholds are strict, so 40, 20, 10 and 5 fall into the lower bracket.
    pub fn from_percentage(percentage: f32) -> Self {
        if percentage > 40.0 {
            HealthStatus::SeverelyBleached
        } else if percentage > 20.0 {
            HealthStatus::ModeratelyBleached
        } else if percentage > 10.0 {
            HealthStatus::MildStress
        } else if percentage > 5.0 {
            HealthStatus::Watch
        } else {
            HealthStatus::Healthy
        }
    }

    /// Status confidence for a computed percentage, clamped to `[30, 95]`.
    pub fn confidence_for(self, percentage: f32) -> f32 {
        let raw = match self {
            HealthStatus::SeverelyBleached => percentage.min(MAX_CONFIDENCE),
            HealthStatus::ModeratelyBleached => 75.0 + (percentage - 20.0),
            HealthStatus::MildStress => 65.0 + (percentage - 10.0),
            HealthStatus::Watch => 60.0,
            HealthStatus::Healthy => 95.0 - percentage,
            HealthStatus::Unknown => return 0.0,
        };
        raw.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::SeverelyBleached => "Severely Bleached",
            HealthStatus::ModeratelyBleached => "Moderately Bleached",
            HealthStatus::MildStress => "Mild Stress",
            HealthStatus::Watch => "Watch",
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Unknown => "Unknown",
        }
    }

    pub fn is_bleached(&self) -> bool {
        matches!(
            self,
            HealthStatus::SeverelyBleached | HealthStatus::ModeratelyBleached
        )
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTone {
    Healthy,
    Pale,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    pub rgb: [u8; 3],
    pub hsv: UnitHsv,
    pub tone: ColorTone,
}

impl DominantColor {
    pub fn from_center(center: &Point3) -> Self {
        // cluster centers are truncated toward zero
        let rgb = [
            center[0].clamp(0.0, 255.0) as u8,
            center[1].clamp(0.0, 255.0) as u8,
            center[2].clamp(0.0, 255.0) as u8,
        ];
        let hsv = UnitHsv::from_rgb(rgb);
        Self {
            rgb,
            hsv,
            tone: classify_tone(&hsv),
        }
    }
}

fn within(v: f32, (lo, hi): (f32, f32)) -> bool {
    (lo..=hi).contains(&v)
}

fn classify_tone(hsv: &UnitHsv) -> ColorTone {
    let pigmented =
        within(hsv.saturation, HEALTHY_SATURATION) && within(hsv.value, HEALTHY_VALUE);
    if pigmented && HEALTHY_HUE_BANDS.iter().any(|band| within(hsv.hue, *band)) {
        ColorTone::Healthy
    } else if hsv.saturation < PALE_MAX_SATURATION && hsv.value > PALE_MIN_VALUE {
        ColorTone::Pale
    } else {
        ColorTone::Other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BleachingReport {
    pub white_pixel_ratio: f32,
    pub color_diversity: f32,
    pub healthy_color_ratio: f32,
    pub pale_color_count: usize,
    pub bleaching_score: f32,
    pub bleaching_percentage: f32,
    pub health_status: HealthStatus,
    pub confidence: f32,
    pub dominant_colors: Vec<DominantColor>,
}

impl BleachingReport {
    /// Sentinel for input that could not be decoded.
    pub fn unreadable() -> Self {
        Self {
            white_pixel_ratio: 0.0,
            color_diversity: 0.0,
            healthy_color_ratio: 0.0,
            pale_color_count: 0,
            bleaching_score: 0.0,
            bleaching_percentage: 0.0,
            health_status: HealthStatus::Unknown,
            confidence: 0.0,
            dominant_colors: Vec::new(),
        }
    }
}

/// Colour-statistics proxy for bleaching severity.
#[derive(Debug, Clone, Default)]
pub struct BleachingEstimator {
    config: BleachingConfig,
}

impl BleachingEstimator {
    pub fn new(config: BleachingConfig) -> Self {
        Self { config }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn estimate(&self, image: &DynamicImage) -> BleachingReport {
        let rgb = image.to_rgb8();

        let white_pixel_ratio = self.white_pixel_ratio(&rgb);
        let dominant_colors = self.dominant_colors(&rgb);

        let (color_diversity, healthy_color_ratio) = if dominant_colors.is_empty() {
            (0.0, 0.0)
        } else {
            let n = dominant_colors.len() as f32;
            let saturation: f32 = dominant_colors.iter().map(|c| c.hsv.saturation).sum();
            let healthy = dominant_colors
                .iter()
                .filter(|c| c.tone == ColorTone::Healthy)
                .count();
            (saturation / n, healthy as f32 / n)
        };
        let pale_color_count = dominant_colors
            .iter()
            .filter(|c| c.tone == ColorTone::Pale)
            .count();

        let bleaching_score = (self.config.white_weight * white_pixel_ratio
            + self.config.diversity_weight * (1.0 - color_diversity)
            + self.config.healthy_weight * (1.0 - healthy_color_ratio))
            .clamp(0.0, 1.0);
        let bleaching_percentage = bleaching_score * 100.0;
        let health_status = HealthStatus::from_percentage(bleaching_percentage);
        let confidence = health_status.confidence_for(bleaching_percentage);

        debug!(
            white_pixels = white_pixel_ratio * 100.0,
            color_diversity,
            healthy_color_ratio,
            "Bleaching analysis: {:.1}% - {}",
            bleaching_percentage,
            health_status
        );

        BleachingReport {
            white_pixel_ratio,
            color_diversity,
            healthy_color_ratio,
            pale_color_count,
            bleaching_score,
            bleaching_percentage,
            health_status,
            confidence,
            dominant_colors,
        }
    }

    /// Decode and estimate; unreadable input yields [`BleachingReport::unreadable`].
    pub fn estimate_file(&self, path: &Path) -> BleachingReport {
        match image::open(path) {
            Ok(image) => self.estimate(&image),
            Err(e) => {
                warn!("Cannot read image {}: {}", path.display(), e);
                BleachingReport::unreadable()
            }
        }
    }

    /// Fraction of pixels that are low-chroma and bright.
    pub fn white_pixel_ratio(&self, rgb: &RgbImage) -> f32 {
        let total = rgb.width() as usize * rgb.height() as usize;
        if total == 0 {
            return 0.0;
        }
        let white = rgb
            .pixels()
            .filter(|p| {
                let hsv = UnitHsv::from_rgb(p.0);
                hsv.saturation_u8() <= self.config.white_max_saturation
                    && hsv.value_u8() >= self.config.white_min_value
            })
            .count();
        white as f32 / total as f32
    }

    /// Cluster a bounded pixel sample into the configured number of colours.
    pub fn dominant_colors(&self, rgb: &RgbImage) -> Vec<DominantColor> {
        let samples = self.sample(rgb);
        let clustering = KMeans::new(self.config.clusters)
            .with_initializations(self.config.initializations)
            .with_max_iterations(self.config.max_iterations)
            .with_tolerance(self.config.tolerance)
            .with_seed(self.config.seed)
            .fit(&samples);

        match clustering {
            Some(clustering) => clustering
                .centers
                .iter()
                .map(DominantColor::from_center)
                .collect(),
            None => Vec::new(),
        }
    }

    fn sample(&self, rgb: &RgbImage) -> Vec<Point3> {
        let total = rgb.width() as usize * rgb.height() as usize;
        let limit = self.config.max_samples.min(total);
        let step = match self.config.sample_strategy {
            SampleStrategy::Leading => 1,
            SampleStrategy::Strided => total.div_ceil(limit.max(1)).max(1),
        };

        rgb.pixels()
            .step_by(step)
            .take(limit)
            .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
            .collect()
    }
}
