use crate::config::MorphologyConfig;
use image::{DynamicImage, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::edges::canny;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Gross growth form of a colony.
///
/// The classifier only ever produces `Branching`, `PlateTable`, `Boulder`,
/// `Encrusting` or `Unknown`; `Plate` and `Soft` exist for reference records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Morphology {
    Branching,
    Boulder,
    #[serde(rename = "Plate/Table")]
    PlateTable,
    Plate,
    Encrusting,
    Soft,
    Unknown,
}

impl Morphology {
    pub fn label(&self) -> &'static str {
        match self {
            Morphology::Branching => "Branching",
            Morphology::Boulder => "Boulder",
            Morphology::PlateTable => "Plate/Table",
            Morphology::Plate => "Plate",
            Morphology::Encrusting => "Encrusting",
            Morphology::Soft => "Soft",
            Morphology::Unknown => "Unknown",
        }
    }

    /// Short descriptor handed to the species resolver, e.g. `"branching coral"`.
    pub fn descriptor(&self) -> String {
        format!("{} coral", self.label().to_lowercase())
    }
}

impl fmt::Display for Morphology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Shape descriptors of the largest external contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphologyFeatures {
    /// `4π·area / perimeter²`, capped at 1.
    pub circularity: f64,
    pub aspect_ratio: f64,
    pub area: f64,
    pub perimeter: f64,
    pub contour_count: usize,
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphologyReport {
    pub morphology: Morphology,
    /// `None` when nothing could be measured.
    pub features: Option<MorphologyFeatures>,
}

impl MorphologyReport {
    pub fn unknown() -> Self {
        Self {
            morphology: Morphology::Unknown,
            features: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MorphologyClassifier {
    config: MorphologyConfig,
}

impl MorphologyClassifier {
    pub fn new(config: MorphologyConfig) -> Self {
        Self { config }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn analyze(&self, image: &DynamicImage) -> MorphologyReport {
        let gray = image.to_luma8();
        let edges = canny(&gray, self.config.canny_low, self.config.canny_high);

        match self.features_from_edges(&edges) {
            Some(features) => {
                let morphology = self.classify(&features);
                debug!(
                    circularity = features.circularity,
                    aspect_ratio = features.aspect_ratio,
                    contours = features.contour_count,
                    "Morphology: {}",
                    morphology
                );
                MorphologyReport {
                    morphology,
                    features: Some(features),
                }
            }
            None => {
                debug!("No contour found in edge map");
                MorphologyReport::unknown()
            }
        }
    }

    /// Decode and analyze; unreadable input yields [`MorphologyReport::unknown`].
    pub fn analyze_file(&self, path: &Path) -> MorphologyReport {
        match image::open(path) {
            Ok(image) => self.analyze(&image),
            Err(e) => {
                warn!("Cannot read image {}: {}", path.display(), e);
                MorphologyReport::unknown()
            }
        }
    }

    /// Measure the largest external contour of a binary edge map.
    ///
    /// Contours are visited in raster-scan order of their first border pixel;
    /// among equal areas the first one wins.
    pub fn features_from_edges(&self, edges: &GrayImage) -> Option<MorphologyFeatures> {
        let external: Vec<Contour<i32>> = find_contours::<i32>(edges)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .collect();

        let mut largest: Option<(&Contour<i32>, f64)> = None;
        for contour in &external {
            let area = polygon_area(&contour.points);
            if largest.map_or(true, |(_, best)| area > best) {
                largest = Some((contour, area));
            }
        }
        let (contour, area) = largest?;

        let perimeter = closed_arc_length(&contour.points);
        let circularity = if perimeter > 0.0 {
            (4.0 * PI * area / (perimeter * perimeter)).min(1.0)
        } else {
            0.0
        };
        let bounding_box = bounding_box(&contour.points)?;
        let aspect_ratio = if bounding_box.height > 0 {
            bounding_box.width as f64 / bounding_box.height as f64
        } else {
            0.0
        };

        Some(MorphologyFeatures {
            circularity,
            aspect_ratio,
            area,
            perimeter,
            contour_count: external.len(),
            bounding_box,
        })
    }

    pub fn classify(&self, features: &MorphologyFeatures) -> Morphology {
        let c = &self.config;
        if features.circularity < c.branching_max_circularity {
            Morphology::Branching
        } else if features.circularity < c.encrusting_min_circularity {
            if features.aspect_ratio > c.plate_min_aspect || features.aspect_ratio < c.plate_max_aspect {
                Morphology::PlateTable
            } else {
                Morphology::Boulder
            }
        } else {
            Morphology::Encrusting
        }
    }
}

/// Shoelace area of the closed polygon through the border points.
fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (twice as f64 / 2.0).abs()
}

fn closed_arc_length(points: &[Point<i32>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| (((p.x - q.x).pow(2) + (p.y - q.y).pow(2)) as f64).sqrt())
        .sum()
}

fn bounding_box(points: &[Point<i32>]) -> Option<BoundingBox> {
    let min_x = points.iter().map(|p| p.x).min()?;
    let max_x = points.iter().map(|p| p.x).max()?;
    let min_y = points.iter().map(|p| p.y).min()?;
    let max_y = points.iter().map(|p| p.y).max()?;
    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    fn features(circularity: f64, aspect_ratio: f64) -> MorphologyFeatures {
        MorphologyFeatures {
            circularity,
            aspect_ratio,
            area: 100.0,
            perimeter: 40.0,
            contour_count: 1,
            bounding_box: BoundingBox { x: 0, y: 0, width: 10, height: 10 },
        }
    }

    fn disk_mask(size: u32, radius: f64) -> GrayImage {
        let c = size as f64 / 2.0;
        GrayImage::from_fn(size, size, |x, y| {
            let d = ((x as f64 - c).powi(2) + (y as f64 - c).powi(2)).sqrt();
            Luma([if d <= radius { 255 } else { 0 }])
        })
    }

    #[test]
    fn classification_rule_order() {
        let classifier = MorphologyClassifier::default();
        assert_eq!(classifier.classify(&features(0.1, 1.0)), Morphology::Branching);
        assert_eq!(classifier.classify(&features(0.3, 1.0)), Morphology::Boulder);
        assert_eq!(classifier.classify(&features(0.45, 2.0)), Morphology::PlateTable);
        assert_eq!(classifier.classify(&features(0.45, 0.5)), Morphology::PlateTable);
        assert_eq!(classifier.classify(&features(0.45, 1.5)), Morphology::Boulder);
        assert_eq!(classifier.classify(&features(0.6, 3.0)), Morphology::Encrusting);
    }

    #[test]
    fn filled_disk_is_encrusting() {
        let classifier = MorphologyClassifier::default();
        let features = classifier.features_from_edges(&disk_mask(100, 30.0)).unwrap();
        assert!(features.circularity >= 0.6, "circularity {}", features.circularity);
        assert!(features.circularity <= 1.0);
        assert!((features.aspect_ratio - 1.0).abs() < 0.05);
        assert_eq!(classifier.classify(&features), Morphology::Encrusting);
    }

    #[test]
    fn thin_bar_is_branching() {
        let mut edges = GrayImage::new(140, 40);
        for y in 18..21 {
            for x in 20..120 {
                edges.put_pixel(x, y, Luma([255]));
            }
        }
        let classifier = MorphologyClassifier::default();
        let features = classifier.features_from_edges(&edges).unwrap();
        assert_eq!(features.area, 198.0);
        assert_eq!(features.bounding_box.width, 100);
        assert_eq!(features.bounding_box.height, 3);
        assert_eq!(classifier.classify(&features), Morphology::Branching);
    }

    #[test]
    fn equal_areas_resolve_to_first_in_scan_order() {
        let mut edges = GrayImage::new(60, 60);
        for (ox, oy) in [(35u32, 5u32), (5, 35)] {
            for y in oy..oy + 10 {
                for x in ox..ox + 10 {
                    edges.put_pixel(x, y, Luma([255]));
                }
            }
        }
        let features = MorphologyClassifier::default()
            .features_from_edges(&edges)
            .unwrap();
        assert_eq!(features.contour_count, 2);
        assert_eq!(features.bounding_box.y, 5);
    }

    #[test]
    fn blank_image_is_unknown() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(64, 64, Rgb([90, 90, 90])));
        let report = MorphologyClassifier::default().analyze(&img);
        assert_eq!(report, MorphologyReport::unknown());
    }

    #[test]
    fn photo_of_a_disk_yields_a_label() {
        let mask = disk_mask(120, 35.0);
        let img = DynamicImage::ImageLuma8(mask);
        let report = MorphologyClassifier::default().analyze(&img);
        assert_ne!(report.morphology, Morphology::Unknown);
        assert!(report.features.unwrap().contour_count >= 1);
    }

    #[test]
    fn photographed_disk_is_encrusting() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_fn(120, 120, |x, y| {
            let d = ((x as f64 - 60.0).powi(2) + (y as f64 - 60.0).powi(2)).sqrt();
            if d <= 35.0 {
                Rgb([230, 200, 160])
            } else {
                Rgb([10, 30, 70])
            }
        }));
        let report = MorphologyClassifier::default().analyze(&img);
        let features = report.features.unwrap();
        assert!(features.circularity >= 0.6, "circularity {}", features.circularity);
        assert_eq!(report.morphology, Morphology::Encrusting);
    }

    #[test]
    fn photographed_thin_bar_is_branching() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_fn(160, 60, |x, y| {
            if (20..140).contains(&x) && (28..32).contains(&y) {
                Rgb([230, 200, 160])
            } else {
                Rgb([10, 30, 70])
            }
        }));
        let report = MorphologyClassifier::default().analyze(&img);
        let features = report.features.unwrap();
        assert!(features.circularity < 0.3, "circularity {}", features.circularity);
        assert_eq!(report.morphology, Morphology::Branching);
    }

    #[test]
    fn descriptor_feeds_the_resolver() {
        assert_eq!(Morphology::Branching.descriptor(), "branching coral");
        assert_eq!(Morphology::PlateTable.descriptor(), "plate/table coral");
    }

    #[test]
    fn unreadable_file_is_unknown() {
        let report = MorphologyClassifier::default().analyze_file(Path::new("/no/such/reef.bmp"));
        assert_eq!(report.morphology, Morphology::Unknown);
        assert!(report.features.is_none());
    }
}
