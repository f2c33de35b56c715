use super::clahe::clahe;
use super::color::{lab8_to_rgb, rgb_to_lab8};
use crate::config::EnhancementConfig;
use crate::error::AppError;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::filter::filter3x3;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Center 5, orthogonal neighbours -1, diagonals 0.
const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Underwater colour-cast correction for display.
///
/// Lightness gets local contrast equalization, the blue-yellow chroma is
/// pulled toward neutral, and the result is sharpened. The output is never
/// fed back into the analytic stages.
#[derive(Debug, Clone, Default)]
pub struct Enhancer {
    config: EnhancementConfig,
}

impl Enhancer {
    pub fn new(config: EnhancementConfig) -> Self {
        Self { config }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn enhance(&self, image: &DynamicImage) -> RgbImage {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let mut lightness = GrayImage::new(width, height);
        let mut chroma = Vec::with_capacity((width * height) as usize);
        for (x, y, pixel) in rgb.enumerate_pixels() {
            let [l, a, b] = rgb_to_lab8(pixel.0);
            lightness.put_pixel(x, y, Luma([l]));
            chroma.push((a, self.neutralize(b)));
        }

        let lightness = clahe(
            &lightness,
            self.config.clip_limit,
            self.config.tile_cols,
            self.config.tile_rows,
        );

        let corrected = RgbImage::from_fn(width, height, |x, y| {
            let (a, b) = chroma[(y * width + x) as usize];
            Rgb(lab8_to_rgb([lightness.get_pixel(x, y)[0], a, b]))
        });
        debug!("Colour cast corrected");

        if self.config.sharpen {
            filter3x3(&corrected, &SHARPEN_KERNEL)
        } else {
            corrected
        }
    }

    /// Decode and enhance; `None` when the file cannot be read.
    pub fn enhance_file(&self, path: &Path) -> Option<RgbImage> {
        match image::open(path) {
            Ok(image) => Some(self.enhance(&image)),
            Err(e) => {
                warn!("Cannot read image {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, image: &RgbImage, path: &Path) -> Result<(), AppError> {
        image.save(path).map_err(|source| AppError::ImageSave {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Saved enhanced image to {}", path.display());
        Ok(())
    }

    fn neutralize(&self, b: u8) -> u8 {
        let retention = self.config.blue_retention;
        let blended = b as f32 * retention + self.config.neutral_chroma as f32 * (1.0 - retention);
        blended.round().clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn solid(rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(40, 30, Rgb(rgb)))
    }

    #[test]
    fn keeps_dimensions() {
        let out = Enhancer::default().enhance(&solid([20, 60, 150]));
        assert_eq!(out.dimensions(), (40, 30));
    }

    #[test]
    fn enhances_every_small_size() {
        let enhancer = Enhancer::default();
        for height in 1..=64 {
            for width in 1..=64 {
                let img = DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |x, y| {
                    Rgb([(x * 4) as u8, (y * 4) as u8, 150])
                }));
                assert_eq!(enhancer.enhance(&img).dimensions(), (width, height));
            }
        }
    }

    #[test]
    fn pulls_blue_cast_toward_neutral() {
        let input = [30, 70, 160];
        let out = Enhancer::default().enhance(&solid(input));
        let center = out.get_pixel(20, 15).0;

        let before = rgb_to_lab8(input)[2] as i32 - 128;
        let after = rgb_to_lab8(center)[2] as i32 - 128;
        assert!(before < 0);
        assert!(after.abs() < before.abs(), "b* {before} -> {after}");
    }

    #[test]
    fn neutral_blend_matches_weights() {
        let enhancer = Enhancer::default();
        assert_eq!(enhancer.neutralize(128), 128);
        assert_eq!(enhancer.neutralize(28), 58);
        assert_eq!(enhancer.neutralize(228), 198);
    }

    #[test]
    fn sharpen_kernel_leaves_flat_regions_alone() {
        let config = EnhancementConfig {
            sharpen: true,
            ..EnhancementConfig::default()
        };
        let out = Enhancer::new(config).enhance(&solid([128, 128, 128]));
        let first = *out.get_pixel(0, 0);
        assert!(out.pixels().all(|p| *p == first));
    }

    #[test]
    fn unreadable_file_yields_none() {
        assert!(Enhancer::default()
            .enhance_file(Path::new("/no/such/coral.png"))
            .is_none());
    }
}
