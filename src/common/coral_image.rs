use crate::error::AppError;
use chrono::{DateTime, Utc};
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// A decoded photograph plus the identity the result record is keyed on.
///
/// The pixel buffer is shared, never mutated; every stage derives its own
/// working copy.
#[derive(Clone)]
pub struct CoralImage {
    id: Uuid,
    filename: String,
    image: Arc<DynamicImage>,
    loaded_at: DateTime<Utc>,
}

impl CoralImage {
    pub fn new(filename: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            image: Arc::new(image),
            loaded_at: Utc::now(),
        }
    }

    /// Decode a JPEG/PNG/BMP (or any format `image` recognises) from disk.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let image = image::open(path).map_err(|source| AppError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(display_name(path), image))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn cloning_shares_image_buffer() {
        let img = DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
            16,
            16,
            Rgb([1, 2, 3]),
        ));
        let first = CoralImage::new("reef.png", img);
        let second = first.clone();
        assert!(Arc::ptr_eq(&first.image, &second.image));
        assert_eq!(second.dimensions(), (16, 16));
    }

    #[test]
    fn missing_file_is_an_image_load_error() {
        let err = CoralImage::open(Path::new("/definitely/not/here.jpg"))
            .err()
            .unwrap();
        assert!(err.is_unreadable_input());
    }
}
