use crate::FeedResult;
use image::{codecs::jpeg::JpegEncoder, DynamicImage, RgbImage};
use storage::Storage;

pub const DEFAULT_IMAGE_DIR: &str = "saved_images";
pub const IMAGE_EXTENSION: &str = "jpg";
const JPEG_QUALITY: u8 = 90;

/// Writes submitted images as `<dir>/<uuid>.jpg`.
///
/// Files are never overwritten or removed.
#[derive(Clone, Debug)]
pub struct ImageStore {
    storage: Storage,
    dir: String,
}

impl ImageStore {
    pub fn new(storage: Storage, dir: impl Into<String>) -> Self {
        Self {
            storage,
            dir: dir.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn init(&self) -> FeedResult<()> {
        self.storage.create_dir(&self.dir).await?;
        Ok(())
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Path of a stored image relative to the data root, `/`-separated.
    pub fn image_path(&self, image_filename: &str) -> String {
        format!("{}/{}", self.dir, image_filename)
    }

    /// Grayscale, palette, alpha and 16-bit inputs all become 8-bit RGB.
    pub fn normalize(image: &DynamicImage) -> RgbImage {
        match image {
            DynamicImage::ImageRgb8(rgb) => rgb.clone(),
            other => other.to_rgb8(),
        }
    }

    pub async fn store(&self, image: &DynamicImage) -> FeedResult<String> {
        self.store_rgb(&Self::normalize(image)).await
    }

    /// Returns the file name, not the full path.
    pub async fn store_rgb(&self, image: &RgbImage) -> FeedResult<String> {
        let mut data = Vec::new();
        JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY).encode_image(image)?;

        let image_filename = format!("{}.{}", uuid::Uuid::new_v4(), IMAGE_EXTENSION);
        self.storage
            .write(self.image_path(&image_filename), data)
            .await?;

        tracing::debug!("image saved as {}", image_filename);
        Ok(image_filename)
    }
}
