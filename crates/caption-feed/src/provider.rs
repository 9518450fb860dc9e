use ai::ImageCaptionModel;
use async_trait::async_trait;
use image::RgbImage;

/// Turns an image into a natural-language description.
///
/// Implementations may be slow; callers apply their own timeout.
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    async fn caption(&self, image: &RgbImage) -> anyhow::Result<String>;
}

#[async_trait]
impl CaptionProvider for ImageCaptionModel {
    async fn caption(&self, image: &RgbImage) -> anyhow::Result<String> {
        self.process_single(image.clone().into()).await
    }
}
