use super::AIModel;
use image::RgbImage;

#[derive(Debug, Clone)]
pub struct ImageCaptionInput {
    pub image: RgbImage,
    /// conditional captioning: the caption will continue this text
    pub prompt: Option<String>,
}

impl From<RgbImage> for ImageCaptionInput {
    fn from(image: RgbImage) -> Self {
        Self {
            image,
            prompt: None,
        }
    }
}

pub type ImageCaptionOutput = String;
pub type ImageCaptionModel = AIModel<ImageCaptionInput, ImageCaptionOutput>;
