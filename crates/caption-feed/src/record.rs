use serde::{Deserialize, Serialize};

/// One captioned image. Never updated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    /// file name inside the image directory, e.g. `<uuid>.jpg`
    #[serde(rename = "image")]
    pub image_filename: String,
    pub caption: String,
}

impl FeedRecord {
    pub fn new(image_filename: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            image_filename: image_filename.into(),
            caption: caption.into(),
        }
    }
}
