use crate::CaptionProvider;
use async_trait::async_trait;
use image::RgbImage;
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use storage::Storage;

/// A fresh directory under the system temp dir, removed on drop.
pub struct TestDir(PathBuf);

impl TestDir {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn storage(&self) -> Storage {
        Storage::new_fs(&self.0).unwrap()
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Returns the queued captions in order.
pub struct ScriptedCaptions(Mutex<VecDeque<String>>);

impl ScriptedCaptions {
    pub fn new(captions: &[&str]) -> Self {
        Self(Mutex::new(captions.iter().map(|c| c.to_string()).collect()))
    }
}

#[async_trait]
impl CaptionProvider for ScriptedCaptions {
    async fn caption(&self, _image: &RgbImage) -> anyhow::Result<String> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no caption left"))
    }
}

pub struct FailingCaptions;

#[async_trait]
impl CaptionProvider for FailingCaptions {
    async fn caption(&self, _image: &RgbImage) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("weights not found").context("failed to load model"))
    }
}

pub struct SlowCaptions(pub Duration);

#[async_trait]
impl CaptionProvider for SlowCaptions {
    async fn caption(&self, _image: &RgbImage) -> anyhow::Result<String> {
        tokio::time::sleep(self.0).await;
        Ok("too late".to_string())
    }
}

pub fn sample_image(width: u32, height: u32) -> image::DynamicImage {
    image::DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 10) as u8, (y * 10) as u8, 128])
    }))
}
