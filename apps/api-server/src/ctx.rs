use crate::Config;
use caption_feed::{
    CaptionProvider, FeedLedger, FeedPipeline, ImageStore, DEFAULT_IMAGE_DIR, DEFAULT_LEDGER_FILE,
};
use std::{path::PathBuf, sync::Arc};
use storage::Storage;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct Ctx {
    pub pipeline: FeedPipeline,
    pub data_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Ctx {
    pub async fn new(config: &Config, provider: Arc<dyn CaptionProvider>) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let storage = Storage::new_fs(&config.data_dir)?;

        let image_store = ImageStore::new(storage.clone(), DEFAULT_IMAGE_DIR);
        image_store.init().await?;
        let ledger = FeedLedger::new(storage, DEFAULT_LEDGER_FILE);

        let records = ledger.load().await?;
        tracing::info!(
            "feed ledger at {}, {} records",
            ledger.path().display(),
            records.len()
        );

        Ok(Self {
            pipeline: FeedPipeline::new(provider, image_store, ledger, config.caption_timeout),
            data_dir: config.data_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    pub fn image_dir(&self) -> PathBuf {
        self.data_dir.join(self.pipeline.image_store().dir())
    }
}
