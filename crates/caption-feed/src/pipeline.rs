use crate::{
    view::{self, FeedItem},
    CaptionProvider, FeedError, FeedLedger, FeedResult, ImageStore,
};
use image::DynamicImage;
use std::{sync::Arc, time::Duration};

pub const DEFAULT_CAPTION_TIMEOUT: Duration = Duration::from_secs(120);

/// caption -> store image -> record -> project
#[derive(Clone)]
pub struct FeedPipeline {
    provider: Arc<dyn CaptionProvider>,
    image_store: ImageStore,
    ledger: FeedLedger,
    caption_timeout: Duration,
}

impl FeedPipeline {
    pub fn new(
        provider: Arc<dyn CaptionProvider>,
        image_store: ImageStore,
        ledger: FeedLedger,
        caption_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            image_store,
            ledger,
            caption_timeout,
        }
    }

    pub fn image_store(&self) -> &ImageStore {
        &self.image_store
    }

    pub fn ledger(&self) -> &FeedLedger {
        &self.ledger
    }

    pub async fn feed(&self) -> FeedResult<Vec<FeedItem>> {
        Ok(view::project(&self.ledger.load().await?, &self.image_store))
    }

    /// Without an image nothing changes and the current feed is returned.
    ///
    /// The ledger is only touched after both the caption and the image file
    /// exist, so a failure in either leaves the feed as it was.
    #[tracing::instrument(skip_all, err(Debug))]
    pub async fn submit(&self, image: Option<DynamicImage>) -> FeedResult<Vec<FeedItem>> {
        let image = match image {
            Some(image) => image,
            None => {
                tracing::debug!("no image submitted");
                return self.feed().await;
            }
        };

        let image = ImageStore::normalize(&image);
        let caption = tokio::time::timeout(self.caption_timeout, self.provider.caption(&image))
            .await
            .map_err(|_| {
                FeedError::Provider(format!("caption timed out after {:?}", self.caption_timeout))
            })?
            .map_err(|e| FeedError::Provider(format!("{:#}", e)))?;

        let image_filename = self.image_store.store_rgb(&image).await?;
        let records = self.ledger.record(image_filename.as_str(), caption.as_str()).await?;
        tracing::info!(%image_filename, %caption, "added to feed");

        Ok(view::project(&records, &self.image_store))
    }
}
