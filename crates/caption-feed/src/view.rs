//! Projection of ledger records into gallery items.

use crate::{FeedRecord, ImageStore};
use serde::{Deserialize, Serialize};

/// `(image_path, caption)`, serialized as a two-element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem(pub String, pub String);

impl FeedItem {
    pub fn image_path(&self) -> &str {
        &self.0
    }

    pub fn caption(&self) -> &str {
        &self.1
    }

    /// Where the server exposes the image.
    pub fn url(&self) -> String {
        format!("/{}", self.0)
    }
}

/// One item per record, in ledger order.
pub fn project(records: &[FeedRecord], image_store: &ImageStore) -> Vec<FeedItem> {
    records
        .iter()
        .map(|record| {
            FeedItem(
                image_store.image_path(&record.image_filename),
                record.caption.clone(),
            )
        })
        .collect()
}
