//! Image captioning feed: stored images, their captions, and the
//! newest-first ledger that ties them together.

mod error;
mod image_store;
mod ledger;
mod pipeline;
mod provider;
mod record;
pub mod view;

#[cfg(test)]
mod test_utils;

pub use error::{FeedError, FeedResult};
pub use image_store::{ImageStore, DEFAULT_IMAGE_DIR, IMAGE_EXTENSION};
pub use ledger::{FeedLedger, DEFAULT_LEDGER_FILE};
pub use pipeline::{FeedPipeline, DEFAULT_CAPTION_TIMEOUT};
pub use provider::CaptionProvider;
pub use record::FeedRecord;
pub use view::FeedItem;
