use storage::StorageError;
use thiserror::Error;

pub type FeedResult<T> = std::result::Result<T, FeedError>;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Only surfaced by `FeedLedger::try_load`, `load` recovers to an empty feed.
    #[error("failed to parse feed ledger: {0}")]
    LedgerParse(#[source] serde_json::Error),

    #[error("failed to serialize feed ledger: {0}")]
    LedgerSerialize(#[source] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("caption provider error: {0}")]
    Provider(String),
}
