use crate::{FeedError, FeedRecord, FeedResult};
use std::{path::PathBuf, sync::Arc};
use storage::Storage;
use tokio::sync::Mutex;

pub const DEFAULT_LEDGER_FILE: &str = "feed.json";

/// Newest-first list of [`FeedRecord`] persisted as a single JSON array.
///
/// The document is the only source of truth: every mutation reloads it,
/// prepends, and rewrites it in full. Clones share one lock, so concurrent
/// `record` calls in this process are serialized.
#[derive(Clone, Debug)]
pub struct FeedLedger {
    storage: Storage,
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FeedLedger {
    /// `path` is relative to the storage root.
    pub fn new(storage: Storage, path: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.storage.get_actual_path(&self.path)
    }

    /// Missing or malformed documents load as an empty feed. Failing to read
    /// the document is still an error, so a later `record` cannot overwrite it.
    pub async fn load(&self) -> FeedResult<Vec<FeedRecord>> {
        match self.try_load().await {
            Err(FeedError::LedgerParse(e)) => {
                tracing::warn!("starting from an empty feed, {:?} is malformed: {}", self.path, e);
                Ok(vec![])
            }
            other => other,
        }
    }

    /// Like [`FeedLedger::load`] but a malformed document is an error too.
    /// A missing document is not.
    pub async fn try_load(&self) -> FeedResult<Vec<FeedRecord>> {
        let data = match self.storage.read_optional(&self.path).await? {
            Some(data) => data,
            None => return Ok(vec![]),
        };
        serde_json::from_slice::<Vec<FeedRecord>>(&data.to_vec()).map_err(FeedError::LedgerParse)
    }

    pub async fn save(&self, records: &[FeedRecord]) -> FeedResult<()> {
        let data = serde_json::to_vec_pretty(records).map_err(FeedError::LedgerSerialize)?;
        self.storage.write_atomic(&self.path, data).await?;
        Ok(())
    }

    /// Prepends a record and returns the full feed after the write.
    pub async fn record(
        &self,
        image_filename: impl Into<String>,
        caption: impl Into<String>,
    ) -> FeedResult<Vec<FeedRecord>> {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        records.insert(0, FeedRecord::new(image_filename, caption));
        self.save(&records).await?;

        tracing::debug!("feed now has {} records", records.len());
        Ok(records)
    }
}
