mod error;
mod utils;

pub use error::{StorageError, StorageResult};
pub use opendal::Buffer;
pub use utils::{path_to_string, tmp_sibling};

use opendal::{services::Fs, ErrorKind, Operator};
use std::path::{Path, PathBuf};

/// Filesystem storage rooted at a local directory.
///
/// All paths passed in are relative to the root.
#[derive(Clone, Debug)]
pub struct Storage {
    root: PathBuf,
    op: Operator,
}

impl Storage {
    pub fn new_fs(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref();
        let root_str = root
            .to_str()
            .ok_or_else(|| StorageError::PathError(root.to_string_lossy().to_string()))?;

        let mut builder = Fs::default();
        builder.root(root_str);
        let op: Operator = Operator::new(builder)?.finish();

        Ok(Self {
            op,
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get_actual_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// To indicate that a path is a directory, it is compulsory to include a trailing / in the path.
    pub async fn create_dir(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        let path = path_to_string(path)?;
        let path = if path.ends_with('/') {
            path
        } else {
            format!("{}/", path)
        };
        self.op
            .create_dir(path.as_str())
            .await
            .map_err(StorageError::from)
    }

    pub async fn is_exist(&self, path: impl AsRef<Path>) -> StorageResult<bool> {
        let path = path_to_string(path)?;
        self.op
            .is_exist(path.as_str())
            .await
            .map_err(StorageError::from)
    }

    pub async fn read(&self, path: impl AsRef<Path>) -> StorageResult<Buffer> {
        let path = path_to_string(path)?;
        self.op
            .read(path.as_str())
            .await
            .map_err(StorageError::from)
    }

    /// Returns `None` when the file does not exist.
    pub async fn read_optional(&self, path: impl AsRef<Path>) -> StorageResult<Option<Buffer>> {
        let path = path_to_string(path)?;
        match self.op.read(path.as_str()).await {
            Ok(bs) => Ok(Some(bs)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn read_to_string(&self, path: impl AsRef<Path>) -> StorageResult<String> {
        let bs = self.read(path).await?;
        String::from_utf8(bs.to_vec()).map_err(StorageError::from)
    }

    /// if dir not exist, create it iteratively
    pub async fn write(&self, path: impl AsRef<Path>, bs: impl Into<Buffer>) -> StorageResult<()> {
        let path = path_to_string(path)?;
        self.op
            .write(path.as_str(), bs)
            .await
            .map_err(StorageError::from)
    }

    pub async fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> StorageResult<()> {
        let from = path_to_string(from)?;
        let to = path_to_string(to)?;
        self.op
            .rename(from.as_str(), to.as_str())
            .await
            .map_err(StorageError::from)
    }

    /// Writes to a `-tmp` sibling and renames it over `path`, so readers
    /// see either the old content or the new one.
    pub async fn write_atomic(
        &self,
        path: impl AsRef<Path>,
        bs: impl Into<Buffer>,
    ) -> StorageResult<()> {
        let path = path.as_ref();
        let tmp_path = tmp_sibling(path);
        self.write(&tmp_path, bs).await?;
        if let Err(e) = self.rename(&tmp_path, path).await {
            tracing::error!("failed to move {:?} into place: {}", tmp_path, e);
            let _ = self.remove_file(&tmp_path).await;
            return Err(e);
        }
        Ok(())
    }

    pub async fn remove_file(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        let path = path_to_string(path)?;
        self.op
            .delete(path.as_str())
            .await
            .map_err(StorageError::from)
    }
}
