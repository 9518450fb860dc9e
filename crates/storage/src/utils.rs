use crate::{StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// `feed.json` -> `feed-tmp.json`, `dir/ledger` -> `dir/ledger-tmp`
pub fn tmp_sibling(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let mut new_path = path.to_path_buf();
    if let Some(file_stem) = path.file_stem() {
        let file_name = match path.extension() {
            Some(ext) => format!("{}-tmp.{}", file_stem.to_string_lossy(), ext.to_string_lossy()),
            None => format!("{}-tmp", file_stem.to_string_lossy()),
        };
        new_path.set_file_name(file_name);
    }
    new_path
}

/// opendal only accepts `/`-separated utf-8 paths relative to the operator root
pub fn path_to_string(path: impl AsRef<Path>) -> StorageResult<String> {
    let path = path.as_ref();
    if path.is_absolute() {
        return Err(StorageError::PathError(format!(
            "expected a path relative to storage root, got {}",
            path.display()
        )));
    }
    match path.to_str() {
        Some(path) => Ok(path.replace('\\', "/")),
        None => Err(StorageError::PathError(path.to_string_lossy().to_string())),
    }
}
