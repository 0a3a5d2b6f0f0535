//! Archive backed by a local directory tree: `{root}/{bucket}/{key}`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::Archive;
use crate::error::StorageError;

// ---

#[derive(Debug, Clone)]
pub struct FsArchive {
    bucket_dir: PathBuf,
}

impl FsArchive {
    pub fn new(root: impl AsRef<Path>, bucket: &str) -> Self {
        FsArchive {
            bucket_dir: root.as_ref().join(bucket),
        }
    }

    /// Resolve `key` inside the bucket directory, refusing anything that
    /// would escape it.
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        // ---
        let relative = Path::new(key);
        let escapes = relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(StorageError::Archive {
                key: key.to_string(),
                reason: "key is not a relative object path".into(),
            });
        }
        Ok(self.bucket_dir.join(relative))
    }
}

#[async_trait]
impl Archive for FsArchive {
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        // ---
        let path = self.object_path(key)?;
        let archive_err = |e: std::io::Error| StorageError::Archive {
            key: key.to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(archive_err)?;
        }
        tokio::fs::write(&path, body).await.map_err(archive_err)?;

        tracing::debug!("Archived {} to {}", key, path.display());
        Ok(())
    }
}
