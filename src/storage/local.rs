use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use tracing::debug;

use super::{ObjectStore, StoreError};

/// A bucket kept as a plain directory tree under `<root>/<bucket>`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    base: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, bucket: &str) -> Self {
        Self {
            base: root.into().join(bucket),
        }
    }

    /// Maps an object key onto a path inside the bucket directory.
    ///
    /// Keys must be relative and may not climb out of the bucket.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base.join(relative))
    }
}

impl ObjectStore for LocalStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        async_fs::read(&path).await.map_err(|source| match source.kind() {
            ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => StoreError::Io {
                key: key.to_string(),
                source,
            },
        })
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        async_fs::write(&path, &bytes).await.map_err(io_err)?;

        debug!(key, bytes = bytes.len(), content_type, "object written");
        Ok(())
    }
}
