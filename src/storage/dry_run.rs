use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::info;

use super::{ObjectStore, StoreError};

/// Reads from `inner`, writes into a local scratch directory.
///
/// The object key is flattened into a single file name (`/` becomes `_`) so
/// every would-be upload lands side by side for inspection.
#[derive(Debug)]
pub struct DryRunStore<S> {
    inner: S,
    out_dir: PathBuf,
    written: Mutex<Vec<String>>,
}

impl<S> DryRunStore<S> {
    pub fn new(inner: S, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            out_dir: out_dir.into(),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Keys diverted so far, in write order.
    pub fn written_keys(&self) -> Vec<String> {
        self.written
            .lock()
            .map(|keys| keys.clone())
            .unwrap_or_default()
    }

    pub fn file_name_for(key: &str) -> String {
        key.trim_matches('/').replace(['/', '\\'], "_")
    }
}

impl<S: ObjectStore + Sync> ObjectStore for DryRunStore<S> {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), StoreError> {
        let file_name = Self::file_name_for(key);
        if file_name.is_empty() || file_name == "." || file_name == ".." {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let path = self.out_dir.join(file_name);
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        async_fs::create_dir_all(&self.out_dir)
            .await
            .map_err(io_err)?;
        async_fs::write(&path, &bytes).await.map_err(io_err)?;

        info!(
            path = %path.display(),
            "Dry run: would write {} bytes to {}",
            bytes.len(),
            key
        );
        if let Ok(mut keys) = self.written.lock() {
            keys.push(key.to_string());
        }
        Ok(())
    }
}
