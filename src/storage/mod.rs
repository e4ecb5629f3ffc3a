//! Object storage for pipeline documents.
//!
//! Stages only need "read the object at this key" and "write these bytes to
//! this key", so that is all [`ObjectStore`] offers. [`LocalStore`] keeps a
//! bucket as a directory tree; [`DryRunStore`] reads through to another store
//! but diverts every write into a scratch directory.

mod dry_run;
mod local;

use std::future::Future;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub use dry_run::DryRunStore;
pub use local::LocalStore;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid object key {0:?}")]
    InvalidKey(String),
    #[error("object {0} not found")]
    NotFound(String),
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait ObjectStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Vec<u8>, StoreError>> + Send;

    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Reads the object at `key` and decodes it as JSON.
///
/// # Arguments
///
/// * `store` - Store to read from
/// * `key` - Object key, e.g. `raw-json-data/artists_page1_kworb/artists.json`
///
/// # Returns
///
/// The decoded value.
///
/// # Errors
///
/// This function will return an error if:
/// - The object does not exist ([`StoreError::NotFound`])
/// - The key is rejected or the read fails
/// - The bytes are not valid JSON for `T` ([`StoreError::Json`])
pub async fn read_json<T, S>(store: &S, key: &str) -> Result<T, StoreError>
where
    T: DeserializeOwned,
    S: ObjectStore,
{
    let bytes = store.get(key).await?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
        key: key.to_string(),
        source,
    })
}

/// Writes `value` pretty-printed with a three-space indent, non-ASCII kept as-is.
///
/// # Arguments
///
/// * `store` - Store to write to
/// * `key` - Object key, overwritten when it already exists
/// * `value` - Anything serializable, usually a list of records
///
/// # Errors
///
/// This function will return an error if:
/// - `value` cannot be serialized ([`StoreError::Json`])
/// - The key is rejected or the write fails
pub async fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: ObjectStore,
{
    let bytes = to_json_bytes(value).map_err(|source| StoreError::Json {
        key: key.to_string(),
        source,
    })?;
    store.put(key, bytes, JSON_CONTENT_TYPE).await
}

fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}
