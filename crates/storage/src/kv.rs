use std::fmt;
use std::io;

use async_trait::async_trait;
use thiserror::Error;

/// Area a value is written to.
/// 值寫入的儲存區域。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Private to this machine.
    /// 僅限本機。
    Local,
    /// Mirrored to the linked (cloud-backed) area.
    /// 鏡像至已連結的雲端區域。
    Shared,
}

impl StorageScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageScope::Local => "local",
            StorageScope::Shared => "shared",
        }
    }
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by storage backends.
/// 儲存後端可能拋出的錯誤。
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
    #[error("{scope} storage unavailable: {reason}")]
    Unavailable { scope: StorageScope, reason: String },
}

/// Asynchronous get/set/delete collaborator.
///
/// `get` only ever consults the [`StorageScope::Local`] area; the shared area
/// is write-only from the application's point of view.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str, scope: StorageScope) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
