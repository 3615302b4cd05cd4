use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::kv::{validate_key, KeyValueStore, StorageError, StorageScope};
use crate::util::write_atomic;

const VALUE_EXTENSION: &str = "dat";

/// Persists values as files below a root directory, one sub-folder per scope.
/// 以檔案方式將值保存於根目錄下，每個儲存區域各自一個子資料夾。
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Constructs a store bound to the provided directory.
    /// 建立綁定至指定目錄的儲存器。
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the backing directory.
    /// 取得此儲存器使用的目錄。
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of `key` inside `scope`; the key must already be validated.
    pub fn value_path(&self, key: &str, scope: StorageScope) -> PathBuf {
        self.root
            .join(scope.as_str())
            .join(format!("{key}.{VALUE_EXTENSION}"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        let path = self.value_path(key, StorageScope::Local);
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str, scope: StorageScope) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.value_path(key, scope);
        write_atomic(&path, value.as_bytes())
            .await
            .map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })?;
        debug!(key, %scope, bytes = value.len(), "value written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.value_path(key, StorageScope::Local);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}
