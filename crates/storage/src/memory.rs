use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::kv::{validate_key, KeyValueStore, StorageError, StorageScope};

/// In-process store keeping both scopes in memory.
/// 將兩個儲存區域都保留在記憶體中的儲存器。
///
/// Individual scopes can be switched off with [`MemoryStore::fail_scope`],
/// after which writes to that scope return [`StorageError::Unavailable`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    local: RwLock<HashMap<String, String>>,
    shared: RwLock<HashMap<String, String>>,
    failing: RwLock<HashSet<StorageScope>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_scope(&self, scope: StorageScope) {
        self.failing.write().await.insert(scope);
    }

    pub async fn restore_scope(&self, scope: StorageScope) {
        self.failing.write().await.remove(&scope);
    }

    /// Reads a value from the shared area.
    pub async fn shared_value(&self, key: &str) -> Option<String> {
        self.shared.read().await.get(key).cloned()
    }

    async fn check(&self, scope: StorageScope) -> Result<(), StorageError> {
        if self.failing.read().await.contains(&scope) {
            return Err(StorageError::Unavailable {
                scope,
                reason: "scope disabled".to_string(),
            });
        }
        Ok(())
    }

    fn area(&self, scope: StorageScope) -> &RwLock<HashMap<String, String>> {
        match scope {
            StorageScope::Local => &self.local,
            StorageScope::Shared => &self.shared,
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        self.check(StorageScope::Local).await?;
        Ok(self.local.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, scope: StorageScope) -> Result<(), StorageError> {
        validate_key(key)?;
        self.check(scope).await?;
        self.area(scope)
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.check(StorageScope::Local).await?;
        self.local.write().await.remove(key);
        Ok(())
    }
}
