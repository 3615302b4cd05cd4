use std::sync::Arc;

use chrono::{DateTime, Utc};
use plugdesk_storage::{KeyValueStore, StorageError, StorageScope};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::project::Project;

/// Storage keys used by the application.
/// 應用程式使用的儲存鍵值。
pub mod keys {
    pub const PROJECTS: &str = "plugdesk-projects";
    pub const PROJECTS_MIRROR: &str = "plugdesk-projects-cloud";
    pub const LINKED_ACCOUNT: &str = "plugdesk-linked-account";
    pub const API_KEY: &str = "plugdesk-api-key";
}

/// Errors raised while reading or writing the primary store.
/// 讀寫主要儲存區時發生的錯誤。
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored value under '{key}' is corrupt: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Placeholder identity recorded when the user links an account.
///
/// No identity verification takes place; the marker only switches on the
/// shared mirror of the project collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAccount {
    pub email: String,
    pub name: String,
    pub linked_at: DateTime<Utc>,
}

impl LinkedAccount {
    pub fn placeholder() -> Self {
        Self {
            email: "user@example.com".to_string(),
            name: "Linked User".to_string(),
            linked_at: Utc::now(),
        }
    }
}

/// Reads and writes the project collection through a key-value collaborator.
/// 透過鍵值儲存器讀寫專案集合。
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the stored collection; nothing stored yet yields an empty list.
    /// 載入已儲存的專案集合；尚未儲存時回傳空清單。
    pub async fn load_projects(&self) -> Result<Vec<Project>, PersistenceError> {
        match self.store.get(keys::PROJECTS).await? {
            Some(payload) => serde_json::from_str(&payload).map_err(|source| {
                PersistenceError::Corrupt {
                    key: keys::PROJECTS,
                    source,
                }
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Writes the whole collection to the primary key, then best-effort to the
    /// shared mirror when `mirror` is set.
    /// 將整個集合寫入主要鍵值，必要時再盡力寫入共享鏡像。
    ///
    /// A mirror failure is logged and never returned. The mirror write is
    /// attempted even when the primary write fails.
    pub async fn persist(
        &self,
        projects: &[Project],
        mirror: bool,
    ) -> Result<(), PersistenceError> {
        let payload = encode_projects(projects)?;
        let primary = self
            .store
            .set(keys::PROJECTS, &payload, StorageScope::Local)
            .await;
        match &primary {
            Ok(()) => debug!(
                projects = projects.len(),
                bytes = payload.len(),
                "collection saved"
            ),
            Err(err) => warn!(error = %err, "failed to save project collection"),
        }
        if mirror {
            self.mirror_payload(&payload).await;
        }
        primary.map_err(PersistenceError::from)
    }

    pub async fn load_account(&self) -> Result<Option<LinkedAccount>, PersistenceError> {
        match self.store.get(keys::LINKED_ACCOUNT).await? {
            Some(payload) => serde_json::from_str(&payload)
                .map(Some)
                .map_err(|source| PersistenceError::Corrupt {
                    key: keys::LINKED_ACCOUNT,
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Records `account` and immediately mirrors `projects` to the shared area.
    pub async fn link_account(
        &self,
        account: &LinkedAccount,
        projects: &[Project],
    ) -> Result<(), PersistenceError> {
        let payload = serde_json::to_string(account).map_err(|source| PersistenceError::Encode {
            key: keys::LINKED_ACCOUNT,
            source,
        })?;
        self.store
            .set(keys::LINKED_ACCOUNT, &payload, StorageScope::Local)
            .await?;
        let projects = encode_projects(projects)?;
        self.mirror_payload(&projects).await;
        Ok(())
    }

    pub async fn unlink_account(&self) -> Result<(), PersistenceError> {
        self.store.delete(keys::LINKED_ACCOUNT).await?;
        Ok(())
    }

    pub async fn load_api_key(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.store.get(keys::API_KEY).await?)
    }

    pub async fn save_api_key(&self, key: &str) -> Result<(), PersistenceError> {
        self.store
            .set(keys::API_KEY, key, StorageScope::Local)
            .await?;
        Ok(())
    }

    async fn mirror_payload(&self, payload: &str) {
        match self
            .store
            .set(keys::PROJECTS_MIRROR, payload, StorageScope::Shared)
            .await
        {
            Ok(()) => debug!(bytes = payload.len(), "collection mirrored"),
            Err(err) => warn!(error = %err, "failed to mirror project collection"),
        }
    }
}

fn encode_projects(projects: &[Project]) -> Result<String, PersistenceError> {
    serde_json::to_string(projects).map_err(|source| PersistenceError::Encode {
        key: keys::PROJECTS,
        source,
    })
}
