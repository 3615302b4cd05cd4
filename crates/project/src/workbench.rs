use thiserror::Error;
use tracing::warn;

use crate::archive::ArchiveDocument;
use crate::persistence::{LinkedAccount, PersistenceError, PersistenceGateway};
use crate::project::{Project, ProjectId, ProjectKind};
use crate::registry::{CreateOptions, ProjectRegistry, RegistryError};
use crate::tree::{self, FolderExpansion, TreeNode};

/// Errors surfaced by [`Workbench`] operations.
/// [`Workbench`] 操作可能拋出的錯誤。
///
/// A `Persistence` error means the in-memory change was kept but could not
/// be written to the primary store.
#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("change kept in memory but not saved: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Owns the registry and writes the whole collection after every change.
/// 持有專案登錄，並在每次變更後寫出整個集合。
pub struct Workbench {
    registry: ProjectRegistry,
    gateway: PersistenceGateway,
    account: Option<LinkedAccount>,
    expansion: FolderExpansion,
}

impl Workbench {
    /// Seeds the workbench from the primary store.
    ///
    /// An unreadable account marker is treated as not linked.
    pub async fn open(gateway: PersistenceGateway) -> Result<Self, PersistenceError> {
        let projects = gateway.load_projects().await?;
        let account = match gateway.load_account().await {
            Ok(account) => account,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable linked account");
                None
            }
        };
        Ok(Self {
            registry: ProjectRegistry::from_projects(projects),
            gateway,
            account,
            expansion: FolderExpansion::default(),
        })
    }

    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.registry.active()
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.registry.selected_file()
    }

    pub fn account(&self) -> Option<&LinkedAccount> {
        self.account.as_ref()
    }

    pub fn expansion(&self) -> &FolderExpansion {
        &self.expansion
    }

    pub fn expansion_mut(&mut self) -> &mut FolderExpansion {
        &mut self.expansion
    }

    /// Tree of the open project, rebuilt on each call.
    pub fn tree(&self) -> Option<TreeNode> {
        self.registry.active().map(|project| tree::project(&project.files))
    }

    pub async fn create_project(
        &mut self,
        name: &str,
        kind: ProjectKind,
        options: CreateOptions,
    ) -> Result<ProjectId, WorkbenchError> {
        let id = self.registry.create(name, kind, options)?.id.clone();
        self.save().await?;
        Ok(id)
    }

    /// Opening does not change the collection, so nothing is written.
    pub fn open_project(&mut self, id: &ProjectId) -> Result<&Project, WorkbenchError> {
        Ok(self.registry.open(id)?)
    }

    pub fn select_file(&mut self, path: &str) -> Result<(), WorkbenchError> {
        Ok(self.registry.select_file(path)?)
    }

    pub async fn delete_project(&mut self, id: &ProjectId) -> Result<bool, WorkbenchError> {
        let removed = self.registry.delete(id);
        if removed {
            self.save().await?;
        }
        Ok(removed)
    }

    pub async fn rename_project(
        &mut self,
        id: &ProjectId,
        name: &str,
    ) -> Result<(), WorkbenchError> {
        self.registry.rename(id, name)?;
        self.save().await
    }

    pub async fn update_file(&mut self, path: &str, content: &str) -> Result<(), WorkbenchError> {
        self.registry.update_file(path, content)?;
        self.save().await
    }

    pub async fn delete_file(&mut self, path: &str) -> Result<bool, WorkbenchError> {
        let removed = self.registry.delete_file(path)?;
        if removed {
            self.save().await?;
        }
        Ok(removed)
    }

    pub async fn import_project(
        &mut self,
        document: ArchiveDocument,
        fallback_name: &str,
    ) -> Result<ProjectId, WorkbenchError> {
        let id = self
            .registry
            .import_project(document, fallback_name)?
            .id
            .clone();
        self.save().await?;
        Ok(id)
    }

    /// Records a placeholder account and turns on the shared mirror.
    pub async fn link_account(&mut self) -> Result<&LinkedAccount, WorkbenchError> {
        let account = LinkedAccount::placeholder();
        self.gateway
            .link_account(&account, self.registry.projects())
            .await?;
        Ok(self.account.insert(account))
    }

    pub async fn unlink_account(&mut self) -> Result<(), WorkbenchError> {
        self.gateway.unlink_account().await?;
        self.account = None;
        Ok(())
    }

    async fn save(&self) -> Result<(), WorkbenchError> {
        self.gateway
            .persist(self.registry.projects(), self.account.is_some())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive;
    use crate::persistence::keys;
    use crate::project::JavaVersion;
    use plugdesk_storage::{KeyValueStore, MemoryStore, StorageScope};
    use std::sync::Arc;

    async fn workbench() -> (Arc<MemoryStore>, Workbench) {
        let store = Arc::new(MemoryStore::new());
        let bench = Workbench::open(PersistenceGateway::new(store.clone()))
            .await
            .unwrap();
        (store, bench)
    }

    async fn reload(store: &Arc<MemoryStore>) -> Workbench {
        Workbench::open(PersistenceGateway::new(store.clone()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn every_mutation_is_persisted() {
        let (store, mut bench) = workbench().await;
        let id = bench
            .create_project("Sky", ProjectKind::Plugin, CreateOptions::default())
            .await
            .unwrap();
        bench.open_project(&id).unwrap();
        bench.update_file("notes.md", "hello").await.unwrap();

        let reloaded = reload(&store).await;
        let stored = reloaded.registry().get(&id).unwrap();
        assert_eq!(stored.files.get("notes.md"), Some("hello"));
        assert!(reloaded.active_project().is_none());
    }

    #[tokio::test]
    async fn rapid_updates_keep_last_write() {
        let (store, mut bench) = workbench().await;
        let id = bench
            .create_project("A", ProjectKind::Plugin, CreateOptions::default())
            .await
            .unwrap();
        bench.open_project(&id).unwrap();
        bench.update_file("a.txt", "first").await.unwrap();
        bench.update_file("a.txt", "second").await.unwrap();

        assert_eq!(
            bench.active_project().unwrap().files.get("a.txt"),
            Some("second")
        );
        let reloaded = reload(&store).await;
        assert_eq!(
            reloaded.registry().get(&id).unwrap().files.get("a.txt"),
            Some("second")
        );
    }

    #[tokio::test]
    async fn primary_failure_keeps_in_memory_change() {
        let (store, mut bench) = workbench().await;
        let id = bench
            .create_project("A", ProjectKind::Plugin, CreateOptions::default())
            .await
            .unwrap();
        bench.open_project(&id).unwrap();

        store.fail_scope(StorageScope::Local).await;
        let err = bench.update_file("a.txt", "x").await.unwrap_err();
        assert!(matches!(err, WorkbenchError::Persistence(_)));
        let active = bench.active_project().unwrap();
        assert_eq!(active.files.get("a.txt"), Some("x"));
    }

    #[tokio::test]
    async fn linked_mirror_failure_is_silent() {
        let (store, mut bench) = workbench().await;
        bench.link_account().await.unwrap();
        store.fail_scope(StorageScope::Shared).await;

        bench
            .create_project("A", ProjectKind::Plugin, CreateOptions::default())
            .await
            .unwrap();
        assert_eq!(reload(&store).await.registry().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_account_marker_opens_unlinked() {
        let (store, mut bench) = workbench().await;
        let id = bench
            .create_project("A", ProjectKind::Plugin, CreateOptions::default())
            .await
            .unwrap();
        store
            .set(keys::LINKED_ACCOUNT, "not json", StorageScope::Local)
            .await
            .unwrap();

        let reloaded = reload(&store).await;
        assert!(reloaded.account().is_none());
        assert!(reloaded.registry().get(&id).is_some());
    }

    #[tokio::test]
    async fn linked_account_mirrors_each_save() {
        let (store, mut bench) = workbench().await;
        bench.link_account().await.unwrap();
        bench
            .create_project("A", ProjectKind::Plugin, CreateOptions::default())
            .await
            .unwrap();
        assert_eq!(
            store.shared_value(keys::PROJECTS_MIRROR).await,
            store.get(keys::PROJECTS).await.unwrap()
        );

        let reloaded = reload(&store).await;
        assert!(reloaded.account().is_some());

        bench.unlink_account().await.unwrap();
        assert!(bench.account().is_none());
        assert!(reload(&store).await.account().is_none());
    }

    #[tokio::test]
    async fn validation_errors_write_nothing() {
        let (store, mut bench) = workbench().await;
        let err = bench
            .create_project("", ProjectKind::Plugin, CreateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkbenchError::Registry(RegistryError::Validation(_))
        ));
        assert!(store.get(keys::PROJECTS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sky_scenario_export_then_import() {
        let (_, mut bench) = workbench().await;
        let id = bench
            .create_project(
                "Sky",
                ProjectKind::Plugin,
                CreateOptions {
                    java_version: JavaVersion::Java17,
                },
            )
            .await
            .unwrap();
        let original = bench.registry().get(&id).unwrap().clone();
        assert!(original
            .files
            .keys()
            .any(|path| path.starts_with("src/main/java/com/sky/plugin/")));
        assert!(original.files.contains("src/main/resources/plugin.yml"));

        let json = archive::to_json(&archive::export(&original)).unwrap();
        let imported_id = bench
            .import_project(archive::parse(&json).unwrap(), "Sky-export")
            .await
            .unwrap();
        let imported = bench.registry().get(&imported_id).unwrap();
        assert_ne!(imported_id, id);
        assert_eq!(imported.files, original.files);
    }

    #[tokio::test]
    async fn tree_follows_active_project() {
        let (_, mut bench) = workbench().await;
        assert!(bench.tree().is_none());
        let id = bench
            .create_project("Sky", ProjectKind::Plugin, CreateOptions::default())
            .await
            .unwrap();
        bench.open_project(&id).unwrap();
        let tree = bench.tree().unwrap();
        assert!(tree.find("src/main/resources/plugin.yml").is_some());

        bench.delete_file("build.gradle").await.unwrap();
        assert!(bench.tree().unwrap().find("build.gradle").is_none());
    }

    #[tokio::test]
    async fn deleting_open_project_clears_it() {
        let (store, mut bench) = workbench().await;
        let id = bench
            .create_project("A", ProjectKind::Plugin, CreateOptions::default())
            .await
            .unwrap();
        bench.open_project(&id).unwrap();
        bench.select_file("build.gradle").unwrap();

        assert!(bench.delete_project(&id).await.unwrap());
        assert!(!bench.delete_project(&id).await.unwrap());
        assert!(bench.active_project().is_none());
        assert!(bench.selected_file().is_none());
        assert!(reload(&store).await.registry().is_empty());
    }
}
