use thiserror::Error;
use tracing::info;

use crate::archive::{ArchiveDocument, ArchiveError};
use crate::path_store::PathError;
use crate::project::{JavaVersion, Project, ProjectId, ProjectKind};
use crate::template;

/// Errors raised by registry operations.
/// 專案登錄操作的錯誤類型。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("project {0} not found")]
    NotFound(ProjectId),
    #[error("no project is open")]
    NoActiveProject,
    #[error("file '{0}' not found in the open project")]
    FileNotFound(String),
    #[error("malformed import: {0}")]
    MalformedImport(#[from] ArchiveError),
}

impl From<PathError> for RegistryError {
    fn from(err: PathError) -> Self {
        RegistryError::Validation(err.to_string())
    }
}

/// Parameters for [`ProjectRegistry::create`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub java_version: JavaVersion,
}

/// Collection of projects plus the single open one.
/// 專案集合以及目前開啟的專案。
///
/// The open project is tracked by id, so edits always land in the stored
/// collection entry and there is never a detached working copy.
#[derive(Debug, Default, Clone)]
pub struct ProjectRegistry {
    projects: Vec<Project>,
    active: Option<ProjectId>,
    selected_file: Option<String>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the registry from stored projects, dropping later duplicates of an id.
    pub fn from_projects(projects: Vec<Project>) -> Self {
        let mut registry = Self::new();
        for project in projects {
            if registry.get(&project.id).is_none() {
                registry.projects.push(project);
            }
        }
        registry
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == *id)
    }

    pub fn active_id(&self) -> Option<&ProjectId> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&Project> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    /// Creates a project, seeding files from the template for its kind.
    /// 建立專案，並依類型套用範本檔案。
    pub fn create(
        &mut self,
        name: &str,
        kind: ProjectKind,
        options: CreateOptions,
    ) -> Result<&Project, RegistryError> {
        let name = validate_name(name)?;
        let files = template::files_for(&kind, &name, options.java_version)?;
        let mut project = Project::new(name, kind, options.java_version, files);
        project.id = self.fresh_id();
        info!(
            id = %project.id,
            name = %project.name,
            kind = %project.kind,
            "project created"
        );
        Ok(self.push(project))
    }

    /// Makes `id` the open project and clears the file selection.
    pub fn open(&mut self, id: &ProjectId) -> Result<&Project, RegistryError> {
        let index = self
            .index_of(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        self.active = Some(id.clone());
        self.selected_file = None;
        Ok(&self.projects[index])
    }

    /// Removes the project; unknown ids are a no-op. Returns whether anything was removed.
    /// 移除專案；未知的識別碼不視為錯誤。
    pub fn delete(&mut self, id: &ProjectId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let removed = self.projects.remove(index);
        if self.active.as_ref() == Some(id) {
            self.active = None;
            self.selected_file = None;
        }
        info!(id = %removed.id, name = %removed.name, "project deleted");
        true
    }

    /// Replaces the entry with a renamed copy; id, files and creation time are kept.
    pub fn rename(&mut self, id: &ProjectId, name: &str) -> Result<&Project, RegistryError> {
        let name = validate_name(name)?;
        let index = self
            .index_of(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        let renamed = Project {
            name,
            ..self.projects[index].clone()
        };
        self.projects[index] = renamed;
        Ok(&self.projects[index])
    }

    /// Writes `content` at `path` in the open project.
    /// 將內容寫入目前開啟專案的指定路徑。
    pub fn update_file(&mut self, path: &str, content: &str) -> Result<(), RegistryError> {
        let project = self.active_mut()?;
        project.files.set(path, content)?;
        Ok(())
    }

    /// Deletes `path` from the open project; absent paths are ignored.
    pub fn delete_file(&mut self, path: &str) -> Result<bool, RegistryError> {
        let project = self.active_mut()?;
        let removed = project.files.remove(path).is_some();
        if self.selected_file.as_deref() == Some(path) {
            self.selected_file = None;
        }
        Ok(removed)
    }

    pub fn select_file(&mut self, path: &str) -> Result<(), RegistryError> {
        let project = self.active().ok_or(RegistryError::NoActiveProject)?;
        if !project.files.contains(path) {
            return Err(RegistryError::FileNotFound(path.to_string()));
        }
        self.selected_file = Some(path.to_string());
        Ok(())
    }

    /// Adds a project built from an archive document under a fresh id.
    /// 由封存文件建立新專案並指派新的識別碼。
    ///
    /// `fallback_name` is used when the document carries no name. Nothing is
    /// added unless the whole document is valid.
    pub fn import_project(
        &mut self,
        document: ArchiveDocument,
        fallback_name: &str,
    ) -> Result<&Project, RegistryError> {
        let mut project = document.into_project(fallback_name)?;
        project.id = self.fresh_id();
        info!(
            id = %project.id,
            name = %project.name,
            files = project.files.len(),
            "project imported"
        );
        Ok(self.push(project))
    }

    fn push(&mut self, project: Project) -> &Project {
        self.projects.push(project);
        let last = self.projects.len() - 1;
        &self.projects[last]
    }

    fn fresh_id(&self) -> ProjectId {
        loop {
            let id = ProjectId::new();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn index_of(&self, id: &ProjectId) -> Option<usize> {
        self.projects.iter().position(|project| project.id == *id)
    }

    fn active_mut(&mut self) -> Result<&mut Project, RegistryError> {
        let id = self.active.as_ref().ok_or(RegistryError::NoActiveProject)?;
        let index = self
            .projects
            .iter()
            .position(|project| project.id == *id)
            .ok_or(RegistryError::NoActiveProject)?;
        Ok(&mut self.projects[index])
    }
}

fn validate_name(name: &str) -> Result<String, RegistryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::Validation(
            "project name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive;
    use std::collections::HashSet;

    fn registry_with(names: &[&str]) -> (ProjectRegistry, Vec<ProjectId>) {
        let mut registry = ProjectRegistry::new();
        let ids = names
            .iter()
            .map(|name| {
                registry
                    .create(name, ProjectKind::Plugin, CreateOptions::default())
                    .unwrap()
                    .id
                    .clone()
            })
            .collect();
        (registry, ids)
    }

    #[test]
    fn create_rejects_blank_names() {
        let mut registry = ProjectRegistry::new();
        let err = registry
            .create("   ", ProjectKind::Plugin, CreateOptions::default())
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn create_does_not_open() {
        let (registry, _) = registry_with(&["Sky"]);
        assert_eq!(registry.len(), 1);
        assert!(registry.active().is_none());
    }

    #[test]
    fn create_plugin_seeds_template() {
        let mut registry = ProjectRegistry::new();
        let project = registry
            .create(
                "Sky",
                ProjectKind::Plugin,
                CreateOptions {
                    java_version: JavaVersion::Java17,
                },
            )
            .unwrap();
        assert!(project
            .files
            .contains("src/main/java/com/sky/plugin/Sky.java"));
        assert!(project.files.contains("src/main/resources/plugin.yml"));
        assert_eq!(project.java_version, JavaVersion::Java17);
    }

    #[test]
    fn create_other_kind_starts_empty() {
        let mut registry = ProjectRegistry::new();
        let project = registry
            .create(
                "Notes",
                ProjectKind::from("notes"),
                CreateOptions::default(),
            )
            .unwrap();
        assert!(project.files.is_empty());
    }

    #[test]
    fn open_unknown_id_fails() {
        let mut registry = ProjectRegistry::new();
        let id = ProjectId::from_string("missing");
        assert_eq!(registry.open(&id).unwrap_err(), RegistryError::NotFound(id));
    }

    #[test]
    fn open_clears_selected_file() {
        let (mut registry, ids) = registry_with(&["A", "B"]);
        registry.open(&ids[0]).unwrap();
        registry.select_file("build.gradle").unwrap();
        assert_eq!(registry.selected_file(), Some("build.gradle"));

        registry.open(&ids[1]).unwrap();
        assert_eq!(registry.selected_file(), None);
        assert_eq!(registry.active_id(), Some(&ids[1]));
    }

    #[test]
    fn delete_twice_matches_delete_once() {
        let (mut once, ids) = registry_with(&["A", "B"]);
        let mut twice = once.clone();

        assert!(once.delete(&ids[0]));
        assert!(twice.delete(&ids[0]));
        assert!(!twice.delete(&ids[0]));
        assert_eq!(once.projects(), twice.projects());
    }

    #[test]
    fn deleting_active_project_clears_active_state() {
        let (mut registry, ids) = registry_with(&["A"]);
        registry.open(&ids[0]).unwrap();
        registry.select_file("build.gradle").unwrap();

        registry.delete(&ids[0]);
        assert!(registry.active().is_none());
        assert!(registry.selected_file().is_none());
        assert_eq!(
            registry.update_file("x", "y").unwrap_err(),
            RegistryError::NoActiveProject
        );
    }

    #[test]
    fn file_ops_require_open_project() {
        let (mut registry, _) = registry_with(&["A"]);
        assert_eq!(
            registry.update_file("a.txt", "x").unwrap_err(),
            RegistryError::NoActiveProject
        );
        assert_eq!(
            registry.delete_file("a.txt").unwrap_err(),
            RegistryError::NoActiveProject
        );
    }

    #[test]
    fn update_file_writes_into_collection_entry() {
        let (mut registry, ids) = registry_with(&["A", "B"]);
        registry.open(&ids[1]).unwrap();
        registry.update_file("notes/todo.md", "- ship").unwrap();
        registry.update_file("notes/todo.md", "- shipped").unwrap();

        let stored = registry.get(&ids[1]).unwrap();
        assert_eq!(stored.files.get("notes/todo.md"), Some("- shipped"));
        assert_eq!(registry.active(), Some(stored));
        let untouched = registry.get(&ids[0]).unwrap();
        assert!(!untouched.files.contains("notes/todo.md"));
    }

    #[test]
    fn delete_file_clears_matching_selection() {
        let (mut registry, ids) = registry_with(&["A"]);
        registry.open(&ids[0]).unwrap();
        registry.select_file("build.gradle").unwrap();

        assert!(registry.delete_file("build.gradle").unwrap());
        assert!(registry.selected_file().is_none());
        let active = registry.active().unwrap();
        assert!(active.files.get("build.gradle").is_none());
        assert!(!registry.delete_file("build.gradle").unwrap());
    }

    #[test]
    fn invalid_paths_surface_as_validation_errors() {
        let (mut registry, ids) = registry_with(&["A"]);
        registry.open(&ids[0]).unwrap();
        let err = registry.update_file("build.gradle/nested", "x").unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[test]
    fn select_unknown_file_fails() {
        let (mut registry, ids) = registry_with(&["A"]);
        assert_eq!(
            registry.select_file("build.gradle").unwrap_err(),
            RegistryError::NoActiveProject
        );
        registry.open(&ids[0]).unwrap();
        assert_eq!(
            registry.select_file("nope").unwrap_err(),
            RegistryError::FileNotFound("nope".into())
        );
    }

    #[test]
    fn rename_keeps_identity_and_files() {
        let (mut registry, ids) = registry_with(&["A"]);
        registry.open(&ids[0]).unwrap();
        let before = registry.get(&ids[0]).unwrap().clone();

        let renamed = registry.rename(&ids[0], "Renamed").unwrap();
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(renamed.files, before.files);
        assert_eq!(renamed.created_at, before.created_at);
        assert_eq!(registry.active().unwrap().name, "Renamed");
        assert!(matches!(
            registry.rename(&ids[0], "").unwrap_err(),
            RegistryError::Validation(_)
        ));
    }

    #[test]
    fn ids_stay_unique_across_create_and_import() {
        let (mut registry, _) = registry_with(&["A", "B", "C"]);
        let exported = archive::export(registry.projects().first().unwrap());
        for _ in 0..3 {
            registry.import_project(exported.clone(), "copy").unwrap();
        }
        let ids: HashSet<&ProjectId> = registry.projects().iter().map(|p| &p.id).collect();
        assert_eq!(ids.len(), registry.len());
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn import_without_files_adds_nothing() {
        let mut registry = ProjectRegistry::new();
        let document = archive::parse(r#"{"name":"X"}"#);
        assert!(document.is_err());

        let document: ArchiveDocument = ArchiveDocument {
            name: Some("X".into()),
            kind: None,
            java_version: None,
            files: Vec::new(),
        };
        let project = registry.import_project(document, "fallback").unwrap();
        assert_eq!(project.name, "X");
        assert!(project.files.is_empty());
    }

    #[test]
    fn import_with_conflicting_paths_is_rejected_whole() {
        let mut registry = ProjectRegistry::new();
        let document =
            archive::parse(r#"{"files":[{"path":"a","content":""},{"path":"a/b","content":""}]}"#)
                .unwrap();
        let err = registry.import_project(document, "x").unwrap_err();
        assert!(matches!(err, RegistryError::MalformedImport(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn from_projects_drops_duplicate_ids() {
        let (registry, _) = registry_with(&["A"]);
        let first = registry.projects()[0].clone();
        let mut dup = first.clone();
        dup.name = "Dup".into();

        let seeded = ProjectRegistry::from_projects(vec![first, dup]);
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded.projects()[0].name, "A");
    }
}
