use std::collections::BTreeMap;
use std::convert::TryFrom;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hierarchy separator used by every stored path.
pub const SEPARATOR: char = '/';

/// Path-related errors raised when a write would break the store invariants.
/// 寫入會破壞路徑不變條件時拋出的錯誤。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path must not be empty")]
    Empty,
    #[error("path '{0}' has an empty segment")]
    Malformed(String),
    #[error("path '{path}' conflicts with existing entry '{existing}'")]
    FileFolderConflict { path: String, existing: String },
}

/// Flat mapping from slash-separated path to text content.
/// 以斜線分隔路徑對應文字內容的扁平檔案表。
///
/// No key is ever both a file and the folder of another key: writing
/// `a/b` while `a` exists (or the reverse) is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct PathFileStore {
    entries: BTreeMap<String, String>,
}

impl PathFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the entry at `path`, returning the previous content.
    /// 新增或覆寫指定路徑的內容，並回傳先前的內容。
    pub fn set(
        &mut self,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Option<String>, PathError> {
        let path = path.into();
        self.check_insertable(&path)?;
        Ok(self.entries.insert(path, content.into()))
    }

    /// Removes the entry if present; absent paths are ignored.
    /// 移除指定路徑；若不存在則忽略。
    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.entries.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// All stored paths. Callers must not rely on the iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Paths sorted lexicographically.
    /// 依字典順序排序的路徑清單。
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_insertable(&self, path: &str) -> Result<(), PathError> {
        validate_path(path)?;

        for (idx, _) in path.match_indices(SEPARATOR) {
            let ancestor = &path[..idx];
            if self.entries.contains_key(ancestor) {
                return Err(PathError::FileFolderConflict {
                    path: path.to_string(),
                    existing: ancestor.to_string(),
                });
            }
        }

        let folder_prefix = format!("{path}{SEPARATOR}");
        if let Some((descendant, _)) = self
            .entries
            .range(folder_prefix.clone()..)
            .next()
            .filter(|(key, _)| key.starts_with(&folder_prefix))
        {
            return Err(PathError::FileFolderConflict {
                path: path.to_string(),
                existing: descendant.clone(),
            });
        }
        Ok(())
    }
}

/// Checks the shape of a single path without looking at any store.
pub fn validate_path(path: &str) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    if path.split(SEPARATOR).any(str::is_empty) {
        return Err(PathError::Malformed(path.to_string()));
    }
    Ok(())
}

impl TryFrom<BTreeMap<String, String>> for PathFileStore {
    type Error = PathError;

    fn try_from(entries: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        PathFileStore::from_entries(entries)
    }
}

impl From<PathFileStore> for BTreeMap<String, String> {
    fn from(store: PathFileStore) -> Self {
        store.entries
    }
}

impl PathFileStore {
    /// Builds a store from `(path, content)` pairs, later duplicates winning.
    /// Fails on the first pair that would break an invariant.
    pub fn from_entries<I, P, C>(entries: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let mut store = PathFileStore::new();
        for (path, content) in entries {
            store.set(path, content)?;
        }
        Ok(store)
    }
}
