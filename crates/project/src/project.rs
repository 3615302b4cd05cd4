use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::path_store::PathFileStore;

/// Unique identifier assigned to each project.
/// 每個專案的唯一識別碼。
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of project; only plugins have a file generator.
/// 專案類型；目前僅外掛專案有範本產生器。
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectKind {
    #[default]
    Plugin,
    Other(String),
}

impl ProjectKind {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectKind::Plugin => "plugin",
            ProjectKind::Other(kind) => kind,
        }
    }
}

impl From<String> for ProjectKind {
    fn from(value: String) -> Self {
        if value == "plugin" {
            ProjectKind::Plugin
        } else {
            ProjectKind::Other(value)
        }
    }
}

impl From<&str> for ProjectKind {
    fn from(value: &str) -> Self {
        ProjectKind::from(value.to_string())
    }
}

impl From<ProjectKind> for String {
    fn from(kind: ProjectKind) -> Self {
        match kind {
            ProjectKind::Plugin => "plugin".to_string(),
            ProjectKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target Java release recorded on a project.
/// 專案記錄的目標 Java 版本。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JavaVersion {
    #[serde(rename = "8")]
    Java8,
    #[serde(rename = "11")]
    Java11,
    #[default]
    #[serde(rename = "17")]
    Java17,
    #[serde(rename = "21")]
    Java21,
}

impl JavaVersion {
    pub const ALL: [JavaVersion; 4] = [
        JavaVersion::Java8,
        JavaVersion::Java11,
        JavaVersion::Java17,
        JavaVersion::Java21,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JavaVersion::Java8 => "8",
            JavaVersion::Java11 => "11",
            JavaVersion::Java17 => "17",
            JavaVersion::Java21 => "21",
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported Java version '{0}' (expected 8, 11, 17 or 21)")]
pub struct UnknownJavaVersion(pub String);

impl FromStr for JavaVersion {
    type Err = UnknownJavaVersion;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        JavaVersion::ALL
            .into_iter()
            .find(|version| version.as_str() == trimmed)
            .ok_or_else(|| UnknownJavaVersion(value.to_string()))
    }
}

/// A named bundle of text files.
/// 具名的文字檔案集合。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ProjectKind,
    #[serde(default)]
    pub java_version: JavaVersion,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub files: PathFileStore,
}

impl Project {
    /// Creates a project with a fresh id and creation time.
    /// 以新的識別碼與建立時間建立專案。
    pub fn new(
        name: impl Into<String>,
        kind: ProjectKind,
        java_version: JavaVersion,
        files: PathFileStore,
    ) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            kind,
            java_version,
            created_at: Utc::now(),
            files,
        }
    }
}
