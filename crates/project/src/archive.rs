use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::path_store::{PathError, PathFileStore};
use crate::project::{JavaVersion, Project, ProjectKind};

/// Name given to imports that carry no usable name of their own.
pub const DEFAULT_IMPORT_NAME: &str = "Imported Project";

/// Archive-document errors. Every variant means nothing was imported.
/// 封存文件錯誤；任何錯誤都代表沒有匯入任何內容。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("document is not valid JSON: {0}")]
    Json(String),
    #[error("document must be a JSON object")]
    NotAnObject,
    #[error("document has no `files` field")]
    MissingFiles,
    #[error("`files` must be a list")]
    FilesNotList,
    #[error("files[{index}] has no string `path`")]
    MissingPath { index: usize },
    #[error("files[{index}] has no string `content`")]
    MissingContent { index: usize },
    #[error("field `{field}` has an invalid value")]
    InvalidField { field: &'static str },
    #[error("invalid file path: {0}")]
    Path(#[from] PathError),
}

/// One `{path, content}` pair of an archive document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub path: String,
    pub content: String,
}

/// Portable project document used for import and export.
/// 匯入與匯出時使用的可攜式專案文件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProjectKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_version: Option<JavaVersion>,
    pub files: Vec<ArchiveEntry>,
}

/// Produces the document for `project`, files sorted by path.
/// 產生專案的封存文件，檔案依路徑排序。
pub fn export(project: &Project) -> ArchiveDocument {
    let mut files: Vec<ArchiveEntry> = project
        .files
        .iter()
        .map(|(path, content)| ArchiveEntry {
            path: path.to_string(),
            content: content.to_string(),
        })
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    ArchiveDocument {
        name: Some(project.name.clone()),
        kind: Some(project.kind.clone()),
        java_version: Some(project.java_version),
        files,
    }
}

pub fn to_json(document: &ArchiveDocument) -> Result<String, ArchiveError> {
    serde_json::to_string_pretty(document).map_err(|err| ArchiveError::Json(err.to_string()))
}

/// Download name used for an exported project.
pub fn export_file_name(project: &Project) -> String {
    format!("{}-export.zip", file_stem(&project.name))
}

/// Project name reduced to a single path component for download names.
/// 將專案名稱轉為可作為單一路徑元件的檔名。
///
/// Separators become `_` and `..` runs collapse to `_`, so the result never
/// leaves the directory it is joined to.
pub fn file_stem(name: &str) -> String {
    let flat: String = name
        .trim()
        .chars()
        .map(|ch| if matches!(ch, '/' | '\\') { '_' } else { ch })
        .collect();
    let mut stem = flat;
    while stem.contains("..") {
        stem = stem.replace("..", "_");
    }
    if stem.is_empty() || stem == "." {
        "project".to_string()
    } else {
        stem
    }
}

/// Project name suggested by an uploaded archive's file name.
pub fn name_from_file(file_name: &str) -> String {
    let stem = file_name
        .strip_suffix(".zip")
        .or_else(|| file_name.strip_suffix(".json"))
        .unwrap_or(file_name);
    stem.trim().to_string()
}

/// Parses an archive document, rejecting anything that is not a well-formed
/// list of `{path, content}` pairs.
/// 解析封存文件；`files` 不是合法的 `{path, content}` 清單時一律拒絕。
pub fn parse(input: &str) -> Result<ArchiveDocument, ArchiveError> {
    let value: Value =
        serde_json::from_str(input).map_err(|err| ArchiveError::Json(err.to_string()))?;
    from_value(&value)
}

pub fn from_value(value: &Value) -> Result<ArchiveDocument, ArchiveError> {
    let object = value.as_object().ok_or(ArchiveError::NotAnObject)?;

    let files = match object.get("files") {
        None | Some(Value::Null) => return Err(ArchiveError::MissingFiles),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_entry(index, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ArchiveError::FilesNotList),
    };

    let java_version = optional_str(object, "javaVersion")?
        .map(|raw| {
            raw.parse::<JavaVersion>()
                .map_err(|_| ArchiveError::InvalidField {
                    field: "javaVersion",
                })
        })
        .transpose()?;

    Ok(ArchiveDocument {
        name: optional_str(object, "name")?.map(str::to_string),
        kind: optional_str(object, "type")?.map(ProjectKind::from),
        java_version,
        files,
    })
}

fn parse_entry(index: usize, item: &Value) -> Result<ArchiveEntry, ArchiveError> {
    let path = item
        .get("path")
        .and_then(Value::as_str)
        .ok_or(ArchiveError::MissingPath { index })?;
    let content = item
        .get("content")
        .and_then(Value::as_str)
        .ok_or(ArchiveError::MissingContent { index })?;
    Ok(ArchiveEntry {
        path: path.to_string(),
        content: content.to_string(),
    })
}

fn optional_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a str>, ArchiveError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if value.trim().is_empty() => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(ArchiveError::InvalidField { field }),
    }
}

impl ArchiveDocument {
    /// Builds a project with a fresh id and creation time.
    ///
    /// Later entries for a repeated path overwrite earlier ones.
    pub fn into_project(self, fallback_name: &str) -> Result<Project, ArchiveError> {
        let files = PathFileStore::from_entries(
            self.files
                .into_iter()
                .map(|entry| (entry.path, entry.content)),
        )?;
        let name = self
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .or_else(|| {
                let fallback = fallback_name.trim();
                (!fallback.is_empty()).then(|| fallback.to_string())
            })
            .unwrap_or_else(|| DEFAULT_IMPORT_NAME.to_string());

        Ok(Project::new(
            name,
            self.kind.unwrap_or_default(),
            self.java_version.unwrap_or_default(),
            files,
        ))
    }
}
