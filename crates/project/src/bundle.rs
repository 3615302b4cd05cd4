use serde::Serialize;

use crate::archive::file_stem;
use crate::project::Project;
use crate::template::PLUGIN_VERSION;

/// Downloadable output of the stub build step.
/// 模擬建置步驟產生的下載檔案。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildArtifact {
    pub file_name: String,
    pub contents: String,
}

/// Serializes the project's files into the artifact; no compilation happens.
pub fn build_artifact(project: &Project) -> Result<BuildArtifact, serde_json::Error> {
    Ok(BuildArtifact {
        file_name: format!("{}-{PLUGIN_VERSION}.jar", file_stem(&project.name)),
        contents: serde_json::to_string_pretty(&project.files)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_store::PathFileStore;
    use crate::project::{JavaVersion, ProjectKind};

    #[test]
    fn artifact_holds_file_map() {
        let files = PathFileStore::from_entries([("b.txt", "2"), ("a/x.txt", "1")]).unwrap();
        let project = Project::new("Sky", ProjectKind::Plugin, JavaVersion::Java17, files);

        let artifact = build_artifact(&project).unwrap();
        assert_eq!(artifact.file_name, "Sky-1.0.0.jar");
        let parsed: PathFileStore = serde_json::from_str(&artifact.contents).unwrap();
        assert_eq!(parsed, project.files);
    }

    #[test]
    fn artifact_name_is_a_single_component() {
        let project = Project::new(
            "../evil/name",
            ProjectKind::Plugin,
            JavaVersion::Java17,
            PathFileStore::new(),
        );
        let artifact = build_artifact(&project).unwrap();
        assert_eq!(artifact.file_name, "__evil_name-1.0.0.jar");
    }
}
