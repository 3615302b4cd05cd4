use std::fmt::Write;

use crate::project::Project;

/// Summary of the open project handed to the chat assistant.
/// 提供給聊天助理的專案摘要。
pub fn project_context(project: &Project, selected_file: Option<&str>) -> String {
    let mut context = format!(
        "Project: {} ({}, Java {})\nFiles: {} files\n",
        project.name,
        project.kind,
        project.java_version,
        project.files.len()
    );
    if let Some(path) = selected_file {
        let _ = write!(context, "Current file: {path}");
    }
    context
}
