//! Starter file sets for new projects.
//! 新專案的起始檔案範本。

use crate::path_store::{PathError, PathFileStore};
use crate::project::{JavaVersion, ProjectKind};

pub const PLUGIN_VERSION: &str = "1.0.0";
pub const PLUGIN_API_VERSION: &str = "1.20";
pub const PLUGIN_DESCRIPTOR_PATH: &str = "src/main/resources/plugin.yml";
pub const BUILD_SCRIPT_PATH: &str = "build.gradle";

/// Identifiers derived from a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginNames {
    /// Dotted Java package, e.g. `com.sky.plugin`.
    pub package: String,
    /// Main class name, e.g. `Sky`.
    pub class: String,
}

impl PluginNames {
    pub fn derive(name: &str) -> Self {
        let mut segment: String = name
            .chars()
            .flat_map(char::to_lowercase)
            .filter(char::is_ascii_alphanumeric)
            .collect();
        if !segment.starts_with(|ch: char| ch.is_ascii_lowercase()) {
            segment.insert(0, 'p');
        }

        let mut class: String = name.chars().filter(char::is_ascii_alphanumeric).collect();
        if !class.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            class.insert_str(0, "Plugin");
        }

        Self {
            package: format!("com.{segment}.plugin"),
            class,
        }
    }

    pub fn source_path(&self) -> String {
        format!(
            "src/main/java/{}/{}.java",
            self.package.replace('.', "/"),
            self.class
        )
    }
}

/// Returns the starter files for `kind`; kinds without a generator start empty.
/// 依專案類型回傳起始檔案；沒有產生器的類型回傳空集合。
pub fn files_for(
    kind: &ProjectKind,
    name: &str,
    java_version: JavaVersion,
) -> Result<PathFileStore, PathError> {
    match kind {
        ProjectKind::Plugin => plugin_template(name, java_version),
        ProjectKind::Other(_) => Ok(PathFileStore::new()),
    }
}

/// Main class, `plugin.yml` and Gradle build for a server plugin.
///
/// Pure: the same `name` and `java_version` always yield the same files.
pub fn plugin_template(name: &str, java_version: JavaVersion) -> Result<PathFileStore, PathError> {
    let names = PluginNames::derive(name);
    let PluginNames { package, class } = &names;

    let main_class = format!(
        r#"package {package};
import lombok.Getter;
import org.bukkit.plugin.java.JavaPlugin;

@Getter
public class {class} extends JavaPlugin {{
    private static {class} instance;

    @Override
    public void onEnable() {{
        instance = this;
        getLogger().info("{name} enabled!");
    }}

    public static {class} getInstance() {{
        return instance;
    }}
}}"#
    );

    let descriptor = format!(
        "name: {name}\nversion: {PLUGIN_VERSION}\nmain: {package}.{class}\napi-version: {PLUGIN_API_VERSION}"
    );

    let build_script = format!(
        r#"plugins {{
    id 'java'
    id 'com.github.johnrengelman.shadow' version '7.1.2'
}}

java {{
    toolchain.languageVersion = JavaLanguageVersion.of({java_version})
}}

dependencies {{
    compileOnly 'org.spigotmc:spigot-api:1.20.1-R0.1-SNAPSHOT'
    compileOnly 'org.projectlombok:lombok:1.18.30'
    implementation 'com.zaxxer:HikariCP:5.0.1'
}}

shadowJar {{
    archiveFileName = "{name}-{PLUGIN_VERSION}.jar"
}}"#
    );

    PathFileStore::from_entries([
        (names.source_path(), main_class),
        (PLUGIN_DESCRIPTOR_PATH.to_string(), descriptor),
        (BUILD_SCRIPT_PATH.to_string(), build_script),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_package_and_class() {
        let names = PluginNames::derive("Sky");
        assert_eq!(names.package, "com.sky.plugin");
        assert_eq!(names.class, "Sky");
        assert_eq!(
            names.source_path(),
            "src/main/java/com/sky/plugin/Sky.java"
        );
    }

    #[test]
    fn strips_identifier_unsafe_characters() {
        let names = PluginNames::derive("My Cool-Plugin!");
        assert_eq!(names.package, "com.mycoolplugin.plugin");
        assert_eq!(names.class, "MyCoolPlugin");
    }

    #[test]
    fn leading_digits_and_symbols_are_prefixed() {
        let names = PluginNames::derive("2fast");
        assert_eq!(names.package, "com.p2fast.plugin");
        assert_eq!(names.class, "Plugin2fast");

        let names = PluginNames::derive("***");
        assert_eq!(names.package, "com.p.plugin");
        assert_eq!(names.class, "Plugin");
    }

    #[test]
    fn template_is_deterministic() {
        let a = plugin_template("Sky", JavaVersion::Java17).unwrap();
        let b = plugin_template("Sky", JavaVersion::Java17).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn template_contents_reference_derived_names() {
        let files = plugin_template("Sky", JavaVersion::Java21).unwrap();
        let descriptor = files.get(PLUGIN_DESCRIPTOR_PATH).unwrap();
        assert!(descriptor.contains("main: com.sky.plugin.Sky"));
        assert!(descriptor.contains("api-version: 1.20"));

        let source = files.get("src/main/java/com/sky/plugin/Sky.java").unwrap();
        assert!(source.starts_with("package com.sky.plugin;"));
        assert!(source.contains("public class Sky extends JavaPlugin {"));

        let build = files.get(BUILD_SCRIPT_PATH).unwrap();
        assert!(build.contains("JavaLanguageVersion.of(21)"));
        assert!(build.contains("archiveFileName = \"Sky-1.0.0.jar\""));
    }

    #[test]
    fn other_kinds_start_empty() {
        let files =
            files_for(&ProjectKind::Other("notes".into()), "N", JavaVersion::Java8).unwrap();
        assert!(files.is_empty());
    }
}
