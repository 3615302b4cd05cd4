use std::collections::HashSet;
use std::sync::Arc;

use plugdesk_project::{
    archive, tree, CreateOptions, JavaVersion, PersistenceGateway, ProjectId, ProjectKind,
    RegistryError, Workbench, WorkbenchError,
};
use plugdesk_storage::FileStore;
use tempfile::tempdir;

async fn open_bench(root: &std::path::Path) -> Workbench {
    let store = Arc::new(FileStore::new(root));
    Workbench::open(PersistenceGateway::new(store))
        .await
        .expect("open workbench")
}

#[tokio::test]
async fn projects_survive_restart() {
    let dir = tempdir().unwrap();

    let id = {
        let mut bench = open_bench(dir.path()).await;
        let id = bench
            .create_project(
                "Sky",
                ProjectKind::Plugin,
                CreateOptions {
                    java_version: JavaVersion::Java21,
                },
            )
            .await
            .unwrap();
        bench.open_project(&id).unwrap();
        bench
            .update_file("src/main/resources/config.yml", "debug: true")
            .await
            .unwrap();
        bench.delete_file("build.gradle").await.unwrap();
        id
    };

    let bench = open_bench(dir.path()).await;
    let project = bench.registry().get(&id).expect("project persisted");
    assert_eq!(project.java_version, JavaVersion::Java21);
    assert_eq!(
        project.files.get("src/main/resources/config.yml"),
        Some("debug: true")
    );
    assert_eq!(project.files.get("build.gradle"), None);
}

#[tokio::test]
async fn ids_unique_after_mixed_create_and_import() {
    let dir = tempdir().unwrap();
    let mut bench = open_bench(dir.path()).await;

    let mut ids: Vec<ProjectId> = Vec::new();
    for name in ["A", "B", "C"] {
        ids.push(
            bench
                .create_project(name, ProjectKind::Plugin, CreateOptions::default())
                .await
                .unwrap(),
        );
    }
    let document = archive::export(bench.registry().get(&ids[0]).unwrap());
    for _ in 0..3 {
        let id = bench
            .import_project(document.clone(), "copy")
            .await
            .unwrap();
        ids.push(id);
    }

    let unique: HashSet<&ProjectId> = ids.iter().collect();
    assert_eq!(unique.len(), 6);
    assert_eq!(open_bench(dir.path()).await.registry().len(), 6);
}

#[tokio::test]
async fn import_scenarios() {
    let dir = tempdir().unwrap();
    let mut bench = open_bench(dir.path()).await;

    let empty = archive::parse(r#"{"name":"X","files":[]}"#).unwrap();
    let id = bench.import_project(empty, "X.zip").await.unwrap();
    assert!(bench.registry().get(&id).unwrap().files.is_empty());

    let missing = archive::parse(r#"{"name":"X"}"#);
    assert!(missing.is_err());

    let conflicting = archive::parse(
        r#"{"name":"Y","files":[{"path":"a","content":"1"},{"path":"a/b","content":"2"}]}"#,
    )
    .unwrap();
    let err = bench.import_project(conflicting, "Y").await.unwrap_err();
    assert!(matches!(
        err,
        WorkbenchError::Registry(RegistryError::MalformedImport(_))
    ));
    assert_eq!(bench.registry().len(), 1);
}

#[tokio::test]
async fn tree_projection_matches_positions_for_varied_paths() {
    let dir = tempdir().unwrap();
    let mut bench = open_bench(dir.path()).await;
    let id = bench
        .create_project(
            "Scratch",
            ProjectKind::from("notes"),
            CreateOptions::default(),
        )
        .await
        .unwrap();
    bench.open_project(&id).unwrap();

    let paths = [
        "a-b/x.txt",
        "a/y.txt",
        "a/b/c/d.txt",
        "z.md",
        "a/b/e.txt",
        "docs/readme",
    ];
    for path in paths {
        bench.update_file(path, path).await.unwrap();
    }

    let first = bench.tree().unwrap();
    let second = bench.tree().unwrap();
    assert_eq!(first, second);

    let mut leaves = first.file_paths();
    leaves.sort();
    let mut expected = paths.to_vec();
    expected.sort();
    assert_eq!(leaves, expected);

    for path in paths {
        match first.find(path) {
            Some(tree::TreeNode::File { path: stored }) => assert_eq!(stored, path),
            other => panic!("{path}: {other:?}"),
        }
    }
}
