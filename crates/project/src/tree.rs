use std::collections::{BTreeMap, BTreeSet};

use crate::path_store::{PathFileStore, SEPARATOR};

/// Hierarchical view derived from a [`PathFileStore`].
/// 由 [`PathFileStore`] 推導出的階層式檢視。
///
/// Children are keyed by their display name, so two projections of equal
/// stores are structurally equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File {
        path: String,
    },
    Folder {
        name: String,
        children: BTreeMap<String, TreeNode>,
    },
}

impl TreeNode {
    fn folder(name: impl Into<String>) -> Self {
        TreeNode::Folder {
            name: name.into(),
            children: BTreeMap::new(),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder { .. })
    }

    pub fn children(&self) -> Option<&BTreeMap<String, TreeNode>> {
        match self {
            TreeNode::Folder { children, .. } => Some(children),
            TreeNode::File { .. } => None,
        }
    }

    /// Looks up a node by its `/`-joined position below this node.
    /// 依相對於此節點的 `/` 路徑尋找節點。
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        if path.is_empty() {
            return Some(self);
        }
        path.split(SEPARATOR)
            .try_fold(self, |node, segment| node.children()?.get(segment))
    }

    /// Full paths of every file leaf, in tree order.
    pub fn file_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        collect_files(self, &mut paths);
        paths
    }

    /// Fully-qualified paths of every folder below this node, root excluded.
    pub fn folder_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        if let Some(children) = self.children() {
            collect_folders(children, "", &mut paths);
        }
        paths
    }
}

fn collect_files<'a>(node: &'a TreeNode, out: &mut Vec<&'a str>) {
    match node {
        TreeNode::File { path } => out.push(path),
        TreeNode::Folder { children, .. } => {
            for child in children.values() {
                collect_files(child, out);
            }
        }
    }
}

fn collect_folders(children: &BTreeMap<String, TreeNode>, parent: &str, out: &mut Vec<String>) {
    for (name, child) in children {
        if let TreeNode::Folder { children, .. } = child {
            let full = join(parent, name);
            collect_folders(children, &full, out);
            out.push(full);
        }
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Builds the tree for `store` under an unnamed root folder.
/// 以未命名的根資料夾建立 `store` 的樹狀結構。
pub fn project(store: &PathFileStore) -> TreeNode {
    let mut root = TreeNode::folder("");
    for path in store.sorted_keys() {
        insert_path(&mut root, path);
    }
    root
}

fn insert_path(root: &mut TreeNode, path: &str) {
    let segments: Vec<&str> = path.split(SEPARATOR).collect();
    let Some((leaf, folders)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in folders {
        current = match current {
            TreeNode::Folder { children, .. } => children
                .entry((*segment).to_string())
                .or_insert_with(|| TreeNode::folder(*segment)),
            // The store never holds a file that is also a folder.
            TreeNode::File { .. } => return,
        };
    }
    if let TreeNode::Folder { children, .. } = current {
        children.insert(
            (*leaf).to_string(),
            TreeNode::File {
                path: path.to_string(),
            },
        );
    }
}

/// Set of expanded folder paths, kept outside the tree.
/// 樹狀結構外部維護的展開資料夾路徑集合。
///
/// The tree is rebuilt after every change, so folders are identified by their
/// root-to-node path rather than by node identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderExpansion {
    open: BTreeSet<String>,
}

/// Folders expanded when a project is first shown.
pub const DEFAULT_EXPANDED: [&str; 4] = [
    "src",
    "src/main",
    "src/main/java",
    "src/main/resources",
];

impl Default for FolderExpansion {
    fn default() -> Self {
        Self {
            open: DEFAULT_EXPANDED.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

impl FolderExpansion {
    /// Starts with every folder collapsed.
    pub fn collapsed() -> Self {
        Self {
            open: BTreeSet::new(),
        }
    }

    pub fn is_expanded(&self, folder: &str) -> bool {
        self.open.contains(folder)
    }

    pub fn expand(&mut self, folder: impl Into<String>) {
        self.open.insert(folder.into());
    }

    pub fn collapse(&mut self, folder: &str) {
        self.open.remove(folder);
    }

    /// Flips the folder state and returns whether it is now expanded.
    pub fn toggle(&mut self, folder: &str) -> bool {
        if self.open.remove(folder) {
            false
        } else {
            self.open.insert(folder.to_string());
            true
        }
    }

    pub fn expand_all(&mut self, root: &TreeNode) {
        self.open.extend(root.folder_paths());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.open.iter().map(String::as_str)
    }
}

/// A line of the rendered navigation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub name: String,
    /// File path for files, folder path for folders.
    pub path: String,
    pub kind: TreeRowKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeRowKind {
    File,
    Folder { expanded: bool },
}

/// Flattens the visible part of `root`: children of collapsed folders are skipped.
/// 將 `root` 的可見部分攤平成列；收合資料夾的子節點會被略過。
pub fn visible_rows(root: &TreeNode, expansion: &FolderExpansion) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    if let Some(children) = root.children() {
        push_rows(children, "", 0, expansion, &mut rows);
    }
    rows
}

fn push_rows(
    children: &BTreeMap<String, TreeNode>,
    parent: &str,
    depth: usize,
    expansion: &FolderExpansion,
    rows: &mut Vec<TreeRow>,
) {
    for (name, child) in children {
        match child {
            TreeNode::File { path } => rows.push(TreeRow {
                depth,
                name: name.clone(),
                path: path.clone(),
                kind: TreeRowKind::File,
            }),
            TreeNode::Folder { children, .. } => {
                let full = join(parent, name);
                let expanded = expansion.is_expanded(&full);
                rows.push(TreeRow {
                    depth,
                    name: name.clone(),
                    path: full.clone(),
                    kind: TreeRowKind::Folder { expanded },
                });
                if expanded {
                    push_rows(children, &full, depth + 1, expansion, rows);
                }
            }
        }
    }
}
