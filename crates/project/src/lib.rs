//! Virtual project file model for PlugDesk.
//! PlugDesk 的虛擬專案檔案模型：路徑檔案表、樹狀檢視、專案登錄與匯入匯出。

pub mod archive;
pub mod bundle;
pub mod context;
pub mod path_store;
pub mod persistence;
pub mod project;
pub mod registry;
pub mod template;
pub mod tree;
pub mod workbench;

pub use archive::{ArchiveDocument, ArchiveEntry, ArchiveError};
pub use bundle::{build_artifact, BuildArtifact};
pub use context::project_context;
pub use path_store::{PathError, PathFileStore};
pub use persistence::{LinkedAccount, PersistenceError, PersistenceGateway};
pub use project::{JavaVersion, Project, ProjectId, ProjectKind, UnknownJavaVersion};
pub use registry::{CreateOptions, ProjectRegistry, RegistryError};
pub use tree::{FolderExpansion, TreeNode, TreeRow, TreeRowKind};
pub use workbench::{Workbench, WorkbenchError};
