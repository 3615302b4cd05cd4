//! Key-value storage backends used to persist PlugDesk state.
//! PlugDesk 狀態持久化所使用的鍵值儲存後端。

mod util;

pub mod file;
pub mod kv;
pub mod memory;

pub use file::FileStore;
pub use kv::{KeyValueStore, StorageError, StorageScope};
pub use memory::MemoryStore;
