//! dircache - Directory list cache for eventually-consistent object stores
//!
//! Remembers buckets and objects created through this process so that
//! listings include them before the remote store's own listings catch up.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::DirectoryListCache;
pub use config::Config;
pub use error::{Result, StorageError};
pub use storage::{CacheSupplementedStorage, Storage};
pub use tasks::spawn_cleanup_task;
