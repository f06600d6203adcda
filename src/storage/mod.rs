//! Storage Module
//!
//! The storage contract shared by remote object stores and the
//! cache-supplemented decorator that wraps them, plus the value types it
//! speaks in.
//!
//! # Implementations
//! - [`InMemoryStorage`]: in-process, eventually-consistent object store
//! - [`CacheSupplementedStorage`]: wraps any `Storage` and fills listing
//!   gaps from a [`DirectoryListCache`](crate::cache::DirectoryListCache)

mod in_memory;
mod item_info;
mod resource_id;
mod supplemented;

use std::io::{Read, Seek, Write};

use crate::error::Result;

// Re-export public types
pub use in_memory::{InMemoryStorage, InMemoryStorageOptions};
pub use item_info::ItemInfo;
pub use resource_id::ResourceId;
pub use supplemented::CacheSupplementedStorage;

// == Public Constants ==
/// `max_results` value meaning "no limit".
pub const MAX_RESULTS_UNLIMITED: Option<usize> = None;

// == Create Options ==
/// Options for object creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateObjectOptions {
    /// Replace an existing object instead of failing
    pub overwrite_existing: bool,
    /// Content type recorded on the object
    pub content_type: Option<String>,
}

impl CreateObjectOptions {
    pub fn new(overwrite_existing: bool) -> Self {
        Self {
            overwrite_existing,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl Default for CreateObjectOptions {
    fn default() -> Self {
        Self::new(true)
    }
}

// == Channels ==
/// Write side of an object being created.
///
/// Bytes written are not durable until [`close`](WritableChannel::close)
/// succeeds; conflicts with concurrent writers may only surface there.
pub trait WritableChannel: Write + Send {
    /// True until the channel has been closed.
    fn is_open(&self) -> bool;

    /// Commits the object. Closing twice is an error.
    fn close(&mut self) -> Result<()>;
}

/// Read side of an existing object.
pub trait SeekableReadableChannel: Read + Seek + Send {
    /// Size of the object in bytes.
    fn size(&self) -> u64;

    /// True until the channel has been closed.
    fn is_open(&self) -> bool;

    fn close(&mut self) -> Result<()>;
}

// == Storage Trait ==
/// Bucket and object operations against an object store.
///
/// Listing methods may lag behind completed mutations on eventually
/// consistent stores; [`get_item_info`](Storage::get_item_info) reports a
/// missing resource as an `exists == false` snapshot rather than an error.
pub trait Storage: Send + Sync {
    /// Creates a bucket.
    fn create_bucket(&self, bucket_name: &str) -> Result<()>;

    /// Starts creating an object; the object exists once the returned
    /// channel closes successfully.
    fn create(
        &self,
        resource_id: &ResourceId,
        options: CreateObjectOptions,
    ) -> Result<Box<dyn WritableChannel>>;

    /// Opens an existing object for reading.
    fn open(&self, resource_id: &ResourceId) -> Result<Box<dyn SeekableReadableChannel>>;

    fn delete_buckets(&self, bucket_names: &[String]) -> Result<()>;

    fn delete_objects(&self, resource_ids: &[ResourceId]) -> Result<()>;

    /// Copies `src_object_names[i]` in `src_bucket_name` to
    /// `dst_object_names[i]` in `dst_bucket_name`. Both lists must have the
    /// same length.
    fn copy(
        &self,
        src_bucket_name: &str,
        src_object_names: &[String],
        dst_bucket_name: &str,
        dst_object_names: &[String],
    ) -> Result<()>;

    fn list_bucket_names(&self) -> Result<Vec<String>>;

    fn list_bucket_info(&self) -> Result<Vec<ItemInfo>>;

    /// Lists object names in `bucket_name` starting with `prefix`. With a
    /// delimiter, deeper names collapse into implicit directory names.
    fn list_object_names(
        &self,
        bucket_name: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<String>>;

    /// Like [`list_object_names`](Storage::list_object_names) but returns
    /// metadata.
    fn list_object_info(
        &self,
        bucket_name: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<ItemInfo>>;

    fn get_item_info(&self, resource_id: &ResourceId) -> Result<ItemInfo>;

    /// Returns one snapshot per id, in the same order.
    fn get_item_infos(&self, resource_ids: &[ResourceId]) -> Result<Vec<ItemInfo>>;

    /// Fails unless `bucket_name` holds no objects.
    fn wait_for_bucket_empty(&self, bucket_name: &str) -> Result<()>;

    /// Releases the store. Later calls may fail.
    fn close(&self) -> Result<()>;
}
