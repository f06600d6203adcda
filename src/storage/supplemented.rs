//! Cache-Supplemented Storage Module
//!
//! Decorates a [`Storage`] so listings also include resources this process
//! created recently but the remote store does not list yet.

use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheEntry, DirectoryListCache};
use crate::error::Result;
use crate::storage::{
    CreateObjectOptions, ItemInfo, ResourceId, SeekableReadableChannel, Storage, WritableChannel,
};

// == Cache Supplemented Storage ==
/// A [`Storage`] that forwards every call to a delegate and keeps a
/// [`DirectoryListCache`] in step with successful mutations.
///
/// Listing calls return the delegate's result followed by live cache
/// entries the delegate left out. Cached data only ever adds to a successful
/// result; delegate errors are returned untouched and leave the cache alone.
pub struct CacheSupplementedStorage {
    delegate: Arc<dyn Storage>,
    cache: Arc<DirectoryListCache>,
}

impl CacheSupplementedStorage {
    // == Constructor ==
    pub fn new(delegate: Arc<dyn Storage>, cache: Arc<DirectoryListCache>) -> Self {
        Self { delegate, cache }
    }

    pub fn cache(&self) -> &Arc<DirectoryListCache> {
        &self.cache
    }

    pub fn delegate(&self) -> &Arc<dyn Storage> {
        &self.delegate
    }

    /// Returns metadata for a supplemented entry, asking the delegate only
    /// when the cached copy is missing or stale.
    ///
    /// Ok(None) means the delegate does not know the resource yet; nothing
    /// usable is cached in that case, so the next listing asks again.
    fn resolve_item_info(&self, entry: &CacheEntry) -> Result<Option<ItemInfo>> {
        if let Some(info) = self.cache.fresh_item_info(entry) {
            return Ok(Some(info.clone()));
        }

        let info = self.delegate.get_item_info(entry.resource_id())?;
        self.cache.put_item_info(info.clone());

        if info.exists {
            Ok(Some(info))
        } else {
            debug!(
                resource = %entry.resource_id(),
                "Supplemented resource not found yet, leaving it out"
            );
            Ok(None)
        }
    }
}

/// Truncates a merged listing to `max_results`.
fn cap_results<T>(items: &mut Vec<T>, max_results: Option<usize>) {
    if let Some(max_results) = max_results {
        items.truncate(max_results);
    }
}

impl Storage for CacheSupplementedStorage {
    fn create_bucket(&self, bucket_name: &str) -> Result<()> {
        self.delegate.create_bucket(bucket_name)?;
        self.cache.put_resource_id(ResourceId::bucket(bucket_name));
        Ok(())
    }

    fn create(
        &self,
        resource_id: &ResourceId,
        options: CreateObjectOptions,
    ) -> Result<Box<dyn WritableChannel>> {
        let inner = self.delegate.create(resource_id, options)?;
        Ok(Box::new(CacheUpdatingChannel {
            inner,
            cache: Arc::clone(&self.cache),
            resource_id: resource_id.clone(),
        }))
    }

    fn open(&self, resource_id: &ResourceId) -> Result<Box<dyn SeekableReadableChannel>> {
        self.delegate.open(resource_id)
    }

    fn delete_buckets(&self, bucket_names: &[String]) -> Result<()> {
        self.delegate.delete_buckets(bucket_names)?;
        for bucket_name in bucket_names {
            self.cache
                .remove_resource_id(&ResourceId::bucket(bucket_name.clone()));
        }
        Ok(())
    }

    fn delete_objects(&self, resource_ids: &[ResourceId]) -> Result<()> {
        self.delegate.delete_objects(resource_ids)?;
        for resource_id in resource_ids {
            self.cache.remove_resource_id(resource_id);
        }
        Ok(())
    }

    fn copy(
        &self,
        src_bucket_name: &str,
        src_object_names: &[String],
        dst_bucket_name: &str,
        dst_object_names: &[String],
    ) -> Result<()> {
        self.delegate.copy(
            src_bucket_name,
            src_object_names,
            dst_bucket_name,
            dst_object_names,
        )?;

        // A successful copy proves both ends exist.
        self.cache.put_resource_id(ResourceId::bucket(src_bucket_name));
        for name in src_object_names {
            self.cache
                .put_resource_id(ResourceId::object(src_bucket_name, name.clone()));
        }
        self.cache.put_resource_id(ResourceId::bucket(dst_bucket_name));
        for name in dst_object_names {
            self.cache
                .put_resource_id(ResourceId::object(dst_bucket_name, name.clone()));
        }
        Ok(())
    }

    fn list_bucket_names(&self) -> Result<Vec<String>> {
        let mut names = self.delegate.list_bucket_names()?;
        let listed: HashSet<String> = names.iter().cloned().collect();

        let supplements: Vec<String> = self
            .cache
            .get_bucket_list()
            .into_iter()
            .map(|entry| entry.resource_id().bucket_name().to_string())
            .filter(|name| !listed.contains(name))
            .collect();

        if !supplements.is_empty() {
            debug!(count = supplements.len(), "Supplemented bucket names");
            names.extend(supplements);
        }
        Ok(names)
    }

    fn list_bucket_info(&self) -> Result<Vec<ItemInfo>> {
        let mut infos = self.delegate.list_bucket_info()?;
        let listed: HashSet<String> = infos
            .iter()
            .map(|info| info.listing_name().to_string())
            .collect();

        let mut supplemented = 0;
        for entry in self.cache.get_bucket_list() {
            if listed.contains(entry.resource_id().bucket_name()) {
                continue;
            }
            if let Some(info) = self.resolve_item_info(&entry)? {
                infos.push(info);
                supplemented += 1;
            }
        }

        if supplemented > 0 {
            debug!(count = supplemented, "Supplemented bucket info");
        }
        Ok(infos)
    }

    fn list_object_names(
        &self,
        bucket_name: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut names = self
            .delegate
            .list_object_names(bucket_name, prefix, delimiter, max_results)?;
        let listed: HashSet<String> = names.iter().cloned().collect();

        let supplements: Vec<String> = self
            .cache
            .get_object_list(bucket_name, prefix, delimiter, None)
            .into_iter()
            .map(|entry| entry.resource_id().listing_name().to_string())
            .filter(|name| !listed.contains(name))
            .collect();

        if !supplements.is_empty() {
            debug!(
                bucket = bucket_name,
                prefix = prefix,
                count = supplements.len(),
                "Supplemented object names"
            );
            names.extend(supplements);
        }
        cap_results(&mut names, max_results);
        Ok(names)
    }

    fn list_object_info(
        &self,
        bucket_name: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<ItemInfo>> {
        let mut infos = self
            .delegate
            .list_object_info(bucket_name, prefix, delimiter, max_results)?;
        let listed: HashSet<String> = infos
            .iter()
            .map(|info| info.listing_name().to_string())
            .collect();

        let mut supplemented = 0;
        for entry in self
            .cache
            .get_object_list(bucket_name, prefix, delimiter, None)
        {
            // Implicit directories have no metadata of their own.
            if entry.is_implicit_directory()
                || listed.contains(entry.resource_id().listing_name())
            {
                continue;
            }
            if let Some(info) = self.resolve_item_info(&entry)? {
                infos.push(info);
                supplemented += 1;
            }
        }

        if supplemented > 0 {
            debug!(
                bucket = bucket_name,
                prefix = prefix,
                count = supplemented,
                "Supplemented object info"
            );
        }
        cap_results(&mut infos, max_results);
        Ok(infos)
    }

    fn get_item_info(&self, resource_id: &ResourceId) -> Result<ItemInfo> {
        self.delegate.get_item_info(resource_id)
    }

    fn get_item_infos(&self, resource_ids: &[ResourceId]) -> Result<Vec<ItemInfo>> {
        self.delegate.get_item_infos(resource_ids)
    }

    fn wait_for_bucket_empty(&self, bucket_name: &str) -> Result<()> {
        self.delegate.wait_for_bucket_empty(bucket_name)
    }

    fn close(&self) -> Result<()> {
        self.delegate.close()
    }
}

// == Cache Updating Channel ==
/// Wraps the delegate's write channel and records the object in the cache
/// once, and only if, the delegate's close succeeds.
struct CacheUpdatingChannel {
    inner: Box<dyn WritableChannel>,
    cache: Arc<DirectoryListCache>,
    resource_id: ResourceId,
}

impl Write for CacheUpdatingChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl WritableChannel for CacheUpdatingChannel {
    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn close(&mut self) -> Result<()> {
        if let Err(err) = self.inner.close() {
            warn!(resource = %self.resource_id, error = %err, "Object creation failed at close");
            return Err(err);
        }

        self.cache.put_resource_id(self.resource_id.bucket_id());
        self.cache.put_resource_id(self.resource_id.clone());
        Ok(())
    }
}
