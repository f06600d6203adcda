//! In-Memory Storage Module
//!
//! A process-local object store that behaves like an eventually-consistent
//! remote one: listings only show buckets and objects some time after they
//! were created, while metadata lookups and reads see every write at once.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::cache::listing::{display_name, is_implicit};
use crate::cache::{Clock, SystemClock};
use crate::error::{Result, StorageError};
use crate::storage::{
    CreateObjectOptions, ItemInfo, ResourceId, SeekableReadableChannel, Storage, WritableChannel,
};

const BUCKET_LOCATION: &str = "local";
const BUCKET_STORAGE_CLASS: &str = "STANDARD";

// == Options ==
/// Behaviour knobs for [`InMemoryStorage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryStorageOptions {
    /// How long new buckets and objects stay out of listings
    pub list_visibility_delay_ms: u64,
    /// Reject a second writer at open while another write of the same
    /// object is in progress, instead of failing the loser at close
    pub create_marker_objects: bool,
}

// == Internal State ==
#[derive(Debug, Clone)]
struct StoredObject {
    data: Arc<[u8]>,
    created_at_ms: u64,
    generation: i64,
    content_type: Option<String>,
}

#[derive(Debug)]
struct StoredBucket {
    created_at_ms: u64,
    objects: BTreeMap<String, StoredObject>,
}

#[derive(Debug, Default)]
struct StoreState {
    buckets: BTreeMap<String, StoredBucket>,
    /// Open writers per object (marker objects)
    in_progress: HashMap<ResourceId, usize>,
    last_generation: i64,
    closed: bool,
}

impl StoreState {
    fn next_generation(&mut self) -> i64 {
        self.last_generation += 1;
        self.last_generation
    }

    fn bucket(&self, bucket_name: &str) -> Result<&StoredBucket> {
        self.buckets
            .get(bucket_name)
            .ok_or_else(|| StorageError::NotFound(format!("bucket {}", bucket_name)))
    }

    fn bucket_mut(&mut self, bucket_name: &str) -> Result<&mut StoredBucket> {
        self.buckets
            .get_mut(bucket_name)
            .ok_or_else(|| StorageError::NotFound(format!("bucket {}", bucket_name)))
    }
}

fn lock(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn object_info(bucket_name: &str, name: &str, object: &StoredObject) -> ItemInfo {
    ItemInfo::for_object(
        ResourceId::object(bucket_name, name),
        object.data.len() as u64,
        object.created_at_ms,
        object.generation,
        object.content_type.clone(),
    )
}

fn require_object_name(resource_id: &ResourceId) -> Result<&str> {
    resource_id.object_name().ok_or_else(|| {
        StorageError::InvalidArgument(format!("{} does not name an object", resource_id))
    })
}

// == In-Memory Storage ==
/// Thread-safe in-process [`Storage`].
#[derive(Debug)]
pub struct InMemoryStorage {
    state: Arc<Mutex<StoreState>>,
    options: InMemoryStorageOptions,
    clock: Arc<dyn Clock>,
}

impl InMemoryStorage {
    // == Constructors ==
    pub fn new(options: InMemoryStorageOptions) -> Self {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    pub fn with_clock(options: InMemoryStorageOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            options,
            clock,
        }
    }

    pub fn options(&self) -> &InMemoryStorageOptions {
        &self.options
    }

    fn lock_open(&self) -> Result<MutexGuard<'_, StoreState>> {
        let state = lock(&self.state);
        if state.closed {
            return Err(StorageError::ChannelClosed("storage is closed".to_string()));
        }
        Ok(state)
    }

    fn is_listable(&self, created_at_ms: u64, now_ms: u64) -> bool {
        now_ms >= created_at_ms.saturating_add(self.options.list_visibility_delay_ms)
    }

    fn bucket_info(bucket_name: &str, bucket: &StoredBucket) -> ItemInfo {
        ItemInfo::for_bucket(
            bucket_name,
            bucket.created_at_ms,
            BUCKET_LOCATION,
            BUCKET_STORAGE_CLASS,
        )
    }

    /// Walks the listable objects of `bucket_name` under `prefix`, yielding
    /// (displayed name, object if the name is not an implicit directory)
    /// in name order.
    fn collect_listing(
        &self,
        bucket_name: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<(String, Option<StoredObject>)>> {
        let now = self.clock.now_ms();
        let state = self.lock_open()?;
        let Some(bucket) = state.buckets.get(bucket_name) else {
            return Ok(Vec::new());
        };

        let mut listed: BTreeMap<String, Option<StoredObject>> = BTreeMap::new();
        for (name, object) in &bucket.objects {
            if !self.is_listable(object.created_at_ms, now) {
                continue;
            }
            let Some(display) = display_name(name, prefix, delimiter) else {
                continue;
            };
            if is_implicit(name, display) {
                listed.entry(display.to_string()).or_insert(None);
            } else {
                listed.insert(display.to_string(), Some(object.clone()));
            }
        }

        Ok(listed
            .into_iter()
            .take(max_results.unwrap_or(usize::MAX))
            .collect())
    }
}

impl Storage for InMemoryStorage {
    fn create_bucket(&self, bucket_name: &str) -> Result<()> {
        if bucket_name.is_empty() {
            return Err(StorageError::InvalidArgument(
                "bucket name must not be empty".to_string(),
            ));
        }

        let now = self.clock.now_ms();
        let mut state = self.lock_open()?;
        if state.buckets.contains_key(bucket_name) {
            return Err(StorageError::AlreadyExists(format!("bucket {}", bucket_name)));
        }
        state.buckets.insert(
            bucket_name.to_string(),
            StoredBucket {
                created_at_ms: now,
                objects: BTreeMap::new(),
            },
        );
        debug!(bucket = bucket_name, "Created bucket");
        Ok(())
    }

    fn create(
        &self,
        resource_id: &ResourceId,
        options: CreateObjectOptions,
    ) -> Result<Box<dyn WritableChannel>> {
        let object_name = require_object_name(resource_id)?;
        let mut state = self.lock_open()?;

        let bucket = state.bucket(resource_id.bucket_name())?;
        if !options.overwrite_existing && bucket.objects.contains_key(object_name) {
            return Err(StorageError::AlreadyExists(resource_id.to_string()));
        }

        if self.options.create_marker_objects {
            if !options.overwrite_existing && state.in_progress.contains_key(resource_id) {
                return Err(StorageError::AlreadyExists(format!(
                    "{} is already being created",
                    resource_id
                )));
            }
            *state.in_progress.entry(resource_id.clone()).or_default() += 1;
        }

        trace!(resource = %resource_id, "Opened write channel");
        Ok(Box::new(InMemoryWriteChannel {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
            resource_id: resource_id.clone(),
            options,
            holds_marker: self.options.create_marker_objects,
            buffer: Vec::new(),
            open: true,
        }))
    }

    fn open(&self, resource_id: &ResourceId) -> Result<Box<dyn SeekableReadableChannel>> {
        let object_name = require_object_name(resource_id)?;
        let state = self.lock_open()?;

        let object = state
            .bucket(resource_id.bucket_name())?
            .objects
            .get(object_name)
            .ok_or_else(|| StorageError::NotFound(resource_id.to_string()))?;

        Ok(Box::new(InMemoryReadChannel {
            cursor: Cursor::new(Arc::clone(&object.data)),
            open: true,
        }))
    }

    fn delete_buckets(&self, bucket_names: &[String]) -> Result<()> {
        let mut state = self.lock_open()?;

        for bucket_name in bucket_names {
            if !state.bucket(bucket_name)?.objects.is_empty() {
                return Err(StorageError::BucketNotEmpty(bucket_name.clone()));
            }
        }
        for bucket_name in bucket_names {
            state.buckets.remove(bucket_name);
            debug!(bucket = %bucket_name, "Deleted bucket");
        }
        Ok(())
    }

    fn delete_objects(&self, resource_ids: &[ResourceId]) -> Result<()> {
        let mut state = self.lock_open()?;

        for resource_id in resource_ids {
            let object_name = require_object_name(resource_id)?;
            if !state
                .bucket(resource_id.bucket_name())?
                .objects
                .contains_key(object_name)
            {
                return Err(StorageError::NotFound(resource_id.to_string()));
            }
        }
        for resource_id in resource_ids {
            let object_name = require_object_name(resource_id)?;
            state
                .bucket_mut(resource_id.bucket_name())?
                .objects
                .remove(object_name);
            debug!(resource = %resource_id, "Deleted object");
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
        if src_object_names.len() != dst_object_names.len() {
            return Err(StorageError::InvalidArgument(format!(
                "{} source names but {} destination names",
                src_object_names.len(),
                dst_object_names.len()
            )));
        }

        let now = self.clock.now_ms();
        let mut state = self.lock_open()?;
        state.bucket(dst_bucket_name)?;

        let mut sources = Vec::with_capacity(src_object_names.len());
        for (src, dst) in src_object_names.iter().zip(dst_object_names) {
            if src_bucket_name == dst_bucket_name && src == dst {
                return Err(StorageError::InvalidArgument(format!(
                    "cannot copy {}/{} onto itself",
                    src_bucket_name, src
                )));
            }
            let object = state
                .bucket(src_bucket_name)?
                .objects
                .get(src)
                .ok_or_else(|| {
                    StorageError::NotFound(format!("{}/{}", src_bucket_name, src))
                })?;
            sources.push(object.clone());
        }

        for (source, dst) in sources.into_iter().zip(dst_object_names) {
            let generation = state.next_generation();
            state.bucket_mut(dst_bucket_name)?.objects.insert(
                dst.clone(),
                StoredObject {
                    data: source.data,
                    created_at_ms: now,
                    generation,
                    content_type: source.content_type,
                },
            );
        }
        debug!(
            src_bucket = src_bucket_name,
            dst_bucket = dst_bucket_name,
            count = dst_object_names.len(),
            "Copied objects"
        );
        Ok(())
    }

    fn list_bucket_names(&self) -> Result<Vec<String>> {
        Ok(self
            .list_bucket_info()?
            .into_iter()
            .map(|info| info.resource_id.bucket_name)
            .collect())
    }

    fn list_bucket_info(&self) -> Result<Vec<ItemInfo>> {
        let now = self.clock.now_ms();
        let state = self.lock_open()?;
        Ok(state
            .buckets
            .iter()
            .filter(|(_, bucket)| self.is_listable(bucket.created_at_ms, now))
            .map(|(name, bucket)| Self::bucket_info(name, bucket))
            .collect())
    }

    fn list_object_names(
        &self,
        bucket_name: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<String>> {
        Ok(self
            .collect_listing(bucket_name, prefix, delimiter, max_results)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn list_object_info(
        &self,
        bucket_name: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<ItemInfo>> {
        Ok(self
            .collect_listing(bucket_name, prefix, delimiter, max_results)?
            .into_iter()
            .map(|(name, object)| match object {
                Some(object) => object_info(bucket_name, &name, &object),
                None => ItemInfo::for_implicit_directory(ResourceId::object(bucket_name, name)),
            })
            .collect())
    }

    fn get_item_info(&self, resource_id: &ResourceId) -> Result<ItemInfo> {
        let state = self.lock_open()?;
        let Some(bucket) = state.buckets.get(resource_id.bucket_name()) else {
            return Ok(ItemInfo::not_found(resource_id.clone()));
        };

        let info = match resource_id.object_name() {
            None => Self::bucket_info(resource_id.bucket_name(), bucket),
            Some(object_name) => match bucket.objects.get(object_name) {
                Some(object) => object_info(resource_id.bucket_name(), object_name, object),
                None => ItemInfo::not_found(resource_id.clone()),
            },
        };
        Ok(info)
    }

    fn get_item_infos(&self, resource_ids: &[ResourceId]) -> Result<Vec<ItemInfo>> {
        resource_ids
            .iter()
            .map(|resource_id| self.get_item_info(resource_id))
            .collect()
    }

    fn wait_for_bucket_empty(&self, bucket_name: &str) -> Result<()> {
        let state = self.lock_open()?;
        if state.bucket(bucket_name)?.objects.is_empty() {
            Ok(())
        } else {
            Err(StorageError::BucketNotEmpty(bucket_name.to_string()))
        }
    }

    fn close(&self) -> Result<()> {
        lock(&self.state).closed = true;
        debug!("Closed in-memory storage");
        Ok(())
    }
}

// == Write Channel ==
struct InMemoryWriteChannel {
    state: Arc<Mutex<StoreState>>,
    clock: Arc<dyn Clock>,
    resource_id: ResourceId,
    options: CreateObjectOptions,
    holds_marker: bool,
    buffer: Vec<u8>,
    open: bool,
}

impl InMemoryWriteChannel {
    fn release_marker(&mut self, state: &mut StoreState) {
        if self.holds_marker {
            if let Some(writers) = state.in_progress.get_mut(&self.resource_id) {
                *writers -= 1;
                if *writers == 0 {
                    state.in_progress.remove(&self.resource_id);
                }
            }
            self.holds_marker = false;
        }
    }
}

impl Write for InMemoryWriteChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.open {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("write to closed channel for {}", self.resource_id),
            ));
        }
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WritableChannel for InMemoryWriteChannel {
    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Err(StorageError::ChannelClosed(self.resource_id.to_string()));
        }
        self.open = false;

        let now = self.clock.now_ms();
        let state_handle = Arc::clone(&self.state);
        let mut state = lock(&state_handle);
        self.release_marker(&mut state);

        if state.closed {
            return Err(StorageError::ChannelClosed("storage is closed".to_string()));
        }
        let object_name = require_object_name(&self.resource_id)?.to_string();
        let generation = state.next_generation();
        let bucket = state.bucket_mut(self.resource_id.bucket_name())?;

        if !self.options.overwrite_existing && bucket.objects.contains_key(&object_name) {
            return Err(StorageError::PreconditionFailed(format!(
                "{} was created by another writer",
                self.resource_id
            )));
        }

        bucket.objects.insert(
            object_name,
            StoredObject {
                data: Arc::from(std::mem::take(&mut self.buffer)),
                created_at_ms: now,
                generation,
                content_type: self.options.content_type.clone(),
            },
        );
        debug!(resource = %self.resource_id, generation, "Committed object");
        Ok(())
    }
}

impl Drop for InMemoryWriteChannel {
    fn drop(&mut self) {
        if self.holds_marker {
            let state_handle = Arc::clone(&self.state);
            let mut state = lock(&state_handle);
            self.release_marker(&mut state);
        }
    }
}

// == Read Channel ==
struct InMemoryReadChannel {
    cursor: Cursor<Arc<[u8]>>,
    open: bool,
}

impl Read for InMemoryReadChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.open {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "read from closed channel"));
        }
        self.cursor.read(buf)
    }
}

impl Seek for InMemoryReadChannel {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl SeekableReadableChannel for InMemoryReadChannel {
    fn size(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const LAG: u64 = 1_000;

    fn test_storage(create_marker_objects: bool) -> (InMemoryStorage, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(10_000));
        let storage = InMemoryStorage::with_clock(
            InMemoryStorageOptions {
                list_visibility_delay_ms: LAG,
                create_marker_objects,
            },
            clock.clone(),
        );
        (storage, clock)
    }

    fn put(storage: &InMemoryStorage, bucket: &str, name: &str, data: &[u8]) {
        let mut channel = storage
            .create(&ResourceId::object(bucket, name), CreateObjectOptions::default())
            .unwrap();
        channel.write_all(data).unwrap();
        channel.close().unwrap();
    }

    #[test]
    fn test_listing_lags_behind_creation() {
        let (storage, clock) = test_storage(false);
        storage.create_bucket("b1").unwrap();
        put(&storage, "b1", "obj", b"data");

        assert!(storage.list_bucket_names().unwrap().is_empty());
        assert!(storage.list_object_names("b1", "", None, None).unwrap().is_empty());
        assert!(storage
            .get_item_info(&ResourceId::object("b1", "obj"))
            .unwrap()
            .exists);

        clock.advance(LAG);
        assert_eq!(storage.list_bucket_names().unwrap(), vec!["b1"]);
        assert_eq!(
            storage.list_object_names("b1", "", None, None).unwrap(),
            vec!["obj"]
        );
    }

    #[test]
    fn test_listing_with_delimiter() {
        let (storage, clock) = test_storage(false);
        storage.create_bucket("b1").unwrap();
        for name in ["foo/dir1/x", "foo/dir2", "foo/dir4/", "foo/dir4/y", "bar"] {
            put(&storage, "b1", name, b"");
        }
        clock.advance(LAG);

        assert_eq!(
            storage.list_object_names("b1", "foo/dir", Some("/"), None).unwrap(),
            vec!["foo/dir1/", "foo/dir2", "foo/dir4/"]
        );

        let infos = storage.list_object_info("b1", "foo/dir", Some("/"), None).unwrap();
        assert_eq!(infos.len(), 3);
        assert_eq!(infos[0].generation, None);
        assert!(infos[0].exists);
        assert!(infos[2].generation.is_some());

        assert_eq!(
            storage.list_object_names("b1", "", None, Some(2)).unwrap(),
            vec!["bar", "foo/dir1/x"]
        );
    }

    #[test]
    fn test_read_back_and_seek() {
        let (storage, _) = test_storage(false);
        storage.create_bucket("b1").unwrap();
        put(&storage, "b1", "obj", b"hello world");

        let mut channel = storage.open(&ResourceId::object("b1", "obj")).unwrap();
        assert_eq!(channel.size(), 11);

        channel.seek(SeekFrom::Start(6)).unwrap();
        let mut rest = String::new();
        channel.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "world");

        channel.close().unwrap();
        assert!(!channel.is_open());
    }

    #[test]
    fn test_unclosed_channel_creates_nothing() {
        let (storage, _) = test_storage(true);
        storage.create_bucket("b1").unwrap();
        let id = ResourceId::object("b1", "obj");
        {
            let mut channel = storage.create(&id, CreateObjectOptions::default()).unwrap();
            channel.write_all(b"lost").unwrap();
        }

        assert!(!storage.get_item_info(&id).unwrap().exists);
        // The marker went away with the channel.
        assert!(storage.create(&id, CreateObjectOptions::new(false)).is_ok());
    }

    #[test]
    fn test_conflicting_writes_with_marker_objects() {
        let (storage, _) = test_storage(true);
        storage.create_bucket("b1").unwrap();
        let id = ResourceId::object("b1", "obj1");

        let mut first = storage.create(&id, CreateObjectOptions::new(false)).unwrap();
        first.write_all(&[7u8; 1024]).unwrap();

        let err = storage.create(&id, CreateObjectOptions::new(false)).err().unwrap();
        assert!(err.to_string().contains("already"));

        first.close().unwrap();
    }

    #[test]
    fn test_marker_outlives_overlapping_overwrite() {
        let (storage, _) = test_storage(true);
        storage.create_bucket("b").unwrap();
        let id = ResourceId::object("b", "o2");

        let mut first = storage.create(&id, CreateObjectOptions::new(false)).unwrap();
        let overwriting = storage.create(&id, CreateObjectOptions::new(true)).unwrap();
        drop(overwriting);

        // The first writer is still open, so its marker must still hold.
        let err = storage.create(&id, CreateObjectOptions::new(false)).err().unwrap();
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        first.write_all(b"data").unwrap();
        first.close().unwrap();
        assert!(storage.get_item_info(&id).unwrap().exists);
        assert!(storage.create(&id, CreateObjectOptions::new(true)).is_ok());
    }

    #[test]
    fn test_conflicting_writes_without_marker_objects() {
        let (storage, _) = test_storage(false);
        storage.create_bucket("b1").unwrap();
        let id = ResourceId::object("b1", "obj1");

        let mut first = storage.create(&id, CreateObjectOptions::new(false)).unwrap();
        let mut second = storage.create(&id, CreateObjectOptions::new(false)).unwrap();
        first.write_all(b"one").unwrap();
        second.write_all(b"two").unwrap();

        first.close().unwrap();
        let err = second.close().unwrap_err();
        assert!(err.to_string().contains("412 Precondition Failed"));

        let mut content = String::new();
        storage
            .open(&id)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "one");
    }

    #[test]
    fn test_overwrite_bumps_generation() {
        let (storage, _) = test_storage(false);
        storage.create_bucket("b1").unwrap();
        let id = ResourceId::object("b1", "obj");

        put(&storage, "b1", "obj", b"v1");
        let first = storage.get_item_info(&id).unwrap().generation.unwrap();
        put(&storage, "b1", "obj", b"v22");
        let second = storage.get_item_info(&id).unwrap();

        assert!(second.generation.unwrap() > first);
        assert_eq!(second.size, 3);
    }

    #[test]
    fn test_create_requires_bucket() {
        let (storage, _) = test_storage(false);
        let err = storage
            .create(&ResourceId::object("nope", "obj"), CreateObjectOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, StorageError::NotFound(_)));

        let err = storage
            .create(&ResourceId::bucket("nope"), CreateObjectOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
    }

    #[test]
    fn test_delete_buckets_validates_first() {
        let (storage, _) = test_storage(false);
        storage.create_bucket("b1").unwrap();
        storage.create_bucket("b2").unwrap();
        put(&storage, "b2", "obj", b"x");

        let err = storage
            .delete_buckets(&["b1".to_string(), "b2".to_string()])
            .unwrap_err();
        assert!(matches!(err, StorageError::BucketNotEmpty(_)));
        assert!(storage.get_item_info(&ResourceId::bucket("b1")).unwrap().exists);

        let err = storage.delete_buckets(&["b3".to_string()]).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));

        storage.delete_buckets(&["b1".to_string()]).unwrap();
        assert!(!storage.get_item_info(&ResourceId::bucket("b1")).unwrap().exists);
    }

    #[test]
    fn test_delete_objects() {
        let (storage, _) = test_storage(false);
        storage.create_bucket("b1").unwrap();
        put(&storage, "b1", "a", b"x");
        put(&storage, "b1", "b", b"x");

        let err = storage
            .delete_objects(&[ResourceId::object("b1", "a"), ResourceId::object("b1", "zz")])
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert!(storage.get_item_info(&ResourceId::object("b1", "a")).unwrap().exists);

        storage
            .delete_objects(&[ResourceId::object("b1", "a")])
            .unwrap();
        assert!(!storage.get_item_info(&ResourceId::object("b1", "a")).unwrap().exists);
        assert!(storage.get_item_info(&ResourceId::object("b1", "b")).unwrap().exists);
    }

    #[test]
    fn test_copy() {
        let (storage, _) = test_storage(false);
        storage.create_bucket("src").unwrap();
        storage.create_bucket("dst").unwrap();
        put(&storage, "src", "a", b"payload");

        storage
            .copy("src", &["a".to_string()], "dst", &["b".to_string()])
            .unwrap();

        let info = storage.get_item_info(&ResourceId::object("dst", "b")).unwrap();
        assert_eq!(info.size, 7);
        assert!(storage.get_item_info(&ResourceId::object("src", "a")).unwrap().exists);

        let err = storage
            .copy("src", &["a".to_string()], "dst", &[])
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));

        let err = storage
            .copy("src", &["a".to_string()], "src", &["a".to_string()])
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));

        let err = storage
            .copy("src", &["missing".to_string()], "dst", &["c".to_string()])
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_get_item_infos_keeps_order() {
        let (storage, _) = test_storage(false);
        storage.create_bucket("b1").unwrap();
        put(&storage, "b1", "a", b"x");

        let ids = vec![
            ResourceId::object("b1", "missing"),
            ResourceId::bucket("b1"),
            ResourceId::object("b1", "a"),
        ];
        let infos = storage.get_item_infos(&ids).unwrap();

        assert_eq!(infos.len(), 3);
        assert!(!infos[0].exists);
        assert!(infos[1].is_bucket());
        assert_eq!(infos[2].resource_id, ids[2]);
    }

    #[test]
    fn test_wait_for_bucket_empty() {
        let (storage, _) = test_storage(false);
        storage.create_bucket("b1").unwrap();
        storage.wait_for_bucket_empty("b1").unwrap();

        put(&storage, "b1", "a", b"x");
        assert!(matches!(
            storage.wait_for_bucket_empty("b1"),
            Err(StorageError::BucketNotEmpty(_))
        ));
        assert!(matches!(
            storage.wait_for_bucket_empty("nope"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_close_rejects_later_calls() {
        let (storage, _) = test_storage(false);
        storage.close().unwrap();
        assert!(matches!(
            storage.create_bucket("b1"),
            Err(StorageError::ChannelClosed(_))
        ));
    }
}
