//! Directory List Cache Module
//!
//! Holds every known cache entry and answers bucket and hierarchical object
//! listings without contacting the remote store. Expiry is lazy: entries
//! whose existence TTL has elapsed are purged when a lookup or listing
//! touches them.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::cache::listing::{display_name, is_implicit};
use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};
use crate::storage::{ItemInfo, ResourceId};

// == Defaults ==
/// Default existence TTL: 4 hours.
pub const DEFAULT_MAX_ENTRY_AGE_MS: u64 = 4 * 60 * 60 * 1000;

/// Default metadata TTL: 10 seconds.
pub const DEFAULT_MAX_INFO_AGE_MS: u64 = 10 * 1000;

// == Cache Config ==
/// TTLs applied by the cache. Changes take effect on the next access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long an entry's existence is trusted after insertion
    pub max_entry_age_ms: u64,
    /// How long stored metadata is trusted after it was set
    pub max_info_age_ms: u64,
}

impl CacheConfig {
    pub fn new(max_entry_age_ms: u64, max_info_age_ms: u64) -> Self {
        Self {
            max_entry_age_ms,
            max_info_age_ms,
        }
    }

    /// False when metadata would outlive the existence claim it belongs to.
    pub fn is_consistent(&self) -> bool {
        self.max_info_age_ms <= self.max_entry_age_ms
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRY_AGE_MS, DEFAULT_MAX_INFO_AGE_MS)
    }
}

// == Internal State ==
/// A bucket's own entry plus the object entries under it. The two are
/// independent: either may be present without the other.
#[derive(Debug, Default)]
struct BucketSlot {
    entry: Option<CacheEntry>,
    objects: BTreeMap<String, CacheEntry>,
}

impl BucketSlot {
    fn is_empty(&self) -> bool {
        self.entry.is_none() && self.objects.is_empty()
    }
}

#[derive(Debug, Default)]
struct CacheState {
    buckets: BTreeMap<String, BucketSlot>,
    stats: CacheStats,
}

impl CacheState {
    fn prune(&mut self, bucket_name: &str) {
        if self.buckets.get(bucket_name).is_some_and(BucketSlot::is_empty) {
            self.buckets.remove(bucket_name);
        }
    }
}

// == Directory List Cache ==
/// Thread-safe store of cache entries with lazy TTL expiry.
///
/// The whole structure sits behind one mutex, so a `put_resource_id`
/// followed by a `get_cache_entry` on the same thread always observes the
/// write, and listings see a consistent snapshot of the entries they return.
#[derive(Debug)]
pub struct DirectoryListCache {
    state: Mutex<CacheState>,
    config: RwLock<CacheConfig>,
    clock: Arc<dyn Clock>,
}

impl DirectoryListCache {
    // == Constructors ==
    /// Creates an empty cache using the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            config: RwLock::new(config),
            clock,
        }
    }

    // == Configuration ==
    pub fn config(&self) -> CacheConfig {
        *self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the TTLs. Entries already handed out are not re-validated.
    pub fn set_config(&self, config: CacheConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        debug!(
            max_entry_age_ms = config.max_entry_age_ms,
            max_info_age_ms = config.max_info_age_ms,
            "Updated cache config"
        );
    }

    /// Current time according to the cache's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Put ==
    /// Inserts `resource_id`, or refreshes its insertion time if a live
    /// entry already exists. Stored metadata survives a refresh.
    ///
    /// Inserting an object does not create an entry for its bucket.
    pub fn put_resource_id(&self, resource_id: ResourceId) -> CacheEntry {
        let config = self.config();
        let now = self.now_ms();
        let mut state = self.lock_state();

        let slot = state
            .buckets
            .entry(resource_id.bucket_name.clone())
            .or_default();
        let existing = match &resource_id.object_name {
            None => slot.entry.as_mut(),
            Some(object_name) => slot.objects.get_mut(object_name),
        };
        if let Some(entry) = existing {
            return refresh_or_replace(entry, resource_id, now, config.max_entry_age_ms);
        }

        let entry = CacheEntry::new(resource_id, now);
        match &entry.resource_id().object_name {
            None => slot.entry = Some(entry.clone()),
            Some(object_name) => {
                slot.objects.insert(object_name.clone(), entry.clone());
            }
        }
        debug!(resource = %entry.resource_id(), "Cached resource id");
        entry
    }

    // == Get ==
    /// Returns the entry for `resource_id` if it is still existence-valid.
    ///
    /// An expired entry is removed as a side effect.
    pub fn get_cache_entry(&self, resource_id: &ResourceId) -> Option<CacheEntry> {
        let config = self.config();
        let now = self.now_ms();
        let mut state = self.lock_state();

        let found = match state.buckets.get(&resource_id.bucket_name) {
            Some(slot) => match &resource_id.object_name {
                None => slot.entry.clone(),
                Some(object_name) => slot.objects.get(object_name).cloned(),
            },
            None => None,
        };

        match found {
            Some(entry) if entry.is_existence_valid(now, config.max_entry_age_ms) => {
                state.stats.record_hit();
                trace!(resource = %resource_id, "Cache HIT");
                Some(entry)
            }
            Some(_) => {
                remove_locked(&mut state, resource_id);
                state.stats.record_expirations(1);
                state.stats.record_miss();
                debug!(resource = %resource_id, "Evicted expired entry");
                None
            }
            None => {
                state.stats.record_miss();
                trace!(resource = %resource_id, "Cache MISS");
                None
            }
        }
    }

    // == Remove ==
    /// Removes the entry for `resource_id`, if any.
    ///
    /// Removing a bucket leaves the object entries under it alone.
    pub fn remove_resource_id(&self, resource_id: &ResourceId) {
        let mut state = self.lock_state();
        if remove_locked(&mut state, resource_id) {
            debug!(resource = %resource_id, "Removed resource id");
        }
    }

    // == Item Info ==
    /// Stores `info` on the live entry it describes and stamps it with the
    /// current time. A "does not exist" snapshot clears usable metadata
    /// instead of being kept.
    ///
    /// Returns false when there is no live entry to attach it to.
    pub fn put_item_info(&self, info: ItemInfo) -> bool {
        let config = self.config();
        let now = self.now_ms();
        let mut state = self.lock_state();

        let resource_id = info.resource_id.clone();
        match entry_mut(&mut state, &resource_id) {
            Some(entry) if entry.is_existence_valid(now, config.max_entry_age_ms) => {
                entry.set_item_info(info, now);
                trace!(resource = %resource_id, "Stored item info");
                true
            }
            _ => false,
        }
    }

    /// Forgets any metadata stored for `resource_id`.
    pub fn clear_item_info(&self, resource_id: &ResourceId) -> bool {
        let mut state = self.lock_state();
        match entry_mut(&mut state, resource_id) {
            Some(entry) => {
                entry.clear_item_info();
                true
            }
            None => false,
        }
    }

    /// Returns the metadata carried by `entry` if it is still fresh under
    /// the current configuration.
    pub fn fresh_item_info<'a>(&self, entry: &'a CacheEntry) -> Option<&'a ItemInfo> {
        entry.fresh_item_info(self.now_ms(), self.config().max_info_age_ms)
    }

    // == Bucket List ==
    /// Returns all live bucket entries, ordered by bucket name.
    pub fn get_bucket_list(&self) -> Vec<CacheEntry> {
        let config = self.config();
        let now = self.now_ms();
        let mut state = self.lock_state();

        let expired: Vec<String> = state
            .buckets
            .iter()
            .filter(|(_, slot)| {
                slot.entry
                    .as_ref()
                    .is_some_and(|e| !e.is_existence_valid(now, config.max_entry_age_ms))
            })
            .map(|(name, _)| name.clone())
            .collect();

        for name in &expired {
            if let Some(slot) = state.buckets.get_mut(name) {
                slot.entry = None;
            }
            state.prune(name);
        }
        if !expired.is_empty() {
            state.stats.record_expirations(expired.len());
            debug!(count = expired.len(), "Evicted expired bucket entries");
        }

        state
            .buckets
            .values()
            .filter_map(|slot| slot.entry.clone())
            .collect()
    }

    // == Object List ==
    /// Returns live object entries of `bucket_name` whose names start with
    /// `prefix`, ordered by displayed name.
    ///
    /// With a non-empty `delimiter`, names are cut after the first delimiter
    /// past the prefix and de-duplicated; cut names come back as implicit
    /// directory entries that are not stored in the cache. An explicit entry
    /// wins over an implicit one with the same name. `max_results` caps the
    /// count; None means unlimited.
    pub fn get_object_list(
        &self,
        bucket_name: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_results: Option<usize>,
    ) -> Vec<CacheEntry> {
        let config = self.config();
        let now = self.now_ms();
        let mut state = self.lock_state();

        let Some(slot) = state.buckets.get_mut(bucket_name) else {
            return Vec::new();
        };

        let expired: Vec<String> = slot
            .objects
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(name, _)| name.starts_with(prefix))
            .filter(|(_, entry)| !entry.is_existence_valid(now, config.max_entry_age_ms))
            .map(|(name, _)| name.clone())
            .collect();
        for name in &expired {
            slot.objects.remove(name);
        }

        let mut listed: BTreeMap<&str, CacheEntry> = BTreeMap::new();
        for (name, entry) in slot
            .objects
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(name, _)| name.starts_with(prefix))
        {
            let Some(display) = display_name(name, prefix, delimiter) else {
                continue;
            };

            if !is_implicit(name, display) {
                listed.insert(display, entry.clone());
                continue;
            }

            match listed.entry(display) {
                Entry::Vacant(vacant) => {
                    vacant.insert(CacheEntry::implicit_directory(
                        ResourceId::object(bucket_name, display),
                        entry.creation_time_ms(),
                    ));
                }
                Entry::Occupied(mut occupied) => {
                    let existing = occupied.get_mut();
                    if existing.is_implicit_directory()
                        && existing.creation_time_ms() < entry.creation_time_ms()
                    {
                        existing.refresh(entry.creation_time_ms());
                    }
                }
            }
        }

        let limit = max_results.unwrap_or(usize::MAX);
        let result: Vec<CacheEntry> = listed.into_values().take(limit).collect();

        if !expired.is_empty() {
            state.stats.record_expirations(expired.len());
            state.prune(bucket_name);
            debug!(
                bucket = bucket_name,
                count = expired.len(),
                "Evicted expired object entries"
            );
        }
        trace!(
            bucket = bucket_name,
            prefix = prefix,
            count = result.len(),
            "Listed cached objects"
        );

        result
    }

    // == Cleanup Expired ==
    /// Removes every entry whose existence TTL has elapsed.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let config = self.config();
        let now = self.now_ms();
        let mut state = self.lock_state();

        let mut removed = 0;
        for slot in state.buckets.values_mut() {
            if slot
                .entry
                .as_ref()
                .is_some_and(|e| !e.is_existence_valid(now, config.max_entry_age_ms))
            {
                slot.entry = None;
                removed += 1;
            }
            let before = slot.objects.len();
            slot.objects
                .retain(|_, e| e.is_existence_valid(now, config.max_entry_age_ms));
            removed += before - slot.objects.len();
        }
        state.buckets.retain(|_, slot| !slot.is_empty());
        state.stats.record_expirations(removed);

        removed
    }

    // == Introspection ==
    /// Number of stored bucket entries, including expired ones not yet purged.
    pub fn get_internal_num_buckets(&self) -> usize {
        self.lock_state()
            .buckets
            .values()
            .filter(|slot| slot.entry.is_some())
            .count()
    }

    /// Number of stored object entries, including expired ones not yet purged.
    pub fn get_internal_num_objects(&self) -> usize {
        self.lock_state()
            .buckets
            .values()
            .map(|slot| slot.objects.len())
            .sum()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock_state();
        let mut stats = state.stats.clone();
        stats.set_entry_counts(
            state.buckets.values().filter(|s| s.entry.is_some()).count(),
            state.buckets.values().map(|s| s.objects.len()).sum(),
        );
        stats
    }
}

impl Default for DirectoryListCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

// == Helpers ==
/// Refreshes a live entry in place, or replaces an expired one with a
/// fresh entry that carries no metadata.
fn refresh_or_replace(
    entry: &mut CacheEntry,
    resource_id: ResourceId,
    now: u64,
    max_entry_age_ms: u64,
) -> CacheEntry {
    if entry.is_existence_valid(now, max_entry_age_ms) {
        entry.refresh(now);
        trace!(resource = %resource_id, "Refreshed resource id");
    } else {
        *entry = CacheEntry::new(resource_id, now);
        debug!(resource = %entry.resource_id(), "Replaced expired resource id");
    }
    entry.clone()
}

fn entry_mut<'a>(state: &'a mut CacheState, resource_id: &ResourceId) -> Option<&'a mut CacheEntry> {
    let slot = state.buckets.get_mut(&resource_id.bucket_name)?;
    match &resource_id.object_name {
        None => slot.entry.as_mut(),
        Some(object_name) => slot.objects.get_mut(object_name),
    }
}

fn remove_locked(state: &mut CacheState, resource_id: &ResourceId) -> bool {
    let Some(slot) = state.buckets.get_mut(&resource_id.bucket_name) else {
        return false;
    };
    let removed = match &resource_id.object_name {
        None => slot.entry.take().is_some(),
        Some(object_name) => slot.objects.remove(object_name).is_some(),
    };
    state.prune(&resource_id.bucket_name);
    removed
}
