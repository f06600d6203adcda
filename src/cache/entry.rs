//! Cache Entry Module
//!
//! Defines a single cached fact ("this resource exists") together with an
//! optional, separately aged metadata snapshot.

use crate::storage::{ItemInfo, ResourceId};

// == Cached Info ==
/// What the cache knows about an entry's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CachedInfo {
    /// No lookup has produced usable metadata yet
    #[default]
    Unresolved,
    /// The last lookup said the resource does not exist (yet).
    /// Never reused; the next listing asks again.
    NotFound,
    /// Metadata fetched at `updated_at_ms`
    Resolved {
        /// The snapshot
        info: ItemInfo,
        /// When the snapshot was stored (Unix milliseconds)
        updated_at_ms: u64,
    },
}

// == Cache Entry ==
/// A point-in-time copy of one cache entry.
///
/// Entries handed out by [`DirectoryListCache`](super::DirectoryListCache)
/// are snapshots; mutate the cache through its methods, not through these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    resource_id: ResourceId,
    /// Insertion timestamp (Unix milliseconds), reset on re-insertion
    creation_time_ms: u64,
    info: CachedInfo,
    /// True for directories synthesized from deeper object names
    implicit: bool,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry for `resource_id` inserted at `now_ms`.
    pub fn new(resource_id: ResourceId, now_ms: u64) -> Self {
        Self {
            resource_id,
            creation_time_ms: now_ms,
            info: CachedInfo::Unresolved,
            implicit: false,
        }
    }

    /// Creates a synthesized directory entry; it is never stored.
    pub(crate) fn implicit_directory(resource_id: ResourceId, creation_time_ms: u64) -> Self {
        Self {
            resource_id,
            creation_time_ms,
            info: CachedInfo::Unresolved,
            implicit: true,
        }
    }

    // == Accessors ==
    pub fn resource_id(&self) -> &ResourceId {
        &self.resource_id
    }

    pub fn creation_time_ms(&self) -> u64 {
        self.creation_time_ms
    }

    pub fn cached_info(&self) -> &CachedInfo {
        &self.info
    }

    /// True if this entry was synthesized by truncating a deeper object
    /// name at a delimiter.
    pub fn is_implicit_directory(&self) -> bool {
        self.implicit
    }

    /// Returns the stored metadata, regardless of its age.
    pub fn item_info(&self) -> Option<&ItemInfo> {
        match &self.info {
            CachedInfo::Resolved { info, .. } => Some(info),
            CachedInfo::Unresolved | CachedInfo::NotFound => None,
        }
    }

    /// Returns when the metadata was last stored, if any is stored.
    pub fn info_update_time_ms(&self) -> Option<u64> {
        match &self.info {
            CachedInfo::Resolved { updated_at_ms, .. } => Some(*updated_at_ms),
            CachedInfo::Unresolved | CachedInfo::NotFound => None,
        }
    }

    // == Validity ==
    /// True while `now_ms - creation_time_ms <= max_entry_age_ms`.
    pub fn is_existence_valid(&self, now_ms: u64, max_entry_age_ms: u64) -> bool {
        now_ms.saturating_sub(self.creation_time_ms) <= max_entry_age_ms
    }

    /// Returns the stored metadata only if it is still fresh.
    pub fn fresh_item_info(&self, now_ms: u64, max_info_age_ms: u64) -> Option<&ItemInfo> {
        match &self.info {
            CachedInfo::Resolved {
                info,
                updated_at_ms,
            } if now_ms.saturating_sub(*updated_at_ms) <= max_info_age_ms => Some(info),
            _ => None,
        }
    }

    // == Mutation (cache-internal) ==
    pub(crate) fn refresh(&mut self, now_ms: u64) {
        self.creation_time_ms = now_ms;
    }

    /// Stores `info`. A "does not exist" snapshot is recorded as
    /// [`CachedInfo::NotFound`] and is not kept as metadata.
    pub(crate) fn set_item_info(&mut self, info: ItemInfo, now_ms: u64) {
        self.info = if info.exists {
            CachedInfo::Resolved {
                info,
                updated_at_ms: now_ms,
            }
        } else {
            CachedInfo::NotFound
        };
    }

    pub(crate) fn clear_item_info(&mut self) {
        self.info = CachedInfo::Unresolved;
    }
}
