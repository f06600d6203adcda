//! Cache Module
//!
//! Client-side directory list cache: remembers resources recently created
//! through this process so listings can include them before the remote
//! store's own listings catch up.

mod clock;
mod entry;
pub mod listing;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, CachedInfo};
pub use stats::CacheStats;
pub use store::{CacheConfig, DirectoryListCache, DEFAULT_MAX_ENTRY_AGE_MS, DEFAULT_MAX_INFO_AGE_MS};
