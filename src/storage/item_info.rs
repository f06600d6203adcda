//! Item Info Module
//!
//! Immutable metadata snapshot for a bucket or object.

use serde::{Deserialize, Serialize};

use super::ResourceId;

// == Item Info ==
/// Metadata for a resource as observed at one point in time.
///
/// A snapshot with `exists == false` is a legitimate answer ("the store says
/// this does not exist") and is distinct from having no snapshot at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    /// The resource this snapshot describes
    pub resource_id: ResourceId,
    /// Whether the resource existed when the snapshot was taken
    pub exists: bool,
    /// Size in bytes (0 for buckets and missing resources)
    pub size: u64,
    /// Creation timestamp (Unix milliseconds)
    pub creation_time_ms: u64,
    /// Object generation; None for buckets, missing resources and
    /// implicit directories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    /// Bucket location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Bucket storage class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// Object content type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ItemInfo {
    // == Constructors ==
    /// Creates a snapshot for an existing bucket.
    pub fn for_bucket(
        bucket_name: impl Into<String>,
        creation_time_ms: u64,
        location: impl Into<String>,
        storage_class: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: ResourceId::bucket(bucket_name),
            exists: true,
            size: 0,
            creation_time_ms,
            generation: None,
            location: Some(location.into()),
            storage_class: Some(storage_class.into()),
            content_type: None,
        }
    }

    /// Creates a snapshot for an existing object.
    pub fn for_object(
        resource_id: ResourceId,
        size: u64,
        creation_time_ms: u64,
        generation: i64,
        content_type: Option<String>,
    ) -> Self {
        Self {
            resource_id,
            exists: true,
            size,
            creation_time_ms,
            generation: Some(generation),
            location: None,
            storage_class: None,
            content_type,
        }
    }

    /// Creates a snapshot for a directory that only exists because objects
    /// live underneath it.
    pub fn for_implicit_directory(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            exists: true,
            size: 0,
            creation_time_ms: 0,
            generation: None,
            location: None,
            storage_class: None,
            content_type: None,
        }
    }

    /// Creates the "does not exist" snapshot for `resource_id`.
    pub fn not_found(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            exists: false,
            size: 0,
            creation_time_ms: 0,
            generation: None,
            location: None,
            storage_class: None,
            content_type: None,
        }
    }

    /// True if this snapshot describes a bucket.
    pub fn is_bucket(&self) -> bool {
        self.resource_id.is_bucket()
    }

    /// The name listings display for this item.
    pub fn listing_name(&self) -> &str {
        self.resource_id.listing_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct_from_existing() {
        let id = ResourceId::object("b", "o");
        let missing = ItemInfo::not_found(id.clone());
        let present = ItemInfo::for_object(id, 10, 5, 1, None);

        assert!(!missing.exists);
        assert!(present.exists);
        assert_ne!(missing, present);
    }

    #[test]
    fn test_bucket_info() {
        let info = ItemInfo::for_bucket("b1", 1000, "us-east1", "STANDARD");
        assert!(info.is_bucket());
        assert_eq!(info.listing_name(), "b1");
        assert_eq!(info.size, 0);
        assert_eq!(info.location.as_deref(), Some("us-east1"));
    }

    #[test]
    fn test_serialize_omits_empty_fields() {
        let info = ItemInfo::not_found(ResourceId::bucket("b1"));
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"exists\":false"));
        assert!(!json.contains("generation"));
        assert!(!json.contains("location"));
    }
}
