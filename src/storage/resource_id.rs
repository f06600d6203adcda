//! Resource Identifier Module
//!
//! Names either a bucket or an object inside a bucket.

use std::fmt;

use serde::{Deserialize, Serialize};

// == Resource Id ==
/// Identifies a bucket (`object_name == None`) or an object within a bucket.
///
/// Equality is structural: object names are opaque strings and are never
/// normalized, so `"a/b"` and `"a//b"` are different resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId {
    /// Name of the bucket
    pub bucket_name: String,
    /// Name of the object, absent for buckets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
}

impl ResourceId {
    // == Constructors ==
    /// Creates an identifier naming a bucket.
    pub fn bucket(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            object_name: None,
        }
    }

    /// Creates an identifier naming an object inside `bucket_name`.
    pub fn object(bucket_name: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            object_name: Some(object_name.into()),
        }
    }

    // == Accessors ==
    /// Returns the bucket name.
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Returns the object name, or None for a bucket identifier.
    pub fn object_name(&self) -> Option<&str> {
        self.object_name.as_deref()
    }

    /// True if this identifier names a bucket.
    pub fn is_bucket(&self) -> bool {
        self.object_name.is_none()
    }

    /// True if this identifier names an object.
    pub fn is_object(&self) -> bool {
        self.object_name.is_some()
    }

    /// Returns the identifier of the bucket owning this resource.
    ///
    /// For a bucket identifier this is a copy of itself.
    pub fn bucket_id(&self) -> ResourceId {
        ResourceId::bucket(self.bucket_name.clone())
    }

    /// The name listings display for this resource: the object name for
    /// objects, the bucket name for buckets.
    pub fn listing_name(&self) -> &str {
        self.object_name.as_deref().unwrap_or(&self.bucket_name)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object_name {
            Some(object_name) => write!(f, "{}/{}", self.bucket_name, object_name),
            None => write!(f, "{}", self.bucket_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_and_object_ids_differ() {
        let bucket = ResourceId::bucket("foo-bucket");
        let object = ResourceId::object("foo-bucket", "bar-object");

        assert!(bucket.is_bucket());
        assert!(object.is_object());
        assert_ne!(bucket, object);
        assert_eq!(object.bucket_id(), bucket);
    }

    #[test]
    fn test_object_names_are_not_normalized() {
        assert_ne!(
            ResourceId::object("b", "a/b"),
            ResourceId::object("b", "a//b")
        );
        assert_ne!(ResourceId::object("b", "dir"), ResourceId::object("b", "dir/"));
    }

    #[test]
    fn test_listing_name() {
        assert_eq!(ResourceId::bucket("b1").listing_name(), "b1");
        assert_eq!(ResourceId::object("b1", "x/y").listing_name(), "x/y");
    }

    #[test]
    fn test_display() {
        assert_eq!(ResourceId::bucket("b1").to_string(), "b1");
        assert_eq!(ResourceId::object("b1", "x/y").to_string(), "b1/x/y");
    }

    #[test]
    fn test_serde_skips_missing_object_name() {
        let json = serde_json::to_string(&ResourceId::bucket("b1")).unwrap();
        assert_eq!(json, r#"{"bucket_name":"b1"}"#);

        let id: ResourceId =
            serde_json::from_str(r#"{"bucket_name":"b1","object_name":"o"}"#).unwrap();
        assert_eq!(id, ResourceId::object("b1", "o"));
    }
}
