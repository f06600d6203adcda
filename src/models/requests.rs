//! Request DTOs for the storage gateway API
//!
//! Query strings and JSON bodies accepted by the handlers.

use serde::Deserialize;

use crate::storage::{CreateObjectOptions, ResourceId};

fn default_overwrite() -> bool {
    true
}

/// Query for `GET /buckets`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBucketsQuery {
    /// Return full metadata instead of names
    #[serde(default)]
    pub info: bool,
}

/// Query for `GET /buckets/:bucket/objects`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListObjectsQuery {
    #[serde(default)]
    pub prefix: String,
    /// Hierarchy separator, usually `/`; absent means a flat listing
    #[serde(default)]
    pub delimiter: Option<String>,
    /// Absent means no limit
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub info: bool,
}

impl ListObjectsQuery {
    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref().filter(|d| !d.is_empty())
    }
}

/// Query for `PUT /buckets/:bucket/objects/*object`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateObjectQuery {
    /// Replace an existing object (default: true)
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl Default for CreateObjectQuery {
    fn default() -> Self {
        Self {
            overwrite: true,
            content_type: None,
        }
    }
}

impl CreateObjectQuery {
    pub fn options(&self) -> CreateObjectOptions {
        let options = CreateObjectOptions::new(self.overwrite);
        match &self.content_type {
            Some(content_type) => options.with_content_type(content_type.clone()),
            None => options,
        }
    }
}

/// Request body for `POST /copy`
#[derive(Debug, Clone, Deserialize)]
pub struct CopyRequest {
    pub src_bucket: String,
    pub src_objects: Vec<String>,
    pub dst_bucket: String,
    pub dst_objects: Vec<String>,
}

impl CopyRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.src_bucket.is_empty() || self.dst_bucket.is_empty() {
            return Some("Bucket names cannot be empty".to_string());
        }
        if self
            .src_objects
            .iter()
            .chain(&self.dst_objects)
            .any(String::is_empty)
        {
            return Some("Object names cannot be empty".to_string());
        }
        None
    }
}

/// Request body for `POST /metadata`
#[derive(Debug, Clone, Deserialize)]
pub struct ItemInfosRequest {
    pub resource_ids: Vec<ResourceId>,
}

impl ItemInfosRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        for id in &self.resource_ids {
            if id.bucket_name().is_empty() {
                return Some("Bucket names cannot be empty".to_string());
            }
            if id.object_name() == Some("") {
                return Some(format!("Empty object name in bucket '{}'", id.bucket_name()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_objects_query_defaults() {
        let query: ListObjectsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.prefix, "");
        assert!(query.delimiter().is_none());
        assert!(query.max_results.is_none());
        assert!(!query.info);
    }

    #[test]
    fn test_empty_delimiter_means_flat() {
        let query = ListObjectsQuery {
            delimiter: Some(String::new()),
            ..Default::default()
        };
        assert!(query.delimiter().is_none());
    }

    #[test]
    fn test_create_object_query_defaults_to_overwrite() {
        let query: CreateObjectQuery = serde_json::from_str("{}").unwrap();
        assert!(query.overwrite);
        assert!(query.options().overwrite_existing);

        let query: CreateObjectQuery =
            serde_json::from_str(r#"{"overwrite": false, "content_type": "text/plain"}"#)
                .unwrap();
        let options = query.options();
        assert!(!options.overwrite_existing);
        assert_eq!(options.content_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_copy_request_validation() {
        let json = r#"{"src_bucket": "a", "src_objects": ["x"], "dst_bucket": "b", "dst_objects": ["y"]}"#;
        let req: CopyRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_none());

        let req = CopyRequest {
            dst_objects: vec![String::new()],
            ..req
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_item_infos_request() {
        let json = r#"{"resource_ids": [{"bucket_name": "b"}, {"bucket_name": "b", "object_name": "o"}]}"#;
        let req: ItemInfosRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.resource_ids[0], ResourceId::bucket("b"));
        assert_eq!(req.resource_ids[1], ResourceId::object("b", "o"));
        assert!(req.validate().is_none());

        let req = ItemInfosRequest {
            resource_ids: vec![ResourceId::bucket("")],
        };
        assert!(req.validate().is_some());
    }
}
