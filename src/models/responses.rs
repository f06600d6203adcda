//! Response DTOs for the storage gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::storage::ItemInfo;

/// Response body for name listings
#[derive(Debug, Clone, Serialize)]
pub struct NameListResponse {
    pub names: Vec<String>,
    pub count: usize,
}

impl NameListResponse {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            count: names.len(),
            names,
        }
    }
}

/// Response body for metadata listings and lookups
#[derive(Debug, Clone, Serialize)]
pub struct ItemInfoListResponse {
    pub items: Vec<ItemInfo>,
    pub count: usize,
}

impl ItemInfoListResponse {
    pub fn new(items: Vec<ItemInfo>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

/// Response body for mutations that return no data
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub bucket_entries: usize,
    pub object_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            bucket_entries: stats.bucket_entries,
            object_entries: stats.object_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ResourceId;

    #[test]
    fn test_name_list_counts() {
        let resp = NameListResponse::new(vec!["a".into(), "b/".into()]);
        assert_eq!(resp.count, 2);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("b/"));
    }

    #[test]
    fn test_item_info_list_serialize() {
        let resp = ItemInfoListResponse::new(vec![ItemInfo::not_found(ResourceId::object(
            "b", "o",
        ))]);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["items"][0]["exists"], false);
        assert_eq!(json["items"][0]["resource_id"]["object_name"], "o");
    }

    #[test]
    fn test_stats_response_from_cache_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            expirations: 5,
            bucket_entries: 1,
            object_entries: 9,
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.object_entries, 9);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
