//! Request and Response models for the storage gateway API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    CopyRequest, CreateObjectQuery, ItemInfosRequest, ListBucketsQuery, ListObjectsQuery,
};
pub use responses::{
    ErrorResponse, HealthResponse, ItemInfoListResponse, MessageResponse, NameListResponse,
    StatsResponse,
};
