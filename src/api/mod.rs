//! API Module
//!
//! HTTP handlers and routing for the storage gateway REST API.
//!
//! # Endpoints
//! - `GET /buckets`, `PUT|DELETE /buckets/:bucket` - Bucket listing and lifecycle
//! - `POST /buckets/:bucket/wait-empty` - Emptiness check before deletion
//! - `GET /buckets/:bucket/objects` - Hierarchical object listing
//! - `PUT|GET|DELETE /buckets/:bucket/objects/*object` - Object data
//! - `GET /metadata/...`, `POST /metadata` - Item info lookups
//! - `POST /copy` - Server-side copy
//! - `GET /stats` - Directory list cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
