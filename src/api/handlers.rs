//! API Handlers
//!
//! HTTP request handlers for each storage gateway endpoint. Storage calls
//! are synchronous, so every handler hands its work to the blocking pool.

use std::io::{Read, Write};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::cache::DirectoryListCache;
use crate::config::Config;
use crate::error::{Result, StorageError};
use crate::models::{
    CopyRequest, CreateObjectQuery, HealthResponse, ItemInfoListResponse, ItemInfosRequest,
    ListBucketsQuery, ListObjectsQuery, MessageResponse, NameListResponse, StatsResponse,
};
use crate::storage::{CacheSupplementedStorage, InMemoryStorage, ItemInfo, ResourceId, Storage};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage seen by clients, normally the cache-supplemented decorator
    pub storage: Arc<dyn Storage>,
    /// The directory list cache behind `storage`, exposed for stats
    pub cache: Arc<DirectoryListCache>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, cache: Arc<DirectoryListCache>) -> Self {
        Self { storage, cache }
    }

    /// Builds an in-memory store wrapped by the cache-supplemented
    /// decorator, both configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        let cache = Arc::new(DirectoryListCache::new(config.cache_config()));
        let delegate: Arc<dyn Storage> =
            Arc::new(InMemoryStorage::new(config.in_memory_options()));
        let storage = CacheSupplementedStorage::new(delegate, Arc::clone(&cache));
        Self::new(Arc::new(storage), cache)
    }
}

/// Runs `op` against the storage on the blocking thread pool.
async fn with_storage<T, F>(state: &AppState, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Storage) -> Result<T> + Send + 'static,
{
    let storage = Arc::clone(&state.storage);
    tokio::task::spawn_blocking(move || op(storage.as_ref()))
        .await
        .map_err(|e| StorageError::Internal(format!("storage task failed: {}", e)))?
}

fn invalid(message: String) -> StorageError {
    StorageError::InvalidArgument(message)
}

// == Buckets ==
/// Handler for GET /buckets
pub async fn list_buckets_handler(
    State(state): State<AppState>,
    Query(query): Query<ListBucketsQuery>,
) -> Result<Response> {
    if query.info {
        let items = with_storage(&state, |s| s.list_bucket_info()).await?;
        Ok(Json(ItemInfoListResponse::new(items)).into_response())
    } else {
        let names = with_storage(&state, |s| s.list_bucket_names()).await?;
        Ok(Json(NameListResponse::new(names)).into_response())
    }
}

/// Handler for PUT /buckets/:bucket
pub async fn create_bucket_handler(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let name = bucket.clone();
    with_storage(&state, move |s| s.create_bucket(&name)).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!("Bucket '{}' created", bucket))),
    ))
}

/// Handler for DELETE /buckets/:bucket
pub async fn delete_bucket_handler(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
) -> Result<Json<MessageResponse>> {
    let names = vec![bucket.clone()];
    with_storage(&state, move |s| s.delete_buckets(&names)).await?;

    Ok(Json(MessageResponse::new(format!(
        "Bucket '{}' deleted",
        bucket
    ))))
}

/// Handler for POST /buckets/:bucket/wait-empty
pub async fn wait_for_bucket_empty_handler(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
) -> Result<Json<MessageResponse>> {
    let name = bucket.clone();
    with_storage(&state, move |s| s.wait_for_bucket_empty(&name)).await?;

    Ok(Json(MessageResponse::new(format!(
        "Bucket '{}' is empty",
        bucket
    ))))
}

// == Objects ==
/// Handler for GET /buckets/:bucket/objects
pub async fn list_objects_handler(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    Query(query): Query<ListObjectsQuery>,
) -> Result<Response> {
    let delimiter = query.delimiter().map(str::to_string);
    let prefix = query.prefix.clone();
    let max_results = query.max_results;

    if query.info {
        let items = with_storage(&state, move |s| {
            s.list_object_info(&bucket, &prefix, delimiter.as_deref(), max_results)
        })
        .await?;
        Ok(Json(ItemInfoListResponse::new(items)).into_response())
    } else {
        let names = with_storage(&state, move |s| {
            s.list_object_names(&bucket, &prefix, delimiter.as_deref(), max_results)
        })
        .await?;
        Ok(Json(NameListResponse::new(names)).into_response())
    }
}

/// Handler for PUT /buckets/:bucket/objects/*object
///
/// Creates the object from the request body in one create, write and close.
pub async fn put_object_handler(
    State(state): State<AppState>,
    Path((bucket, object)): Path<(String, String)>,
    Query(query): Query<CreateObjectQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<ItemInfo>)> {
    let resource_id = ResourceId::object(bucket, object);
    let options = query.options();
    let size = body.len();

    let info = with_storage(&state, move |s| {
        let mut channel = s.create(&resource_id, options)?;
        channel.write_all(&body)?;
        channel.close()?;
        s.get_item_info(&resource_id)
    })
    .await?;

    debug!(resource = %info.resource_id, size, "Stored object");
    Ok((StatusCode::CREATED, Json(info)))
}

/// Handler for GET /buckets/:bucket/objects/*object
pub async fn get_object_handler(
    State(state): State<AppState>,
    Path((bucket, object)): Path<(String, String)>,
) -> Result<Response> {
    let resource_id = ResourceId::object(bucket, object);

    let data = with_storage(&state, move |s| {
        let mut channel = s.open(&resource_id)?;
        let mut data = Vec::with_capacity(channel.size() as usize);
        channel.read_to_end(&mut data)?;
        channel.close()?;
        Ok(data)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], data).into_response())
}

/// Handler for DELETE /buckets/:bucket/objects/*object
pub async fn delete_object_handler(
    State(state): State<AppState>,
    Path((bucket, object)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    let resource_id = ResourceId::object(bucket, object);
    let message = format!("Object '{}' deleted", resource_id);

    with_storage(&state, move |s| s.delete_objects(&[resource_id])).await?;

    Ok(Json(MessageResponse::new(message)))
}

/// Handler for POST /copy
pub async fn copy_handler(
    State(state): State<AppState>,
    Json(req): Json<CopyRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(invalid(error_msg));
    }
    let count = req.dst_objects.len();

    with_storage(&state, move |s| {
        s.copy(
            &req.src_bucket,
            &req.src_objects,
            &req.dst_bucket,
            &req.dst_objects,
        )
    })
    .await?;

    Ok(Json(MessageResponse::new(format!("Copied {} objects", count))))
}

// == Metadata ==
/// Handler for GET /metadata/:bucket
pub async fn bucket_metadata_handler(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
) -> Result<Json<ItemInfo>> {
    let resource_id = ResourceId::bucket(bucket);
    let info = with_storage(&state, move |s| s.get_item_info(&resource_id)).await?;
    Ok(Json(info))
}

/// Handler for GET /metadata/:bucket/*object
pub async fn object_metadata_handler(
    State(state): State<AppState>,
    Path((bucket, object)): Path<(String, String)>,
) -> Result<Json<ItemInfo>> {
    let resource_id = ResourceId::object(bucket, object);
    let info = with_storage(&state, move |s| s.get_item_info(&resource_id)).await?;
    Ok(Json(info))
}

/// Handler for POST /metadata
pub async fn item_infos_handler(
    State(state): State<AppState>,
    Json(req): Json<ItemInfosRequest>,
) -> Result<Json<ItemInfoListResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(invalid(error_msg));
    }

    let items = with_storage(&state, move |s| s.get_item_infos(&req.resource_ids)).await?;
    Ok(Json(ItemInfoListResponse::new(items)))
}

// == Diagnostics ==
/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
