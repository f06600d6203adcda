//! API Routes
//!
//! Configures the Axum router with all storage gateway endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    bucket_metadata_handler, copy_handler, create_bucket_handler, delete_bucket_handler,
    delete_object_handler, get_object_handler, health_handler, item_infos_handler,
    list_buckets_handler, list_objects_handler, object_metadata_handler, put_object_handler,
    stats_handler, wait_for_bucket_empty_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/buckets", get(list_buckets_handler))
        .route(
            "/buckets/:bucket",
            put(create_bucket_handler).delete(delete_bucket_handler),
        )
        .route(
            "/buckets/:bucket/wait-empty",
            post(wait_for_bucket_empty_handler),
        )
        .route("/buckets/:bucket/objects", get(list_objects_handler))
        .route(
            "/buckets/:bucket/objects/*object",
            put(put_object_handler)
                .get(get_object_handler)
                .delete(delete_object_handler),
        )
        .route("/metadata", post(item_infos_handler))
        .route("/metadata/:bucket", get(bucket_metadata_handler))
        .route("/metadata/:bucket/*object", get(object_metadata_handler))
        .route("/copy", post(copy_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::from_config(&Config::default()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_bucket_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/buckets/b1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_get_missing_object() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/buckets/b1/objects/a/b.txt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_bucket() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/buckets/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
