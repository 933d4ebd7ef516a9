//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, delete_many_handler, get_handler, get_many_handler,
    has_handler, health_handler, set_handler, set_many_handler, AppState,
};
use crate::cache::Cache;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Store a key-value pair
/// - `GET /get/:key` - Retrieve a value by key
/// - `GET /has/:key` - Check whether a key holds a live value
/// - `DELETE /del/:key` - Delete a key
/// - `POST /clear` - Delete every key in the cache's scope
/// - `POST /get-many` - Retrieve several keys at once
/// - `PUT /set-many` - Store several key-value pairs at once
/// - `POST /delete-many` - Delete several keys at once
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router<C: Cache + 'static>(state: AppState<C>) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/set", put(set_handler::<C>))
        .route("/get/:key", get(get_handler::<C>))
        .route("/has/:key", get(has_handler::<C>))
        .route("/del/:key", delete(delete_handler::<C>))
        .route("/clear", post(clear_handler::<C>))
        .route("/get-many", post(get_many_handler::<C>))
        .route("/set-many", put(set_many_handler::<C>))
        .route("/delete-many", post(delete_many_handler::<C>))
        .route("/health", get(health_handler::<C>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FileCache;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    fn create_test_app() -> (TempDir, Router) {
        let tmp = TempDir::new().unwrap();
        let state = AppState::new(FileCache::new(tmp.path()).unwrap(), "file");
        (tmp, create_router(state))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_tmp, app) = create_test_app();

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
    async fn test_set_endpoint() {
        let (_tmp, app) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/set")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"key":"test","value":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_empty_key_is_bad_request() {
        let (_tmp, app) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/set")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"key":"","value":"Blank"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let (_tmp, app) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/get/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clear_endpoint() {
        let (_tmp, app) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/clear")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
