use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use service_core::middleware::{
    metrics_middleware, request_id_middleware, request_span, security_headers_middleware,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    app::{health_check, index},
    metrics::metrics,
    uploads::{list_uploads, remove_handler, update_upload, upload_handler},
};
use crate::AppState;

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/uploads", post(upload_handler))
        .route("/uploads/remove", post(remove_handler))
        .route("/api/uploads", get(list_uploads))
        .route("/api/uploads/:id", put(update_upload))
        .route_layer(from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span::<axum::body::Body>))
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
