//! syncer-api: HTTP API for the cloud-syncer S3 client
//!
//! Exposes list, upload, download, search and delete over HTTP with Basic
//! authentication. Every route except `/health` requires credentials.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::{ApiError, ApiResponse, ErrorCode};
pub use state::{AppState, Credentials, S3Connector, StoreConnector};

/// Build the application router
pub fn router(state: AppState) -> Router {
    // Fixed routes shadow `/files/{*key}`, so each also answers DELETE for
    // the object whose key is that literal path
    let protected = Router::new()
        .route(
            "/files/list",
            get(handlers::list_files).delete(handlers::delete_reserved),
        )
        .route(
            "/files/upload",
            // Uploads are spooled to disk, so the in-memory body cap does not apply
            post(handlers::upload_file)
                .layer(DefaultBodyLimit::disable())
                .delete(handlers::delete_reserved),
        )
        .route(
            "/files/download/",
            get(handlers::download_without_key).delete(handlers::delete_reserved),
        )
        .route(
            "/files/download/{*key}",
            get(handlers::download_file).delete(handlers::delete_download),
        )
        .route(
            "/files/search",
            get(handlers::search_files).delete(handlers::delete_reserved),
        )
        .route("/files/", delete(handlers::delete_without_key))
        .route("/files/{*key}", delete(handlers::delete_file))
        .route("/auth/verify", get(handlers::verify_auth))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy allowing one browser origin to call the API with credentials
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| anyhow::anyhow!("invalid CORS origin '{origin}': {e}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}
