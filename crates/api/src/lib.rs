//! HTTP API layer with Axum routes and the admin page.
//!
//! This crate provides:
//! - The form-encoded lookup endpoint and its server-rendered page
//! - Admin-context extraction from forwarded headers
//! - Health endpoint

pub mod extractors;
pub mod page;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use reflens_db::SchemaCapabilities;
use reflens_shared::LookupConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Optional-schema flags probed once at startup.
    pub capabilities: SchemaCapabilities,
    /// Lookup behavior settings.
    pub lookup: Arc<LookupConfig>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
