//! HTTP Routes
//!
//! - `GET /` - Upload page, pre-filled from the query string
//! - `POST /` - Multipart image upload
//! - `GET /api/health` - Health check
//! - `<asset root>/...` - Stored uploads (when enabled)

pub mod health;
pub mod static_files;
pub mod ui;
pub mod upload;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(upload::router(state.clone()))
        .merge(health::router(state.clone()))
        .merge(static_files::router(&state.config.upload))
        .layer(TraceLayer::new_for_http())
}
