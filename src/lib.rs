// ezdrop - drag-and-drop image hosting with metadata stripping

pub mod config;
pub mod models;
pub mod routes;
pub mod sanitizer;
pub mod storage;
pub mod types;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
