//! Stored Upload Serving
//!
//! Serves the storage root under the web asset root so returned URLs resolve
//! against this process. Deployments fronted by another web server can turn
//! this off with `SERVE_ASSETS=false`.

use axum::Router;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::config::UploadConfig;

/// Router for `<asset root>/*`, or an empty router when serving is disabled.
pub fn router(upload: &UploadConfig) -> Router {
    if !upload.serve_assets {
        return Router::new();
    }
    if upload.asset_root_web.is_empty() {
        warn!("ASSET_ROOT_WEB is empty, not serving stored uploads");
        return Router::new();
    }

    info!(
        path = %upload.asset_root_web,
        dir = %upload.storage_root.display(),
        "Serving stored uploads"
    );
    Router::new().nest_service(&upload.asset_root_web, ServeDir::new(&upload.storage_root))
}
