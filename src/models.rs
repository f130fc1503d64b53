use std::sync::Arc;

use crate::config::Config;
use crate::storage::LocalStorage;
use crate::utils::html::escape_html;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: LocalStorage,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let storage = LocalStorage::new(config.upload.storage_root.clone());
        Self {
            config: Arc::new(config),
            storage,
        }
    }
}

/// Query parameters accepted by `GET /` and, as a fallback, by `POST /`.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct PageQuery {
    pub folder: Option<String>,
    pub token: Option<String>,
}

/// Body returned for a stored upload.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub html: String,
    pub markdown: String,
}

impl UploadResponse {
    /// Builds the three paste-ready representations of a public URL.
    pub fn from_url(url: String) -> Self {
        let html = format!(r#"<img src="{}" width="80%">"#, escape_html(&url));
        let markdown = format!("![]({})", url);
        Self {
            success: true,
            url,
            html,
            markdown,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub storage: String,
}
