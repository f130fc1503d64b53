//! Upload endpoint
//!
//! `POST /` takes a multipart form with `file`, `folder` and `token`. Folder
//! and token fall back to the query string for links made before the page
//! posted them in the form body.

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::QueryRejection,
        DefaultBodyLimit, Multipart, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, info, warn};

use crate::models::{AppState, PageQuery, UploadResponse};
use crate::routes::ui;
use crate::sanitizer::{self, ImageCodec};
use crate::storage::public_url;
use crate::types::{AppError, AppResult};
use crate::utils::crypto::verify_token;
use crate::validation::{extension_of, sanitize_folder, DEFAULT_FOLDER};

const INVALID_FOLDER: &str = "Invalid folder name.";
const INVALID_TOKEN: &str = "Invalid or missing token.";
const NO_FILE: &str = "No file uploaded.";
const INVALID_UPLOAD: &str = "Invalid upload.";
const TOO_LARGE: &str = "File exceeds the maximum upload size.";
const FOLDER_FAILED: &str = "Failed to create upload folder.";
const SAVE_FAILED: &str = "Failed to save file.";

/// `GET /` renders the page, `POST /` takes uploads up to the configured size.
pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config.upload.max_upload_bytes;
    Router::new()
        .route("/", get(ui::index).post(upload_file))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[derive(Debug, Default)]
struct UploadForm {
    folder: Option<String>,
    token: Option<String>,
    file: Option<UploadedFile>,
}

#[derive(Debug)]
struct UploadedFile {
    filename: String,
    data: Bytes,
}

/// POST / - validate, sanitize and store one image
pub async fn upload_file(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let Query(query) = query.map_err(|e| {
        warn!(error = %e, "Rejected upload with malformed query string");
        AppError::validation(INVALID_UPLOAD)
    })?;
    let multipart = multipart.map_err(|e| {
        warn!(error = %e, "Rejected non-multipart upload");
        AppError::validation(INVALID_UPLOAD)
    })?;
    let form = read_form(multipart).await?;
    let config = &state.config.upload;

    let folder = resolve_folder(form.folder.as_deref(), query.folder.as_deref())?;

    let token = form
        .token
        .filter(|t| !t.is_empty())
        .or(query.token)
        .unwrap_or_default();
    if !verify_token(&config.token, &token) {
        warn!(folder = %folder, "Upload rejected: invalid or missing token");
        return Err(AppError::auth(INVALID_TOKEN));
    }

    let file = form
        .file
        .filter(|f| !f.filename.is_empty())
        .ok_or_else(|| AppError::validation(NO_FILE))?;

    let ext = extension_of(&file.filename)
        .filter(|ext| config.is_allowed_extension(ext))
        .ok_or_else(|| {
            AppError::validation(format!(
                "Unsupported file type. Allowed: {}",
                config.allowed_extensions.join(", ")
            ))
        })?;

    let folder_path = state.storage.ensure_folder(&folder).await.map_err(|e| {
        error!(error = %e, folder = %folder, "Failed to create upload folder");
        AppError::storage(FOLDER_FAILED)
    })?;

    let codec = ImageCodec::for_extension(&ext, config.webp_reencode);
    let received = file.data.len();
    let cleaned = sanitizer::sanitize(codec, file.data).await.map_err(|e| {
        error!(error = %e, %codec, original = %file.filename, "Failed to sanitize upload");
        AppError::storage(SAVE_FAILED)
    })?;

    let stored = state
        .storage
        .write_new(&folder_path, &ext, &cleaned)
        .await
        .map_err(|e| {
            error!(error = %e, folder = %folder, "Failed to write upload");
            AppError::storage(SAVE_FAILED)
        })?;

    let url = public_url(config, &folder, &stored.filename);
    info!(
        folder = %folder,
        filename = %stored.filename,
        received,
        stored = cleaned.len(),
        "Upload complete"
    );

    Ok(Json(UploadResponse::from_url(url)))
}

/// Drain the multipart stream. Unknown fields are skipped.
async fn read_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "folder" => form.folder = Some(field.text().await.map_err(multipart_error)?),
            "token" => form.token = Some(field.text().await.map_err(multipart_error)?),
            "file" => {
                if form.file.is_some() {
                    warn!("Rejected upload carrying more than one file");
                    return Err(AppError::validation(INVALID_UPLOAD));
                }
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                form.file = Some(UploadedFile { filename, data });
            }
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> AppError {
    warn!(error = %e, "Malformed multipart upload");
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::validation(TOO_LARGE)
    } else {
        AppError::validation(INVALID_UPLOAD)
    }
}

/// A non-empty form folder wins; otherwise the query folder, then the default.
///
/// The query folder must be valid even when the form folder overrides it.
fn resolve_folder(form_folder: Option<&str>, query_folder: Option<&str>) -> AppResult<String> {
    let query_folder = sanitize_folder(query_folder.unwrap_or(DEFAULT_FOLDER))
        .ok_or_else(|| AppError::validation(INVALID_FOLDER))?;
    match form_folder {
        Some(f) if !f.is_empty() => {
            sanitize_folder(f).ok_or_else(|| AppError::validation(INVALID_FOLDER))
        }
        _ => Ok(query_folder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_folder_prefers_form() {
        assert_eq!(resolve_folder(Some("team-a"), Some("other")).unwrap(), "team-a");
        assert_eq!(resolve_folder(Some(""), Some("other")).unwrap(), "other");
        assert_eq!(resolve_folder(None, None).unwrap(), "default");
        assert_eq!(resolve_folder(Some("  "), None).unwrap(), "default");
    }

    #[test]
    fn test_resolve_folder_rejects_invalid() {
        let err = resolve_folder(Some("../etc"), None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid folder name.");
        assert!(resolve_folder(None, Some("a/b")).is_err());
    }

    #[test]
    fn test_resolve_folder_checks_query_even_when_overridden() {
        let err = resolve_folder(Some("good"), Some("../etc")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid folder name.");
    }
}
