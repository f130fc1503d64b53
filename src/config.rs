use anyhow::{bail, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Extensions accepted when `ALLOWED_EXTENSIONS` is not set.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Public base URL, without a trailing slash.
    pub base_url: String,
    /// URL path prefix uploads are served under, e.g. `/ezassets`.
    pub asset_root_web: String,
    /// Filesystem directory uploads are written into.
    pub storage_root: PathBuf,
    pub token: String,
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: usize,
    /// When false, webp uploads are stored as received instead of re-encoded.
    pub webp_reencode: bool,
    pub serve_assets: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let token = env::var("UPLOAD_TOKEN").unwrap_or_default();
        if token.trim().is_empty() {
            bail!("UPLOAD_TOKEN must be set to a non-empty value");
        }

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            upload: UploadConfig {
                base_url: normalize_base_url(
                    &env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
                ),
                asset_root_web: normalize_web_root(
                    &env::var("ASSET_ROOT_WEB").unwrap_or_else(|_| "/ezassets".to_string()),
                ),
                storage_root: env::var("STORAGE_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./ezassets")),
                token,
                allowed_extensions: env::var("ALLOWED_EXTENSIONS")
                    .map(|list| parse_extensions(&list))
                    .unwrap_or_else(|_| default_extensions()),
                max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                    .unwrap_or_else(|_| "20971520".to_string())
                    .parse()?,
                webp_reencode: env::var("WEBP_REENCODE")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
                serve_assets: env::var("SERVE_ASSETS")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
            },
        })
    }
}

impl Config {
    /// Config with the default listener, for embedding and tests.
    pub fn with_upload(upload: UploadConfig) -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "0.0.0.0".to_string(),
            },
            upload,
        }
    }
}

impl UploadConfig {
    /// Upload settings with defaults for everything but the storage root and token.
    pub fn new(storage_root: impl Into<PathBuf>, token: impl Into<String>) -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            asset_root_web: "/ezassets".to_string(),
            storage_root: storage_root.into(),
            token: token.into(),
            allowed_extensions: default_extensions(),
            max_upload_bytes: 20 * 1024 * 1024,
            webp_reencode: true,
            serve_assets: true,
        }
    }

    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        self.allowed_extensions.iter().any(|allowed| allowed == ext)
    }
}

fn default_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Collapses the prefix to exactly one leading slash and no trailing slash.
fn normalize_web_root(root: &str) -> String {
    let trimmed = root.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extensions() {
        assert_eq!(parse_extensions("JPG, .png,,gif "), vec!["jpg", "png", "gif"]);
        assert!(parse_extensions(" , ").is_empty());
    }

    #[test]
    fn test_normalize_web_root() {
        assert_eq!(normalize_web_root("ezassets"), "/ezassets");
        assert_eq!(normalize_web_root("/ezassets/"), "/ezassets");
        assert_eq!(normalize_web_root("//media//"), "/media");
        assert_eq!(normalize_web_root("/"), "");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://file.example.com/"), "https://file.example.com");
        assert_eq!(normalize_base_url(" https://file.example.com "), "https://file.example.com");
    }

    #[test]
    fn test_default_allow_list() {
        let config = UploadConfig::new("/tmp/ezdrop", "secret");
        for ext in ["jpg", "jpeg", "png", "gif", "webp"] {
            assert!(config.is_allowed_extension(ext));
        }
        assert!(!config.is_allowed_extension("bmp"));
        assert!(!config.is_allowed_extension("PNG"));
    }
}
