// Local filesystem storage for sanitized uploads

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{info, warn};

use crate::utils::crypto::random_hex_name;

/// Fresh names drawn before giving up when a generated name already exists.
const MAX_NAME_ATTEMPTS: usize = 3;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no free file name after {0} attempts")]
    NameCollision(usize),
}

/// A file written by [`LocalStorage::write_new`].
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
}

/// Uploads live at `<root>/<folder>/<16 hex chars>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create `<root>/<folder>` (and the root) if missing.
    ///
    /// Safe to race: a directory that already exists is not an error.
    pub async fn ensure_folder(&self, folder: &str) -> Result<PathBuf, StorageError> {
        let path = self.root.join(folder);
        fs::create_dir_all(&path).await?;
        Ok(path)
    }

    /// Write `data` under a newly generated name in `folder_path`.
    ///
    /// Files are opened create-new, so an existing upload is never replaced;
    /// on a name clash another name is drawn.
    pub async fn write_new(
        &self,
        folder_path: &Path,
        ext: &str,
        data: &[u8],
    ) -> Result<StoredFile, StorageError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = format!("{}.{}", random_hex_name(), ext);
            let path = folder_path.join(&filename);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    warn!(path = %path.display(), "Generated file name already taken");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = write_all(&mut file, data).await {
                drop(file);
                let _ = fs::remove_file(&path).await;
                return Err(e.into());
            }

            info!(path = %path.display(), bytes = data.len(), "Stored upload");
            return Ok(StoredFile { filename, path });
        }

        Err(StorageError::NameCollision(MAX_NAME_ATTEMPTS))
    }

    /// Whether the root exists or can be created.
    pub async fn is_available(&self) -> bool {
        fs::create_dir_all(&self.root).await.is_ok()
    }
}

async fn write_all(file: &mut fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ensure_folder_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("nested/root"));

        let first = storage.ensure_folder("team-a").await.unwrap();
        let second = storage.ensure_folder("team-a").await.unwrap();

        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_folder_concurrent() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let (a, b) = tokio::join!(storage.ensure_folder("race"), storage.ensure_folder("race"));
        assert!(a.is_ok() && b.is_ok());
    }

    #[tokio::test]
    async fn test_write_new() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let folder = storage.ensure_folder("default").await.unwrap();

        let stored = storage.write_new(&folder, "png", b"pixels").await.unwrap();

        let (stem, ext) = stored.filename.split_once('.').unwrap();
        assert_eq!(stem.len(), 16);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(ext, "png");
        assert_eq!(stored.path, folder.join(&stored.filename));
        assert_eq!(fs::read(&stored.path).await.unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn test_write_new_distinct_names() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let folder = storage.ensure_folder("default").await.unwrap();

        let a = storage.write_new(&folder, "gif", b"a").await.unwrap();
        let b = storage.write_new(&folder, "gif", b"b").await.unwrap();
        assert_ne!(a.filename, b.filename);
    }

    #[tokio::test]
    async fn test_ensure_folder_fails_under_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("root");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let storage = LocalStorage::new(&blocker);
        assert!(storage.ensure_folder("x").await.is_err());
        assert!(!storage.is_available().await);
    }
}
