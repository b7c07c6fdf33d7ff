//! File storage for uploaded post images.

use std::path::{Component, Path, PathBuf};

use crate::{AppError, AppResult, config::StorageSettings};

/// Directory (key prefix) post images are uploaded to.
pub const POST_IMAGE_PREFIX: &str = "posts";

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a file under `key`, replacing any previous contents.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<()>;

    /// Read a file back. Returns `None` when the key does not exist.
    async fn read(&self, key: &str) -> AppResult<Option<Vec<u8>>>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Create a local storage backend from configuration.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.media_root.clone(), settings.media_url.clone())
    }

    /// Resolve a key below the base path, refusing anything that escapes it.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(AppError::BadRequest(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<()> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        tracing::debug!(key = %key, size = data.len(), content_type, "Stored uploaded file");
        Ok(())
    }

    async fn read(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read file: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Generate a unique storage key for an uploaded post image.
///
/// Keys look like `posts/<uuid>.<ext>`; the extension comes from the original
/// file name and falls back to `bin`.
#[must_use]
pub fn generate_storage_key(original_name: &str) -> String {
    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "bin".to_string(), str::to_ascii_lowercase);

    format!(
        "{POST_IMAGE_PREFIX}/{}.{extension}",
        uuid::Uuid::new_v4().simple()
    )
}
