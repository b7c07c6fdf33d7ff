//! Post image uploads.

use std::sync::Arc;

use yatube_common::{AppError, AppResult, StorageBackend, generate_storage_key};

/// Message for uploads that are not a decodable image.
pub const INVALID_IMAGE_MESSAGE: &str =
    "Загрузите правильное изображение. Файл, который вы загрузили, поврежден или не является изображением.";

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Image formats accepted for posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl ImageKind {
    /// Detect the format from the file contents.
    #[must_use]
    pub fn detect(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    /// MIME type for this format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }

    /// Canonical file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
        }
    }
}

/// Fully decode an image off the async runtime.
async fn decode(data: Vec<u8>) -> AppResult<()> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&data).map(drop))
        .await
        .map_err(|e| AppError::Internal(format!("Image decoding task failed: {e}")))?
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected undecodable image");
            AppError::Validation(INVALID_IMAGE_MESSAGE.to_string())
        })
}

/// Validates and stores uploaded post images.
#[derive(Clone)]
pub struct ImageService {
    storage: Arc<dyn StorageBackend>,
}

impl ImageService {
    /// Create a new image service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// The underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    /// Check an upload and store it under `posts/`, returning its storage key.
    ///
    /// The bytes must decode as one of the accepted formats; the declared
    /// content type and file name are not trusted.
    pub async fn store_post_image(&self, data: &[u8]) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::Validation("Отправленный файл пуст.".to_string()));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::Validation("Файл слишком большой.".to_string()));
        }

        let kind = ImageKind::detect(data).ok_or_else(|| {
            AppError::Validation(INVALID_IMAGE_MESSAGE.to_string())
        })?;

        decode(data.to_vec()).await?;

        let key = generate_storage_key(&format!("upload.{}", kind.extension()));
        self.storage.upload(&key, data, kind.mime_type()).await?;
        Ok(key)
    }

    /// Public URL for a stored image key.
    #[must_use]
    pub fn url(&self, key: &str) -> String {
        self.storage.public_url(key)
    }
}
