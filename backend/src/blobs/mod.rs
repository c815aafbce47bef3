//! Filesystem blob storage for cover images.
//!
//! Images land in `<root>/images/<millis>-<filename>` and are served back under
//! the configured media URL.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;

use crate::editor::ImageStore;
use crate::errors::AppError;

/// Sub-directory that cover images are written to.
const IMAGE_DIR: &str = "images";

/// Local directory acting as the blob store.
pub struct BlobStore {
    root: PathBuf,
    public_url: String,
}

impl BlobStore {
    /// Open the store, creating the image directory if needed.
    pub fn open(root: &Path, public_url: &str) -> Result<Self, AppError> {
        std::fs::create_dir_all(root.join(IMAGE_DIR)).map_err(|e| {
            AppError::Storage(format!("Failed to create media directory: {}", e))
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }

    /// Store the bytes under a time-derived key and return the public URL.
    pub async fn upload(&self, filename: &str, bytes: &[u8]) -> Result<String, AppError> {
        let name = sanitize_filename(filename)
            .ok_or_else(|| AppError::Validation("Image filename is required".to_string()))?;
        let key = format!("{}-{}", Utc::now().timestamp_millis(), name);

        tokio::fs::write(self.root.join(IMAGE_DIR).join(&key), bytes).await?;
        tracing::info!("Stored cover image {} ({} bytes)", key, bytes.len());

        Ok(format!("{}/{}/{}", self.public_url, IMAGE_DIR, key))
    }

    /// Delete an upload given the URL `upload` returned for it.
    pub async fn discard(&self, url: &str) -> Result<(), AppError> {
        let prefix = format!("{}/{}/", self.public_url, IMAGE_DIR);
        let key = url
            .strip_prefix(&prefix)
            .filter(|key| sanitize_filename(key).as_deref() == Some(*key))
            .ok_or_else(|| AppError::Validation(format!("Not a stored image: {}", url)))?;

        tokio::fs::remove_file(self.root.join(IMAGE_DIR).join(key)).await?;
        tracing::info!("Discarded cover image {}", key);
        Ok(())
    }
}

#[async_trait]
impl ImageStore for BlobStore {
    fn check_filename(&self, filename: &str) -> Result<(), AppError> {
        sanitize_filename(filename)
            .map(|_| ())
            .ok_or_else(|| AppError::Validation("Image filename is required".to_string()))
    }

    async fn upload(&self, filename: &str, bytes: &[u8]) -> Result<String, AppError> {
        BlobStore::upload(self, filename, bytes).await
    }

    async fn discard(&self, url: &str) -> Result<(), AppError> {
        BlobStore::discard(self, url).await
    }
}

/// Keep only the final path component and replace characters that are unsafe in URLs.
fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
