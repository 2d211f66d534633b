//! Transient file storage for application attachments.
//!
//! Files live on disk only between upload and mail dispatch.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::errors::AppError;

/// Maximum accepted resume size.
pub const MAX_RESUME_BYTES: usize = 2 * 1024 * 1024;

/// The only accepted resume content type.
pub const RESUME_CONTENT_TYPE: &str = "application/pdf";

/// A file written to the upload directory.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: PathBuf,
    pub original_name: String,
}

pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open the upload directory, creating it if needed.
    pub async fn open(dir: &Path) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create upload directory: {}", e)))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an upload as `<millis>-<sanitized name>`.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, AppError> {
        let original_name = sanitize_filename(original_name);
        let path = self.dir.join(format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            original_name
        ));

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        Ok(StoredFile {
            path,
            original_name,
        })
    }

    pub async fn read(&self, file: &StoredFile) -> Result<Vec<u8>, AppError> {
        tokio::fs::read(&file.path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read {}: {}", file.path.display(), e)))
    }

    pub async fn remove(&self, file: &StoredFile) -> Result<(), AppError> {
        tokio::fs::remove_file(&file.path).await.map_err(|e| {
            AppError::Storage(format!("Failed to remove {}: {}", file.path.display(), e))
        })
    }
}

/// Reduce a client-supplied file name to a safe single path component.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
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
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}
