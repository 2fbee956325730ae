use std::path::{Path, PathBuf};

use axum::body::Bytes;
use uuid::Uuid;

/// URL prefix uploaded files are served under
pub const PUBLIC_PREFIX: &str = "uploads";

/// Multipart field that carries the cover image
pub const FILE_FIELD: &str = "file";

/// A file received from the client, not yet on disk
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Failed to store uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes cover images to the uploads directory
#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `file` under a generated staging name, then rename it to carry
    /// the original extension. Returns the public cover path.
    pub async fn store(&self, file: &UploadedFile) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let staging_name = Uuid::new_v4().simple().to_string();
        let staging_path = self.dir.join(&staging_name);
        if let Err(e) = tokio::fs::write(&staging_path, &file.bytes).await {
            let _ = tokio::fs::remove_file(&staging_path).await;
            return Err(e.into());
        }

        let stored_name = match extension_of(&file.file_name) {
            Some(ext) => {
                let name = format!("{}.{}", staging_name, ext);
                if let Err(e) = tokio::fs::rename(&staging_path, self.dir.join(&name)).await {
                    let _ = tokio::fs::remove_file(&staging_path).await;
                    return Err(e.into());
                }
                name
            }
            None => staging_name,
        };

        tracing::debug!(
            "Stored upload '{}' ({} bytes) as {}",
            file.file_name,
            file.bytes.len(),
            stored_name
        );

        Ok(format!("{}/{}", PUBLIC_PREFIX, stored_name))
    }

    /// Delete a file previously returned by `store`. Failures are logged only.
    pub async fn remove(&self, cover: &str) {
        let Some(name) = cover
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
        else {
            tracing::warn!("Refusing to remove unexpected cover path '{}'", cover);
            return;
        };

        if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
            tracing::warn!("Failed to remove orphaned upload {}: {}", name, e);
        }
    }
}

/// Extension of a client-supplied filename, if it has a usable one
pub fn extension_of(file_name: &str) -> Option<&str> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}
