//! Image file storage
//!
//! Stores uploaded images flat under a single directory. Each file gets a
//! collision-resistant name, which is also the reference kept on the book
//! row. Deletion is best-effort and never fails the caller.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const MAX_EXTENSION_LEN: usize = 8;

/// Local filesystem store for book images
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    public_path: String,
}

impl FileStore {
    /// Create a store writing under `root`, served under `public_path`
    pub fn new<P: AsRef<Path>>(root: P, public_path: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            public_path: public_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` under a fresh name and return its reference.
    pub async fn save(&self, content: &[u8], original_name: &str) -> AppResult<String> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::File(format!("Failed to create {}: {}", self.root.display(), e))
        })?;

        let reference = unique_name(original_name);
        let path = self.root.join(&reference);

        fs::write(&path, content)
            .await
            .map_err(|e| AppError::File(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::debug!("Stored image {} ({} bytes)", reference, content.len());
        Ok(reference)
    }

    /// Remove the file behind `reference`. A missing file is fine; any other
    /// failure is logged and swallowed.
    pub async fn delete(&self, reference: &str) {
        let Some(path) = self.resolve(reference) else {
            tracing::warn!("Refusing to delete image outside store: {:?}", reference);
            return;
        };

        match fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("Deleted image {}", reference),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Error deleting image file {}: {}", path.display(), e),
        }
    }

    /// URL path under which `reference` is served
    pub fn public_path(&self, reference: &str) -> String {
        format!("{}/{}", self.public_path, reference)
    }

    /// Map a reference to a path inside the root. References produced by
    /// `save` are plain file names.
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let invalid = reference.is_empty()
            || reference == "."
            || reference == ".."
            || reference.contains(['/', '\\']);
        if invalid {
            return None;
        }
        Some(self.root.join(reference))
    }
}

/// `<unix-seconds>_<uuid><.ext>`, keeping the original extension when it is
/// short and alphanumeric.
fn unique_name(original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{}_{}{}", Utc::now().timestamp(), Uuid::new_v4(), extension)
}
