//! Blob storage for uploaded photos.
//!
//! The API only needs two things from storage: put bytes under a name and get
//! back a public URL, and forget a URL again. [`LocalBlobStore`] keeps files
//! in a directory that the HTTP layer serves under `/uploads`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::CoreError;

/// URL prefix under which the local upload directory is served.
pub const DEFAULT_PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Invalid blob filename: {0}")]
    InvalidFilename(String),

    #[error("Blob URL is not managed by this store: {0}")]
    ForeignUrl(String),

    #[error("Blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BlobError> for CoreError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::InvalidFilename(_) => CoreError::Validation(err.to_string()),
            other => CoreError::Internal(other.to_string()),
        }
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` as `filename` and return its public URL.
    async fn store(&self, bytes: Vec<u8>, filename: &str) -> Result<String, BlobError>;

    /// Delete the blob behind `url`. Missing blobs are not an error.
    async fn remove(&self, url: &str) -> Result<(), BlobError>;
}

/// Filesystem-backed store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_prefix: DEFAULT_PUBLIC_PREFIX.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, filename: &str) -> Result<PathBuf, BlobError> {
        validate_filename(filename)?;
        Ok(self.root.join(filename))
    }

    fn filename_from_url<'a>(&self, url: &'a str) -> Result<&'a str, BlobError> {
        url.strip_prefix(self.public_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| BlobError::ForeignUrl(url.to_string()))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, bytes: Vec<u8>, filename: &str) -> Result<String, BlobError> {
        let path = self.path_for(filename)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, &bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored blob");
        Ok(format!("{}/{filename}", self.public_prefix))
    }

    async fn remove(&self, url: &str) -> Result<(), BlobError> {
        let filename = self.filename_from_url(url)?;
        let path = self.path_for(filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Blob already missing");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A stored filename is a single path component.
fn validate_filename(filename: &str) -> Result<(), BlobError> {
    let bad = filename.is_empty()
        || filename.starts_with('.')
        || filename.contains(['/', '\\'])
        || filename.contains("..");
    if bad {
        return Err(BlobError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::photo_filename;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn store_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("uploads"));

        let url = store.store(vec![1, 2, 3], "photo-1-0.jpg").await.unwrap();
        assert_eq!(url, "/uploads/photo-1-0.jpg");
        let on_disk = store.root().join("photo-1-0.jpg");
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), vec![1, 2, 3]);

        store.remove(&url).await.unwrap();
        assert!(!on_disk.exists());

        // Removing twice is fine.
        store.remove(&url).await.unwrap();
    }

    #[tokio::test]
    async fn same_instant_uploads_keep_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let now = chrono::Utc::now();

        let url_a = store.store(vec![0xAA], &photo_filename(now, 0)).await.unwrap();
        let url_b = store.store(vec![0xBB], &photo_filename(now, 0)).await.unwrap();
        assert_ne!(url_a, url_b);

        let name_a = url_a.trim_start_matches("/uploads/");
        assert_eq!(tokio::fs::read(store.root().join(name_a)).await.unwrap(), vec![0xAA]);
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        assert_matches!(
            store.store(vec![0], "../escape.jpg").await,
            Err(BlobError::InvalidFilename(_))
        );
        assert_matches!(
            store.remove("/uploads/../secret").await,
            Err(BlobError::InvalidFilename(_))
        );
    }

    #[tokio::test]
    async fn foreign_urls_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        assert_matches!(
            store.remove("https://cdn.example.com/a.jpg").await,
            Err(BlobError::ForeignUrl(_))
        );
    }

    #[test]
    fn invalid_filename_maps_to_validation() {
        let err: CoreError = BlobError::InvalidFilename("x/y".into()).into();
        assert_matches!(err, CoreError::Validation(_));
    }
}
