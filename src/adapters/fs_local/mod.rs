// Local filesystem adapter - Scratch directories and output folders

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::*;
use crate::ports::*;

/// Prefix for every fetch scratch directory
pub const SCRATCH_PREFIX: &str = "clipgrab_";

/// Filesystem adapter over `tokio::fs`
#[derive(Debug, Clone, Default)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FsPort for LocalFsAdapter {
    async fn create_scratch_dir(&self, root: Option<&Path>) -> Result<PathBuf, DomainError> {
        let root = root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create scratch root {}: {}",
                root.display(),
                e
            ))
        })?;

        // Persisted on purpose: the downloaded file must outlive this call
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&root)
            .map_err(|e| DomainError::FsFail(format!("Failed to create scratch directory: {}", e)))?
            .keep();
        debug!(dir = %dir.display(), "Created scratch directory");
        Ok(dir)
    }

    async fn create_dir_all(&self, dir: &Path) -> Result<(), DomainError> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })
    }

    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
        let read_err = |e: std::io::Error| {
            DomainError::FsFail(format!("Failed to read directory {}: {}", dir.display(), e))
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let is_file = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_file())
                .unwrap_or(false);
            if is_file {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    async fn remove_dir_all(&self, dir: &Path) -> Result<(), DomainError> {
        tokio::fs::remove_dir_all(dir).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to delete directory {}: {}",
                dir.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scratch_dirs_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let fs = LocalFsAdapter::new();

        let first = fs.create_scratch_dir(Some(root.path())).await.unwrap();
        let second = fs.create_scratch_dir(Some(root.path())).await.unwrap();

        assert_ne!(first, second);
        assert!(first.is_dir());
        assert!(first
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(SCRATCH_PREFIX));
    }

    #[tokio::test]
    async fn test_create_dir_all_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let fs = LocalFsAdapter::new();
        let nested = root.path().join("a").join("b");

        fs.create_dir_all(&nested).await.unwrap();
        fs.create_dir_all(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_list_files_skips_directories() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("video.mp4"), b"x").unwrap();
        std::fs::create_dir(root.path().join("sub")).unwrap();
        let fs = LocalFsAdapter::new();

        let files = fs.list_files(root.path()).await.unwrap();
        assert_eq!(files, vec![root.path().join("video.mp4")]);
    }
}
