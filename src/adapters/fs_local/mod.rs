// Local filesystem adapter

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::ports::FsPort;

/// Filesystem adapter backed by `tokio::fs`
#[derive(Debug, Clone, Default)]
pub struct FsLocalAdapter;

impl FsLocalAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FsPort for FsLocalAdapter {
    async fn current_dir(&self) -> std::io::Result<PathBuf> {
        std::env::current_dir()
    }

    async fn is_regular_file(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }

    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }
}
