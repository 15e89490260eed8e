//! Asset fetcher writing fixed bytes, with per-URL failure injection

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use wmf_finder::services::{AssetFetchError, AssetFetcher};

pub const PREVIEW_BYTES: &[u8] = b"ID3fake-preview";

#[derive(Default)]
pub struct MockFetcher {
    failing_urls: HashSet<String>,
    written: Mutex<Vec<PathBuf>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_url(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    /// Destinations written so far, in call order
    pub fn written(&self) -> Vec<PathBuf> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetFetcher for MockFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, AssetFetchError> {
        if self.failing_urls.contains(url) {
            return Err(AssetFetchError::Status(404, url.to_string()));
        }
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, PREVIEW_BYTES).await?;
        self.written.lock().unwrap().push(dest.to_path_buf());
        Ok(PREVIEW_BYTES.len() as u64)
    }
}
