//! Preview audio retrieval
//!
//! Fetch failures are reported to the caller, which logs them; they never
//! affect persistence.

use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Asset fetch failures
#[derive(Debug, Error)]
pub enum AssetFetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0} for {1}")]
    Status(u16, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the bytes behind a URL to a local path
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Returns the number of bytes written
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, AssetFetchError>;
}

/// HTTP implementation of [`AssetFetcher`]
pub struct HttpAssetFetcher {
    http_client: Client,
}

impl HttpAssetFetcher {
    pub fn new(user_agent: &str) -> Result<Self, AssetFetchError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AssetFetchError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, AssetFetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AssetFetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetFetchError::Status(status.as_u16(), url.to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AssetFetchError::Network(e.to_string()))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Final name appears only once the whole body is on disk
        let partial = dest.with_extension("part");
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, dest).await?;

        tracing::debug!(url = %url, dest = %dest.display(), bytes = bytes.len(), "Fetched asset");

        Ok(bytes.len() as u64)
    }
}

/// Folder name for one genre's previews in one week: `week_<NN>_<genre-slug>`
pub fn preview_folder_name(week_nb: u32, genre: &str) -> String {
    format!("week_{:02}_{}", week_nb, slugify(genre))
}

/// File name for one preview: `<rank> - <artists> - <track>.mp3`
pub fn preview_file_name(rank: usize, artists: &str, track_name: &str) -> String {
    format!(
        "{:02} - {} - {}.mp3",
        rank,
        sanitize_component(artists),
        sanitize_component(track_name)
    )
}

/// Lower-case alphanumeric words joined by '-'
fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Replace characters not allowed in file names on common platforms
fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
