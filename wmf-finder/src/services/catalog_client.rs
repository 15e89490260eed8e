//! Catalog API client
//!
//! `CatalogClient` is the seam between the ranking pipeline and the remote
//! catalog. It is a thin accessor: no caching, no retries, no policy. The
//! pipeline awaits each call before issuing the next, so the production
//! client is strictly sequential.
//!
//! `SpotifyCatalogClient` talks to the Spotify Web API with a pre-obtained
//! bearer token. Requests are paced client-side by a `governor` rate limiter.

use crate::models::{
    Album, ArtistProfile, ArtistRef, FeaturedPlaylist, TrackDetail, TrackStub,
};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use wmf_common::time::parse_release_date;

/// Page size for album track listings (API maximum)
const ALBUM_TRACKS_PAGE: u32 = 50;

/// Catalog failures; any of them means the catalog was unavailable for that call
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Access token rejected")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

/// Read-only catalog queries used by the ranking pipeline
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// One page of new releases for `market`
    async fn list_new_releases(
        &self,
        market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Album>, CatalogError>;

    /// Artist metadata including the artist's genres
    async fn get_artist(&self, artist_id: &str) -> Result<ArtistProfile, CatalogError>;

    /// Every track of an album, in album order
    async fn list_album_tracks(
        &self,
        album_id: &str,
        market: &str,
    ) -> Result<Vec<TrackStub>, CatalogError>;

    /// Full metadata for one track
    async fn get_track(&self, track_id: &str) -> Result<TrackDetail, CatalogError>;

    /// Editorially featured playlists
    async fn featured_playlists(&self, limit: u32) -> Result<Vec<FeaturedPlaylist>, CatalogError>;
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct NewReleasesResponse {
    albums: Page<WireAlbum>,
}

#[derive(Debug, Deserialize)]
struct FeaturedPlaylistsResponse {
    playlists: Page<Option<WirePlaylist>>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireArtistRef {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireAlbum {
    id: String,
    name: String,
    release_date: String,
    #[serde(default)]
    artists: Vec<WireArtistRef>,
}

#[derive(Debug, Deserialize)]
struct WireFollowers {
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WireExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireArtist {
    id: String,
    name: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    followers: Option<WireFollowers>,
    #[serde(default)]
    popularity: u32,
    #[serde(default)]
    external_urls: Option<WireExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct WireTrack {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<WireArtistRef>,
    #[serde(default)]
    popularity: Option<u32>,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    duration_ms: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireOwner {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTrackCount {
    #[serde(default)]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct WirePlaylist {
    name: String,
    #[serde(default)]
    description: Option<String>,
    owner: WireOwner,
    #[serde(default)]
    external_urls: Option<WireExternalUrls>,
    tracks: WireTrackCount,
}

impl From<WireArtistRef> for ArtistRef {
    fn from(wire: WireArtistRef) -> Self {
        ArtistRef {
            id: wire.id,
            name: wire.name,
        }
    }
}

impl From<WireTrack> for TrackStub {
    fn from(wire: WireTrack) -> Self {
        TrackStub {
            id: wire.id,
            name: wire.name,
            artists: wire.artists.into_iter().map(ArtistRef::from).collect(),
            popularity: wire.popularity.unwrap_or(0),
            preview_url: wire.preview_url,
            duration_ms: wire.duration_ms,
        }
    }
}

// ============================================================================
// Spotify client
// ============================================================================

/// Spotify Web API client
pub struct SpotifyCatalogClient {
    http_client: Client,
    base_url: String,
    access_token: String,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl SpotifyCatalogClient {
    /// Create a client for `base_url` (e.g. `https://api.spotify.com/v1`)
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        requests_per_second: u32,
        user_agent: &str,
    ) -> Result<Self, CatalogError> {
        let per_second = NonZeroU32::new(requests_per_second).ok_or_else(|| {
            CatalogError::InvalidConfig("requests_per_second must be at least 1".to_string())
        })?;

        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Rate-limited authenticated GET decoded as JSON
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        self.rate_limiter.until_ready().await;

        let url = self.url(path);
        tracing::debug!(url = %url, "Querying catalog API");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Unauthorized);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(CatalogError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CatalogClient for SpotifyCatalogClient {
    async fn list_new_releases(
        &self,
        market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Album>, CatalogError> {
        let response: NewReleasesResponse = self
            .get_json(
                "browse/new-releases",
                &[
                    ("country", market.to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        let mut albums = Vec::with_capacity(response.albums.items.len());
        for wire in response.albums.items {
            let Some(release_date) = parse_release_date(&wire.release_date) else {
                tracing::warn!(
                    album_id = %wire.id,
                    release_date = %wire.release_date,
                    "Skipping album with unparseable release date"
                );
                continue;
            };
            albums.push(Album {
                id: wire.id,
                name: wire.name,
                release_date,
                artists: wire.artists.into_iter().map(ArtistRef::from).collect(),
            });
        }

        tracing::info!(
            market = %market,
            offset = offset,
            albums = albums.len(),
            "Retrieved new releases"
        );

        Ok(albums)
    }

    async fn get_artist(&self, artist_id: &str) -> Result<ArtistProfile, CatalogError> {
        let wire: WireArtist = self.get_json(&format!("artists/{}", artist_id), &[]).await?;

        tracing::debug!(
            artist_id = %wire.id,
            name = %wire.name,
            genres = wire.genres.len(),
            "Retrieved artist"
        );

        Ok(ArtistProfile {
            id: wire.id,
            name: wire.name,
            genres: wire.genres,
            followers: wire.followers.and_then(|f| f.total).unwrap_or(0),
            popularity: wire.popularity,
            url: wire.external_urls.and_then(|u| u.spotify),
        })
    }

    async fn list_album_tracks(
        &self,
        album_id: &str,
        market: &str,
    ) -> Result<Vec<TrackStub>, CatalogError> {
        let path = format!("albums/{}/tracks", album_id);
        let mut tracks = Vec::new();
        let mut offset = 0u32;

        loop {
            let page: Page<WireTrack> = self
                .get_json(
                    &path,
                    &[
                        ("market", market.to_string()),
                        ("limit", ALBUM_TRACKS_PAGE.to_string()),
                        ("offset", offset.to_string()),
                    ],
                )
                .await?;

            let fetched = page.items.len() as u32;
            tracks.extend(page.items.into_iter().map(TrackStub::from));

            if page.next.is_none() || fetched == 0 {
                break;
            }
            offset += fetched;
        }

        tracing::debug!(album_id = %album_id, tracks = tracks.len(), "Retrieved album tracks");

        Ok(tracks)
    }

    async fn get_track(&self, track_id: &str) -> Result<TrackDetail, CatalogError> {
        let wire: WireTrack = self.get_json(&format!("tracks/{}", track_id), &[]).await?;

        let duration_ms = wire
            .duration_ms
            .ok_or_else(|| CatalogError::Parse(format!("track {} has no duration_ms", wire.id)))?;

        Ok(TrackDetail {
            id: wire.id,
            name: wire.name,
            artists: wire.artists.into_iter().map(ArtistRef::from).collect(),
            popularity: wire.popularity.unwrap_or(0),
            preview_url: wire.preview_url,
            duration_ms,
        })
    }

    async fn featured_playlists(&self, limit: u32) -> Result<Vec<FeaturedPlaylist>, CatalogError> {
        let response: FeaturedPlaylistsResponse = self
            .get_json("browse/featured-playlists", &[("limit", limit.to_string())])
            .await?;

        Ok(response
            .playlists
            .items
            .into_iter()
            .flatten()
            .map(|wire| FeaturedPlaylist {
                name: wire.name,
                owner: wire.owner.display_name.unwrap_or_default(),
                url: wire.external_urls.and_then(|u| u.spotify),
                description: wire.description.unwrap_or_default(),
                total_tracks: wire.tracks.total,
            })
            .collect())
    }
}
