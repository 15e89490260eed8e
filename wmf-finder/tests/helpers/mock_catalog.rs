//! In-memory catalog with call counters and failure injection

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use wmf_finder::models::{Album, ArtistProfile, FeaturedPlaylist, TrackDetail, TrackStub};
use wmf_finder::services::{CatalogClient, CatalogError};

#[derive(Default)]
pub struct MockCatalog {
    albums: Vec<Album>,
    album_tracks: HashMap<String, Vec<TrackStub>>,
    artists: HashMap<String, ArtistProfile>,
    playlists: Vec<FeaturedPlaylist>,

    /// 1-based indices of `list_new_releases` calls that fail
    failing_release_calls: HashSet<usize>,
    failing_artists: HashSet<String>,
    failing_albums: HashSet<String>,
    failing_tracks: HashSet<String>,

    release_calls: AtomicUsize,
    track_calls: AtomicUsize,
    artist_calls: Mutex<HashMap<String, usize>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_album(mut self, album: Album, tracks: Vec<TrackStub>) -> Self {
        self.album_tracks.insert(album.id.clone(), tracks);
        self.albums.push(album);
        self
    }

    pub fn with_artist(mut self, artist: ArtistProfile) -> Self {
        self.artists.insert(artist.id.clone(), artist);
        self
    }

    pub fn with_playlist(mut self, playlist: FeaturedPlaylist) -> Self {
        self.playlists.push(playlist);
        self
    }

    pub fn fail_new_releases_on_call(mut self, call: usize) -> Self {
        self.failing_release_calls.insert(call);
        self
    }

    pub fn fail_artist(mut self, artist_id: &str) -> Self {
        self.failing_artists.insert(artist_id.to_string());
        self
    }

    pub fn fail_album_tracks(mut self, album_id: &str) -> Self {
        self.failing_albums.insert(album_id.to_string());
        self
    }

    pub fn fail_track(mut self, track_id: &str) -> Self {
        self.failing_tracks.insert(track_id.to_string());
        self
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub fn track_calls(&self) -> usize {
        self.track_calls.load(Ordering::SeqCst)
    }

    pub fn artist_calls(&self, artist_id: &str) -> usize {
        self.artist_calls
            .lock()
            .unwrap()
            .get(artist_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_artist_calls(&self) -> usize {
        self.artist_calls.lock().unwrap().values().sum()
    }

    fn find_stub(&self, track_id: &str) -> Option<&TrackStub> {
        self.album_tracks
            .values()
            .flatten()
            .find(|stub| stub.id == track_id)
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn list_new_releases(
        &self,
        _market: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Album>, CatalogError> {
        let call = self.release_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_release_calls.contains(&call) {
            return Err(CatalogError::Network("connection reset".to_string()));
        }
        Ok(self
            .albums
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_artist(&self, artist_id: &str) -> Result<ArtistProfile, CatalogError> {
        *self
            .artist_calls
            .lock()
            .unwrap()
            .entry(artist_id.to_string())
            .or_default() += 1;

        if self.failing_artists.contains(artist_id) {
            return Err(CatalogError::Api(500, "artist lookup failed".to_string()));
        }
        self.artists
            .get(artist_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("artists/{}", artist_id)))
    }

    async fn list_album_tracks(
        &self,
        album_id: &str,
        _market: &str,
    ) -> Result<Vec<TrackStub>, CatalogError> {
        if self.failing_albums.contains(album_id) {
            return Err(CatalogError::RateLimited {
                retry_after_secs: Some(1),
            });
        }
        Ok(self.album_tracks.get(album_id).cloned().unwrap_or_default())
    }

    async fn get_track(&self, track_id: &str) -> Result<TrackDetail, CatalogError> {
        self.track_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_tracks.contains(track_id) {
            return Err(CatalogError::Network("timeout".to_string()));
        }
        let stub = self
            .find_stub(track_id)
            .ok_or_else(|| CatalogError::NotFound(format!("tracks/{}", track_id)))?;
        Ok(TrackDetail {
            id: stub.id.clone(),
            name: stub.name.clone(),
            artists: stub.artists.clone(),
            popularity: stub.popularity,
            preview_url: stub.preview_url.clone(),
            duration_ms: stub.duration_ms.unwrap_or(200_000),
        })
    }

    async fn featured_playlists(&self, limit: u32) -> Result<Vec<FeaturedPlaylist>, CatalogError> {
        Ok(self.playlists.iter().take(limit as usize).cloned().collect())
    }
}
