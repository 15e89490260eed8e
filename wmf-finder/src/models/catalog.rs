//! Catalog entities as returned by the catalog client
//!
//! These are transient: they live only for one pipeline invocation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Artist reference attached to albums and tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

/// Newly released album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub release_date: NaiveDate,
    /// Contributing artists in catalog order; the first is the primary artist
    pub artists: Vec<ArtistRef>,
}

impl Album {
    /// First credited artist, used for genre resolution
    pub fn primary_artist(&self) -> Option<&ArtistRef> {
        self.artists.first()
    }
}

/// Track as listed inside an album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStub {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    /// Album listings may omit popularity; 0 when absent
    pub popularity: u32,
    pub preview_url: Option<String>,
    pub duration_ms: Option<u32>,
}

/// Full track metadata from a per-track lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDetail {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub popularity: u32,
    pub preview_url: Option<String>,
    pub duration_ms: u32,
}

/// Artist metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub id: String,
    pub name: String,
    /// Genres as the catalog spells them (not normalized)
    pub genres: Vec<String>,
    pub followers: u64,
    pub popularity: u32,
    pub url: Option<String>,
}

/// Editorially featured playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedPlaylist {
    pub name: String,
    pub owner: String,
    pub url: Option<String>,
    pub description: String,
    pub total_tracks: u32,
}

/// Join artist names the way persisted rows store them
pub fn join_artist_names(artists: &[ArtistRef]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
