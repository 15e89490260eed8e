//! Catalog entity builders

use chrono::{Duration, NaiveDate};
use wmf_finder::models::{Album, ArtistProfile, ArtistRef, TrackStub};

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn days_before(as_of: NaiveDate, days: i64) -> NaiveDate {
    as_of - Duration::days(days)
}

fn artist_ref(artist_id: &str) -> ArtistRef {
    ArtistRef {
        id: artist_id.to_string(),
        name: format!("Artist {}", artist_id),
    }
}

/// Album credited to one artist
pub fn album(id: &str, release_date: NaiveDate, artist_id: &str) -> Album {
    Album {
        id: id.to_string(),
        name: format!("Album {}", id),
        release_date,
        artists: vec![artist_ref(artist_id)],
    }
}

/// Track credited to one artist, with a preview URL derived from its id
pub fn track(id: &str, artist_id: &str, popularity: u32) -> TrackStub {
    TrackStub {
        id: id.to_string(),
        name: format!("Track {}", id),
        artists: vec![artist_ref(artist_id)],
        popularity,
        preview_url: Some(format!("https://previews.test/{}.mp3", id)),
        duration_ms: Some(180_000),
    }
}

pub fn artist(id: &str, genres: &[&str]) -> ArtistProfile {
    ArtistProfile {
        id: id.to_string(),
        name: format!("Artist {}", id),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        followers: 1_000,
        popularity: 50,
        url: None,
    }
}
