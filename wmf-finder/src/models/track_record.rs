//! Ranked output of the genre pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Highest popularity score the catalog reports
pub const MAX_POPULARITY: u8 = 100;

/// One ranked track, combining album-level and track-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub track_id: String,
    pub name: String,
    /// Artist names joined with ", "
    pub artists: String,
    pub album: String,
    pub release_date: NaiveDate,
    pub duration_ms: Option<u32>,
    /// Always within 0..=100
    pub popularity: u8,
    pub preview_url: Option<String>,
    pub genre: String,
    /// ISO week of the run date
    pub week_nb: u32,
}

/// Clamp a raw catalog popularity into 0..=100
pub fn clamp_popularity(raw: u32) -> u8 {
    raw.min(MAX_POPULARITY as u32) as u8
}
