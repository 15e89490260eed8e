//! Genre ranking pipeline
//!
//! For one genre:
//! 1. Fetch one page of new releases (no pagination beyond it).
//! 2. Keep albums released inside the recency window.
//! 3. Resolve the primary artist's genres through the per-run cache.
//! 4. Keep albums whose primary artist carries the requested genre.
//! 5. Fetch each retained album's tracks and assemble track records.
//! 6. Stable-sort by popularity, descending.
//! 7. Truncate to `top_n` when configured.
//!
//! A failure for one album (genre lookup or track listing) drops that album
//! and the pipeline moves on. Only the new-releases fetch is fatal.

use crate::models::{clamp_popularity, join_artist_names, Album, TrackRecord, TrackStub};
use crate::services::catalog_client::{CatalogClient, CatalogError};
use crate::services::genre_cache::{genre_matches, ArtistGenreCache};
use crate::services::recency_filter::{is_recent, DEFAULT_RECENCY_WINDOW_DAYS};
use chrono::NaiveDate;
use tracing::{debug, info, warn};
use wmf_common::config::PipelineConfig;
use wmf_common::time::iso_week_number;

/// Ranking parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankOptions {
    pub market: String,
    pub page_limit: u32,
    pub page_offset: u32,
    /// `None` keeps every matching record
    pub top_n: Option<usize>,
    pub recency_window_days: i64,
    /// Look up each track for duration and authoritative popularity
    pub fetch_track_details: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            market: "US".to_string(),
            page_limit: 50,
            page_offset: 0,
            top_n: Some(20),
            recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
            fetch_track_details: true,
        }
    }
}

impl From<&PipelineConfig> for RankOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            market: config.market.clone(),
            page_limit: config.page_limit,
            page_offset: config.page_offset,
            top_n: (config.top_n > 0).then_some(config.top_n),
            recency_window_days: config.recency_window_days,
            fetch_track_details: config.fetch_track_details,
        }
    }
}

/// Ranks newly released tracks of one genre by popularity
pub struct RankingPipeline<'a> {
    catalog: &'a dyn CatalogClient,
    options: RankOptions,
}

impl<'a> RankingPipeline<'a> {
    pub fn new(catalog: &'a dyn CatalogClient, options: RankOptions) -> Self {
        Self { catalog, options }
    }

    pub fn options(&self) -> &RankOptions {
        &self.options
    }

    /// Ranked track records of `genre` as of `as_of`
    ///
    /// Zero recent albums or zero genre matches yield an empty list.
    pub async fn rank(
        &self,
        genre: &str,
        cache: &mut ArtistGenreCache,
        as_of: NaiveDate,
    ) -> Result<Vec<TrackRecord>, CatalogError> {
        let week_nb = iso_week_number(as_of);

        let albums = self
            .catalog
            .list_new_releases(
                &self.options.market,
                self.options.page_limit,
                self.options.page_offset,
            )
            .await?;
        let fetched = albums.len();

        let recent: Vec<Album> = albums
            .into_iter()
            .filter(|album| is_recent(album, as_of, self.options.recency_window_days))
            .collect();

        debug!(
            genre = %genre,
            fetched = fetched,
            recent = recent.len(),
            "Applied recency filter"
        );

        let mut records = Vec::new();
        let mut matched_albums = 0usize;

        for album in &recent {
            let Some(primary) = album.primary_artist() else {
                warn!(album_id = %album.id, "Album has no credited artist, skipping");
                continue;
            };

            let genres = match cache.resolve(self.catalog, &primary.id).await {
                Ok(genres) => genres,
                Err(e) => {
                    warn!(
                        album_id = %album.id,
                        artist_id = %primary.id,
                        error = %e,
                        "Genre lookup failed, skipping album"
                    );
                    continue;
                }
            };

            if !genre_matches(genres, genre) {
                continue;
            }
            matched_albums += 1;

            let tracks = match self
                .catalog
                .list_album_tracks(&album.id, &self.options.market)
                .await
            {
                Ok(tracks) => tracks,
                Err(e) => {
                    warn!(
                        album_id = %album.id,
                        error = %e,
                        "Track listing failed, skipping album"
                    );
                    continue;
                }
            };

            for stub in tracks {
                if let Some(record) = self.assemble(album, stub, genre, week_nb).await {
                    records.push(record);
                }
            }
        }

        let total = records.len();
        let ranked = rank_records(records, self.options.top_n);

        info!(
            genre = %genre,
            week_nb = week_nb,
            albums_fetched = fetched,
            albums_recent = recent.len(),
            albums_matched = matched_albums,
            tracks_found = total,
            tracks_kept = ranked.len(),
            "Ranked genre"
        );

        Ok(ranked)
    }

    /// Build one record; `None` when the detail lookup fails
    async fn assemble(
        &self,
        album: &Album,
        stub: TrackStub,
        genre: &str,
        week_nb: u32,
    ) -> Option<TrackRecord> {
        let (name, artists, popularity, preview_url, duration_ms) =
            if self.options.fetch_track_details {
                match self.catalog.get_track(&stub.id).await {
                    Ok(detail) => (
                        detail.name,
                        detail.artists,
                        detail.popularity,
                        detail.preview_url.or(stub.preview_url),
                        Some(detail.duration_ms),
                    ),
                    Err(e) => {
                        warn!(
                            track_id = %stub.id,
                            album_id = %album.id,
                            error = %e,
                            "Track detail lookup failed, skipping track"
                        );
                        return None;
                    }
                }
            } else {
                (
                    stub.name,
                    stub.artists,
                    stub.popularity,
                    stub.preview_url,
                    stub.duration_ms,
                )
            };

        Some(TrackRecord {
            track_id: stub.id,
            name,
            artists: join_artist_names(&artists),
            album: album.name.clone(),
            release_date: album.release_date,
            duration_ms,
            popularity: clamp_popularity(popularity),
            preview_url,
            genre: genre.to_string(),
            week_nb,
        })
    }
}

/// Stable sort by popularity (descending), then truncate to `top_n`
///
/// Equal popularity keeps encounter order.
pub fn rank_records(mut records: Vec<TrackRecord>, top_n: Option<usize>) -> Vec<TrackRecord> {
    records.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    if let Some(n) = top_n {
        records.truncate(n);
    }
    records
}
