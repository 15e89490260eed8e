//! Weekly persistence and download driver
//!
//! For each requested genre: rank it, then for every record in rank order
//! insert one weekly playlist row and, when a preview URL exists, fetch the
//! preview into `<output_root>/week_<NN>_<genre>/`.
//!
//! Persistence and download are independent side effects. A failed download
//! never touches the row already written; a failed insert aborts the run.
//! In [`PersistenceMode::RowByRow`] rows committed before the failure stay;
//! in [`PersistenceMode::AllOrNothing`] the whole run is rolled back.

use crate::db::{PlaylistStore, WeeklyPlaylistRow};
use crate::error::FinderResult;
use crate::models::TrackRecord;
use crate::services::asset_fetcher::{preview_file_name, preview_folder_name};
use crate::services::{ArtistGenreCache, AssetFetcher, CatalogClient, RankOptions, RankingPipeline};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use wmf_common::config::PersistenceMode;
use wmf_common::time::iso_week_number;

/// Driver parameters
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub rank: RankOptions,
    pub persistence: PersistenceMode,
    pub download_previews: bool,
    /// Parent of the per-week, per-genre preview folders
    pub output_root: PathBuf,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            rank: RankOptions::default(),
            persistence: PersistenceMode::RowByRow,
            download_previews: true,
            output_root: PathBuf::from(wmf_common::config::DEFAULT_PREVIEWS_FOLDER),
        }
    }
}

/// Outcome for one genre
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreSummary {
    pub genre: String,
    pub records_ranked: usize,
    pub rows_persisted: usize,
    pub previews_downloaded: usize,
    pub previews_failed: usize,
    /// Records without a preview URL
    pub previews_unavailable: usize,
    /// Set when the catalog could not be queried for this genre at all
    pub failure: Option<String>,
}

/// Outcome of one driver run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub week_nb: u32,
    pub genres: Vec<GenreSummary>,
    /// `get_artist` calls issued across all genres
    pub artist_lookups: usize,
}

impl RunSummary {
    pub fn rows_persisted(&self) -> usize {
        self.genres.iter().map(|g| g.rows_persisted).sum()
    }

    pub fn failed_genres(&self) -> Vec<&str> {
        self.genres
            .iter()
            .filter(|g| g.failure.is_some())
            .map(|g| g.genre.as_str())
            .collect()
    }

    fn log(&self) {
        for genre in &self.genres {
            match &genre.failure {
                Some(reason) => warn!(
                    week_nb = self.week_nb,
                    genre = %genre.genre,
                    reason = %reason,
                    "Genre skipped"
                ),
                None => info!(
                    week_nb = self.week_nb,
                    genre = %genre.genre,
                    ranked = genre.records_ranked,
                    persisted = genre.rows_persisted,
                    downloaded = genre.previews_downloaded,
                    download_failures = genre.previews_failed,
                    no_preview = genre.previews_unavailable,
                    "Genre complete"
                ),
            }
        }
        info!(
            week_nb = self.week_nb,
            genres = self.genres.len(),
            rows = self.rows_persisted(),
            artist_lookups = self.artist_lookups,
            "Weekly run complete"
        );
    }
}

/// Runs the weekly snapshot for a list of genres
pub struct WeeklyDriver {
    catalog: Arc<dyn CatalogClient>,
    fetcher: Option<Arc<dyn AssetFetcher>>,
    options: DriverOptions,
}

impl WeeklyDriver {
    /// `fetcher = None` disables downloads regardless of `options`
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        fetcher: Option<Arc<dyn AssetFetcher>>,
        options: DriverOptions,
    ) -> Self {
        Self {
            catalog,
            fetcher,
            options,
        }
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    /// Process `genres` in order for the week containing `as_of`
    ///
    /// One artist genre cache is shared by every genre of the run.
    pub async fn run(
        &self,
        store: &mut dyn PlaylistStore,
        genres: &[String],
        as_of: NaiveDate,
    ) -> FinderResult<RunSummary> {
        let batched = self.options.persistence == PersistenceMode::AllOrNothing;

        if batched {
            store.begin_batch().await?;
        }

        match self.run_genres(store, genres, as_of).await {
            Ok(summary) => {
                if batched {
                    store.commit_batch().await?;
                }
                summary.log();
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, "Weekly run aborted");
                if batched {
                    if let Err(rollback_err) = store.rollback_batch().await {
                        error!(error = %rollback_err, "Rollback failed");
                    }
                }
                Err(e)
            }
        }
    }

    async fn run_genres(
        &self,
        store: &mut dyn PlaylistStore,
        genres: &[String],
        as_of: NaiveDate,
    ) -> FinderResult<RunSummary> {
        let week_nb = iso_week_number(as_of);
        let mut cache = ArtistGenreCache::new();
        let pipeline = RankingPipeline::new(self.catalog.as_ref(), self.options.rank.clone());

        info!(
            week_nb = week_nb,
            genres = ?genres,
            persistence = ?self.options.persistence,
            "Starting weekly run"
        );

        let mut summary = RunSummary {
            week_nb,
            ..Default::default()
        };

        for genre in genres {
            let mut genre_summary = GenreSummary {
                genre: genre.clone(),
                ..Default::default()
            };

            let records = match pipeline.rank(genre, &mut cache, as_of).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(genre = %genre, error = %e, "Catalog unavailable for genre, skipping");
                    genre_summary.failure = Some(e.to_string());
                    summary.genres.push(genre_summary);
                    continue;
                }
            };
            genre_summary.records_ranked = records.len();

            let folder = self
                .options
                .output_root
                .join(preview_folder_name(week_nb, genre));

            for (index, record) in records.iter().enumerate() {
                store
                    .insert_row(&WeeklyPlaylistRow::from_record(record))
                    .await?;
                genre_summary.rows_persisted += 1;

                self.download_preview(record, index + 1, &folder, &mut genre_summary)
                    .await;
            }

            summary.genres.push(genre_summary);
        }

        summary.artist_lookups = cache.remote_lookups();
        tracing::debug!(artists_cached = cache.len(), "Artist genre cache released");
        Ok(summary)
    }

    async fn download_preview(
        &self,
        record: &TrackRecord,
        rank: usize,
        folder: &Path,
        genre_summary: &mut GenreSummary,
    ) {
        if !self.options.download_previews {
            return;
        }
        let Some(fetcher) = &self.fetcher else {
            return;
        };
        let Some(url) = &record.preview_url else {
            genre_summary.previews_unavailable += 1;
            return;
        };

        let dest = folder.join(preview_file_name(rank, &record.artists, &record.name));
        match fetcher.fetch(url, &dest).await {
            Ok(bytes) => {
                genre_summary.previews_downloaded += 1;
                tracing::debug!(
                    track_id = %record.track_id,
                    dest = %dest.display(),
                    bytes = bytes,
                    "Preview downloaded"
                );
            }
            Err(e) => {
                genre_summary.previews_failed += 1;
                warn!(
                    track_id = %record.track_id,
                    url = %url,
                    error = %e,
                    "Preview download failed"
                );
            }
        }
    }
}
