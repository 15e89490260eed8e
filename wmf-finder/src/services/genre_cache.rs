//! Artist genre cache
//!
//! Maps artist id to the artist's lower-cased genre set. Entries are created
//! on first lookup and never invalidated; the cache lives for one driver run
//! and is passed by `&mut` to every pipeline invocation of that run.

use crate::services::catalog_client::{CatalogClient, CatalogError};
use std::collections::{HashMap, HashSet};

/// Per-run memoization of artist → genre-set lookups
#[derive(Debug, Default)]
pub struct ArtistGenreCache {
    entries: HashMap<String, HashSet<String>>,
    remote_lookups: usize,
}

impl ArtistGenreCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Genres of `artist_id`, fetching them on first use
    ///
    /// Failed lookups are not stored, so a later album by the same artist
    /// tries again.
    pub async fn resolve(
        &mut self,
        catalog: &dyn CatalogClient,
        artist_id: &str,
    ) -> Result<&HashSet<String>, CatalogError> {
        if !self.entries.contains_key(artist_id) {
            self.remote_lookups += 1;
            let artist = catalog.get_artist(artist_id).await?;
            let genres: HashSet<String> = artist
                .genres
                .iter()
                .map(|g| normalize_genre(g))
                .collect();

            tracing::debug!(
                artist_id = %artist_id,
                genres = ?genres,
                "Cached artist genres"
            );

            self.entries.insert(artist_id.to_string(), genres);
        }

        // Present: either cached before or inserted above
        self.entries
            .get(artist_id)
            .ok_or_else(|| CatalogError::NotFound(artist_id.to_string()))
    }

    /// Cached entry without a remote call
    pub fn get(&self, artist_id: &str) -> Option<&HashSet<String>> {
        self.entries.get(artist_id)
    }

    /// Number of `get_artist` calls issued, including failed ones
    pub fn remote_lookups(&self) -> usize {
        self.remote_lookups
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lower-case and trim a genre name for comparison
pub fn normalize_genre(genre: &str) -> String {
    genre.trim().to_lowercase()
}

/// Case-insensitive exact membership test against a normalized set
pub fn genre_matches(genres: &HashSet<String>, requested: &str) -> bool {
    genres.contains(&normalize_genre(requested))
}
