//! Services for the genre discovery workflow
//!
//! Leaf-first: catalog client, artist genre cache, recency filter, ranking
//! pipeline, asset fetcher.

pub mod asset_fetcher;
pub mod catalog_client;
pub mod genre_cache;
pub mod ranking_pipeline;
pub mod recency_filter;

pub use asset_fetcher::{AssetFetchError, AssetFetcher, HttpAssetFetcher};
pub use catalog_client::{CatalogClient, CatalogError, SpotifyCatalogClient};
pub use genre_cache::{genre_matches, normalize_genre, ArtistGenreCache};
pub use ranking_pipeline::{rank_records, RankOptions, RankingPipeline};
pub use recency_filter::{is_recent, DEFAULT_RECENCY_WINDOW_DAYS};
