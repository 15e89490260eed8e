//! wmf-finder library interface
//!
//! Discovers newly released tracks per genre, ranks them by popularity and
//! stores a weekly snapshot. Exposed as a library for integration testing.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{FinderError, FinderResult};
pub use crate::models::TrackRecord;
pub use crate::services::{
    ArtistGenreCache, AssetFetcher, CatalogClient, CatalogError, RankOptions, RankingPipeline,
};
pub use crate::workflow::{DriverOptions, RunSummary, WeeklyDriver};
