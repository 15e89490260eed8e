//! Error types for wmf-finder
//!
//! Severity follows the scope a failure is caught at:
//! - Catalog errors for one album or track are logged by the pipeline and
//!   never reach this type.
//! - Catalog errors for a whole genre are logged by the driver, which moves
//!   on to the next genre.
//! - Persistence errors abort the run.
//! - Asset fetch errors are logged and counted.

use crate::services::{AssetFetchError, CatalogError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinderError {
    /// Catalog service unavailable
    #[error("Catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    /// Insert or commit failed
    #[error("Persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Asset fetch failure: {0}")]
    AssetFetch(#[from] AssetFetchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Common(#[from] wmf_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FinderResult<T> = Result<T, FinderError>;
