//! Database access for wmf-finder
//!
//! Schema creation lives in `wmf_common::db::init`.

pub mod weekly_playlist;

pub use weekly_playlist::{
    count_rows, load_rows, PlaylistStore, SqlitePlaylistStore, WeeklyPlaylistRow,
};

use sqlx::SqlitePool;
use std::path::Path;

/// Open the database in the root folder, creating schema as needed
pub async fn init_database_pool(db_path: &Path) -> wmf_common::Result<SqlitePool> {
    tracing::debug!("Connecting to database: {}", db_path.display());
    wmf_common::db::init_database(db_path).await
}
