//! Database initialization
//!
//! Creates the database file and its tables on first run. Table creation is
//! idempotent, so opening an existing database is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Name of the table receiving one row per ranked track
pub const WEEKLY_PLAYLIST_TABLE: &str = "weekly_playlist";

/// Open (or create) the database and ensure the schema exists
///
/// Single connection; a run writes sequentially.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema_version_table(&pool).await?;
    create_weekly_playlist_table(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the full schema (tests, dry runs)
pub async fn init_memory_database() -> Result<SqlitePool> {
    // One connection: every new in-memory connection would be a separate database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_schema_version_table(&pool).await?;
    create_weekly_playlist_table(&pool).await?;

    Ok(pool)
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (1)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the weekly playlist table
///
/// No uniqueness constraint on (week_nb, genre, name): re-running a week
/// appends another copy of every row.
pub async fn create_weekly_playlist_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weekly_playlist (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            album TEXT NOT NULL,
            release_date TEXT NOT NULL,
            duration_ms INTEGER,
            popularity INTEGER NOT NULL CHECK (popularity BETWEEN 0 AND 100),
            artist TEXT NOT NULL,
            week_nb INTEGER NOT NULL,
            genre TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_weekly_playlist_week_genre ON weekly_playlist(week_nb, genre)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
