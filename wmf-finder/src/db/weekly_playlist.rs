//! Weekly playlist persistence
//!
//! One row per ranked track, tagged with ISO week and genre. Rows are only
//! ever appended; nothing deduplicates a second run of the same week.

use crate::models::TrackRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Persisted form of a [`TrackRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyPlaylistRow {
    pub guid: Uuid,
    pub name: String,
    pub album: String,
    pub release_date: NaiveDate,
    pub duration_ms: Option<u32>,
    pub popularity: u8,
    pub artist: String,
    pub week_nb: u32,
    pub genre: String,
}

impl WeeklyPlaylistRow {
    /// New row with a fresh guid
    pub fn from_record(record: &TrackRecord) -> Self {
        Self {
            guid: Uuid::new_v4(),
            name: record.name.clone(),
            album: record.album.clone(),
            release_date: record.release_date,
            duration_ms: record.duration_ms,
            popularity: record.popularity,
            artist: record.artists.clone(),
            week_nb: record.week_nb,
            genre: record.genre.clone(),
        }
    }
}

/// Destination for weekly rows
///
/// `insert_row` outside a batch is committed before it returns. Inside a
/// batch (`begin_batch` .. `commit_batch`) rows become visible only on commit.
#[async_trait]
pub trait PlaylistStore: Send {
    async fn insert_row(&mut self, row: &WeeklyPlaylistRow) -> Result<(), sqlx::Error>;

    async fn begin_batch(&mut self) -> Result<(), sqlx::Error>;

    async fn commit_batch(&mut self) -> Result<(), sqlx::Error>;

    /// Discard every row inserted since `begin_batch`; no-op without a batch
    async fn rollback_batch(&mut self) -> Result<(), sqlx::Error>;
}

/// SQLite-backed [`PlaylistStore`]
pub struct SqlitePlaylistStore {
    pool: SqlitePool,
    batch: Option<Transaction<'static, Sqlite>>,
}

impl SqlitePlaylistStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, batch: None }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn in_batch(&self) -> bool {
        self.batch.is_some()
    }
}

const INSERT_ROW_SQL: &str = r#"
    INSERT INTO weekly_playlist
        (guid, name, album, release_date, duration_ms, popularity, artist, week_nb, genre, created_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
"#;

fn bind_row<'q>(
    row: &'q WeeklyPlaylistRow,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    sqlx::query(INSERT_ROW_SQL)
        .bind(row.guid.to_string())
        .bind(&row.name)
        .bind(&row.album)
        .bind(row.release_date.format("%Y-%m-%d").to_string())
        .bind(row.duration_ms.map(i64::from))
        .bind(i64::from(row.popularity))
        .bind(&row.artist)
        .bind(i64::from(row.week_nb))
        .bind(&row.genre)
}

#[async_trait]
impl PlaylistStore for SqlitePlaylistStore {
    async fn insert_row(&mut self, row: &WeeklyPlaylistRow) -> Result<(), sqlx::Error> {
        match self.batch.as_mut() {
            Some(tx) => {
                bind_row(row).execute(&mut **tx).await?;
            }
            None => {
                bind_row(row).execute(&self.pool).await?;
            }
        }
        Ok(())
    }

    async fn begin_batch(&mut self) -> Result<(), sqlx::Error> {
        if self.batch.is_none() {
            self.batch = Some(self.pool.begin().await?);
            tracing::debug!("Weekly playlist batch started");
        }
        Ok(())
    }

    async fn commit_batch(&mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.batch.take() {
            tx.commit().await?;
            tracing::debug!("Weekly playlist batch committed");
        }
        Ok(())
    }

    async fn rollback_batch(&mut self) -> Result<(), sqlx::Error> {
        if let Some(tx) = self.batch.take() {
            tx.rollback().await?;
            tracing::warn!("Weekly playlist batch rolled back");
        }
        Ok(())
    }
}

/// Rows of one week and genre, in insertion order
pub async fn load_rows(
    pool: &SqlitePool,
    week_nb: u32,
    genre: &str,
) -> Result<Vec<WeeklyPlaylistRow>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT guid, name, album, release_date, duration_ms, popularity, artist, week_nb, genre
        FROM weekly_playlist
        WHERE week_nb = ? AND genre = ?
        ORDER BY rowid
        "#,
    )
    .bind(i64::from(week_nb))
    .bind(genre)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let guid_str: String = row.try_get("guid")?;
            let release_str: String = row.try_get("release_date")?;
            let duration_ms: Option<i64> = row.try_get("duration_ms")?;
            let popularity: i64 = row.try_get("popularity")?;
            let week_nb: i64 = row.try_get("week_nb")?;

            Ok(WeeklyPlaylistRow {
                guid: Uuid::parse_str(&guid_str).map_err(|e| decode_error("guid", e))?,
                name: row.try_get("name")?,
                album: row.try_get("album")?,
                release_date: NaiveDate::parse_from_str(&release_str, "%Y-%m-%d")
                    .map_err(|e| decode_error("release_date", e))?,
                duration_ms: duration_ms.map(|d| d as u32),
                popularity: popularity as u8,
                artist: row.try_get("artist")?,
                week_nb: week_nb as u32,
                genre: row.try_get("genre")?,
            })
        })
        .collect()
}

/// Number of rows stored for one week and genre
pub async fn count_rows(pool: &SqlitePool, week_nb: u32, genre: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM weekly_playlist WHERE week_nb = ? AND genre = ?")
        .bind(i64::from(week_nb))
        .bind(genre)
        .fetch_one(pool)
        .await
}

fn decode_error(
    column: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}
