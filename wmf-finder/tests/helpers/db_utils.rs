//! Database Test Utilities

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tempfile::TempDir;
use wmf_finder::db::{PlaylistStore, WeeklyPlaylistRow};

/// Create a temporary file database with the schema applied
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_wmf.db");
    let pool = wmf_common::db::init_database(&db_path).await?;
    Ok((temp_dir, pool))
}

/// Store keeping rows in memory, with the same batch visibility rules as SQLite
#[derive(Default)]
pub struct MemoryStore {
    pub committed: Vec<WeeklyPlaylistRow>,
    pending: Option<Vec<WeeklyPlaylistRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlaylistStore for MemoryStore {
    async fn insert_row(&mut self, row: &WeeklyPlaylistRow) -> Result<(), sqlx::Error> {
        match self.pending.as_mut() {
            Some(pending) => pending.push(row.clone()),
            None => self.committed.push(row.clone()),
        }
        Ok(())
    }

    async fn begin_batch(&mut self) -> Result<(), sqlx::Error> {
        self.pending.get_or_insert_with(Vec::new);
        Ok(())
    }

    async fn commit_batch(&mut self) -> Result<(), sqlx::Error> {
        if let Some(pending) = self.pending.take() {
            self.committed.extend(pending);
        }
        Ok(())
    }

    async fn rollback_batch(&mut self) -> Result<(), sqlx::Error> {
        self.pending = None;
        Ok(())
    }
}

/// Wraps a store and fails the Nth insert (1-based)
pub struct FlakyStore<S> {
    pub inner: S,
    fail_on: usize,
    inserts: usize,
}

impl<S: PlaylistStore> FlakyStore<S> {
    pub fn new(inner: S, fail_on: usize) -> Self {
        Self {
            inner,
            fail_on,
            inserts: 0,
        }
    }
}

#[async_trait]
impl<S: PlaylistStore> PlaylistStore for FlakyStore<S> {
    async fn insert_row(&mut self, row: &WeeklyPlaylistRow) -> Result<(), sqlx::Error> {
        self.inserts += 1;
        if self.inserts == self.fail_on {
            return Err(sqlx::Error::Protocol("disk I/O error".to_string()));
        }
        self.inner.insert_row(row).await
    }

    async fn begin_batch(&mut self) -> Result<(), sqlx::Error> {
        self.inner.begin_batch().await
    }

    async fn commit_batch(&mut self) -> Result<(), sqlx::Error> {
        self.inner.commit_batch().await
    }

    async fn rollback_batch(&mut self) -> Result<(), sqlx::Error> {
        self.inner.rollback_batch().await
    }
}
