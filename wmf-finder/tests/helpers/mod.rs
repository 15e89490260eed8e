//! Test Helper Utilities
//!
//! Shared utilities for testing wmf-finder

#![allow(dead_code)]

pub mod db_utils;
pub mod fixtures;
pub mod log_capture;
pub mod mock_catalog;
pub mod mock_fetcher;

pub use db_utils::{create_test_db, FlakyStore, MemoryStore};
pub use fixtures::{album, artist, date, days_before, track};
pub use log_capture::{capture_logs, LogCapture};
pub use mock_catalog::MockCatalog;
pub use mock_fetcher::MockFetcher;
