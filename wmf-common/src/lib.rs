//! # WizeMusicFinder Common Library
//!
//! Shared code for the wmf crates:
//! - Error type
//! - Bootstrap configuration loading and root folder resolution
//! - Logging initialization
//! - Database initialization (weekly playlist schema)
//! - Time and ISO week helpers

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod time;

pub use error::{Error, Result};
