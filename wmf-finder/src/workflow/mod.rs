//! Workflow orchestration

pub mod weekly_driver;

pub use weekly_driver::{DriverOptions, GenreSummary, RunSummary, WeeklyDriver};
