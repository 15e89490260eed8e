//! Bootstrap configuration loading and root folder resolution
//!
//! The TOML file is optional. Every key has a built-in default, and a missing
//! file produces a warning rather than an error.
//!
//! Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. `WMF_ROOT_FOLDER` environment variable
//! 3. `root_folder` in the TOML file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "WMF_ROOT_FOLDER";

/// Environment variable carrying the catalog access token
pub const ACCESS_TOKEN_ENV: &str = "WMF_ACCESS_TOKEN";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "wmf.db";

/// Largest accepted `pipeline.recency_window_days` (one hundred years)
pub const MAX_RECENCY_WINDOW_DAYS: i64 = 36_500;

/// Default folder (relative to the root folder) for downloaded previews
pub const DEFAULT_PREVIEWS_FOLDER: &str = "previews";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Folder holding the database and downloaded previews
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Pre-obtained catalog API bearer token
    #[serde(default)]
    pub access_token: Option<String>,

    /// Genres processed by the weekly run when none are given on the command line
    #[serde(default)]
    pub genres: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub weekly: WeeklyConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Remote catalog connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    /// Client-side request budget
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

/// Ranking pipeline settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_market")]
    pub market: String,

    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    #[serde(default)]
    pub page_offset: u32,

    /// Number of records kept per genre; 0 keeps every record
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_recency_window_days")]
    pub recency_window_days: i64,

    /// Look up every track individually for duration and popularity
    #[serde(default = "default_true")]
    pub fetch_track_details: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            market: default_market(),
            page_limit: default_page_limit(),
            page_offset: 0,
            top_n: default_top_n(),
            recency_window_days: default_recency_window_days(),
            fetch_track_details: true,
        }
    }
}

/// How weekly rows are committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceMode {
    /// Every insert commits on its own; a failure leaves earlier rows in place
    #[default]
    RowByRow,
    /// One transaction spans the whole run; a failure rolls every row back
    AllOrNothing,
}

impl std::str::FromStr for PersistenceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "row_by_row" => Ok(Self::RowByRow),
            "all_or_nothing" => Ok(Self::AllOrNothing),
            other => Err(Error::InvalidValue {
                key: "weekly.persistence".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Weekly driver settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeeklyConfig {
    #[serde(default = "default_true")]
    pub download_previews: bool,

    #[serde(default)]
    pub persistence: PersistenceMode,

    /// Output folder for previews; relative paths resolve against the root folder
    #[serde(default)]
    pub output_folder: Option<PathBuf>,
}

impl Default for WeeklyConfig {
    fn default() -> Self {
        Self {
            download_previews: true,
            persistence: PersistenceMode::default(),
            output_folder: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_catalog_base_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_requests_per_second() -> u32 {
    5
}

fn default_market() -> String {
    "US".to_string()
}

fn default_page_limit() -> u32 {
    50
}

fn default_top_n() -> usize {
    20
}

fn default_recency_window_days() -> i64 {
    90
}

fn default_true() -> bool {
    true
}

impl TomlConfig {
    /// Validate value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.catalog.requests_per_second == 0 {
            return Err(Error::InvalidValue {
                key: "catalog.requests_per_second".to_string(),
                value: "0".to_string(),
            });
        }
        if self.pipeline.page_limit == 0 || self.pipeline.page_limit > 50 {
            return Err(Error::InvalidValue {
                key: "pipeline.page_limit".to_string(),
                value: self.pipeline.page_limit.to_string(),
            });
        }
        if !(0..=MAX_RECENCY_WINDOW_DAYS).contains(&self.pipeline.recency_window_days) {
            return Err(Error::InvalidValue {
                key: "pipeline.recency_window_days".to_string(),
                value: self.pipeline.recency_window_days.to_string(),
            });
        }
        Ok(())
    }
}

/// Default configuration file path for the platform (`<config_dir>/wmf/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wmf").join("config.toml"))
}

/// Load TOML configuration with graceful degradation
///
/// A missing file yields defaults and a warning. A file that exists but
/// cannot be parsed or fails validation is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content).map_err(|e| Error::TomlDecode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    config.validate()?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write TOML configuration, creating parent directories
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Resolve the root folder following the priority order in the module docs
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("wmf"))
        .unwrap_or_else(|| PathBuf::from("./wmf_data"))
}

/// Create the root folder if missing and return the database path inside it
pub fn ensure_root_folder(root_folder: &Path) -> Result<PathBuf> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(root_folder.join(DATABASE_FILE_NAME))
}

/// Folder that receives downloaded previews
pub fn previews_folder(root_folder: &Path, weekly: &WeeklyConfig) -> PathBuf {
    match &weekly.output_folder {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => root_folder.join(path),
        None => root_folder.join(DEFAULT_PREVIEWS_FOLDER),
    }
}

/// Standard User-Agent for outgoing HTTP requests
pub fn get_user_agent() -> String {
    format!("WizeMusicFinder/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_behavior() {
        let config = TomlConfig::default();
        assert_eq!(config.pipeline.market, "US");
        assert_eq!(config.pipeline.page_limit, 50);
        assert_eq!(config.pipeline.page_offset, 0);
        assert_eq!(config.pipeline.top_n, 20);
        assert_eq!(config.pipeline.recency_window_days, 90);
        assert!(config.pipeline.fetch_track_details);
        assert!(config.weekly.download_previews);
        assert_eq!(config.weekly.persistence, PersistenceMode::RowByRow);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            genres = ["pop"]

            [pipeline]
            top_n = 0

            [weekly]
            persistence = "all_or_nothing"
            "#,
        )
        .unwrap();

        assert_eq!(config.genres, vec!["pop".to_string()]);
        assert_eq!(config.pipeline.top_n, 0);
        assert_eq!(config.pipeline.market, "US");
        assert_eq!(config.weekly.persistence, PersistenceMode::AllOrNothing);
        assert!(config.weekly.download_previews);
    }

    #[test]
    fn test_recency_window_range() {
        let mut config = TomlConfig::default();

        config.pipeline.recency_window_days = MAX_RECENCY_WINDOW_DAYS;
        assert!(config.validate().is_ok());

        config.pipeline.recency_window_days = 200_000_000;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidValue { ref key, .. }) if key == "pipeline.recency_window_days"
        ));

        config.pipeline.recency_window_days = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_persistence_mode_from_str() {
        assert_eq!("row-by-row".parse::<PersistenceMode>().unwrap(), PersistenceMode::RowByRow);
        assert_eq!(
            "All_Or_Nothing".parse::<PersistenceMode>().unwrap(),
            PersistenceMode::AllOrNothing
        );
        assert!("batched".parse::<PersistenceMode>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_rate() {
        let mut config = TomlConfig::default();
        config.catalog.requests_per_second = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn test_validate_rejects_oversized_page() {
        let mut config = TomlConfig::default();
        config.pipeline.page_limit = 51;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_previews_folder_resolution() {
        let root = Path::new("/srv/wmf");
        let mut weekly = WeeklyConfig::default();
        assert_eq!(previews_folder(root, &weekly), PathBuf::from("/srv/wmf/previews"));

        weekly.output_folder = Some(PathBuf::from("audio"));
        assert_eq!(previews_folder(root, &weekly), PathBuf::from("/srv/wmf/audio"));

        weekly.output_folder = Some(PathBuf::from("/mnt/audio"));
        assert_eq!(previews_folder(root, &weekly), PathBuf::from("/mnt/audio"));
    }

    #[test]
    fn test_user_agent_contains_version() {
        assert!(get_user_agent().starts_with("WizeMusicFinder/"));
    }
}
