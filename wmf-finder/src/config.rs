//! Configuration resolution for wmf-finder
//!
//! Turns the bootstrap [`TomlConfig`] into the runtime pieces the finder
//! needs: the access token, ranking options, driver options and the catalog
//! client.

use crate::error::{FinderError, FinderResult};
use crate::services::{RankOptions, SpotifyCatalogClient};
use crate::workflow::DriverOptions;
use std::path::Path;
use tracing::{info, warn};
use wmf_common::config::{previews_folder, TomlConfig, ACCESS_TOKEN_ENV};

/// Resolve the catalog access token
///
/// **Priority:** ENV → TOML
pub fn resolve_access_token(toml_config: &TomlConfig) -> FinderResult<String> {
    let env_token = std::env::var(ACCESS_TOKEN_ENV).ok().filter(|t| is_valid_key(t));
    let toml_token = toml_config
        .access_token
        .as_ref()
        .filter(|t| is_valid_key(t));

    if env_token.is_some() && toml_token.is_some() {
        warn!("Access token found in environment and TOML. Using environment.");
    }

    if let Some(token) = env_token {
        info!("Access token loaded from environment variable");
        return Ok(token);
    }

    if let Some(token) = toml_token {
        info!("Access token loaded from TOML config");
        return Ok(token.clone());
    }

    Err(FinderError::Config(format!(
        "Catalog access token not configured. Set one of:\n\
         1. Environment: {}=your-token\n\
         2. TOML config: access_token = \"your-token\"",
        ACCESS_TOKEN_ENV
    )))
}

/// Report where the configuration came from
///
/// Called once the subscriber is installed; messages logged while loading
/// the file happen before logging exists.
pub fn log_config_source(config_path: Option<&Path>) {
    match config_path {
        Some(path) if path.is_file() => info!("Configuration loaded from {}", path.display()),
        Some(path) => warn!(
            "Config file not found at {}, using built-in defaults",
            path.display()
        ),
        None => warn!("No config directory on this platform, using built-in defaults"),
    }
}

/// Non-empty, non-whitespace
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Ranking options from the `[pipeline]` section
pub fn rank_options(toml_config: &TomlConfig) -> RankOptions {
    RankOptions::from(&toml_config.pipeline)
}

/// Driver options from the `[pipeline]` and `[weekly]` sections
pub fn driver_options(toml_config: &TomlConfig, root_folder: &Path) -> DriverOptions {
    DriverOptions {
        rank: rank_options(toml_config),
        persistence: toml_config.weekly.persistence,
        download_previews: toml_config.weekly.download_previews,
        output_root: previews_folder(root_folder, &toml_config.weekly),
    }
}

/// Catalog client from the `[catalog]` section and a resolved token
pub fn build_catalog_client(
    toml_config: &TomlConfig,
    access_token: &str,
) -> FinderResult<SpotifyCatalogClient> {
    let client = SpotifyCatalogClient::new(
        toml_config.catalog.base_url.as_str(),
        access_token,
        toml_config.catalog.requests_per_second,
        &wmf_common::config::get_user_agent(),
    )?;
    Ok(client)
}
