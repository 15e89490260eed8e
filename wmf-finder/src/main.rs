//! wmf-finder - weekly genre discovery
//!
//! Subcommands:
//! - `weekly`: rank new releases per genre, persist the weekly snapshot and
//!   download previews
//! - `featured`: list the catalog's featured playlists
//! - `artist`: show one artist profile

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use wmf_common::config::{self as common_config, TomlConfig};
use wmf_finder::config::{
    build_catalog_client, driver_options, log_config_source, resolve_access_token,
};
use wmf_finder::db::{init_database_pool, SqlitePlaylistStore};
use wmf_finder::services::{AssetFetcher, CatalogClient, HttpAssetFetcher};
use wmf_finder::WeeklyDriver;

/// Command-line arguments for wmf-finder
#[derive(Parser, Debug)]
#[command(name = "wmf-finder")]
#[command(about = "Weekly new-release discovery ranked by genre")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Folder holding the database and previews
    #[arg(long, global = true, value_name = "DIR")]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank, persist and download this week's tracks
    Weekly(WeeklyArgs),

    /// List featured playlists
    Featured {
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Show an artist profile
    Artist {
        /// Catalog artist id
        id: String,
    },
}

#[derive(Args, Debug)]
struct WeeklyArgs {
    /// Genre to process (repeatable); defaults to the configured list
    #[arg(long = "genre", value_name = "GENRE")]
    genres: Vec<String>,

    /// Records kept per genre
    #[arg(long, conflicts_with = "unbounded")]
    top_n: Option<usize>,

    /// Keep every matching record
    #[arg(long)]
    unbounded: bool,

    /// Skip preview downloads
    #[arg(long)]
    no_download: bool,

    /// Roll back the whole run if any insert fails
    #[arg(long)]
    all_or_nothing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(common_config::default_config_path);
    let toml_config = match &config_path {
        Some(path) => common_config::load_toml_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };

    wmf_common::logging::init_tracing(&toml_config.logging)
        .context("Failed to initialize logging")?;

    info!(
        "Starting wmf-finder v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    log_config_source(config_path.as_deref());

    let access_token = resolve_access_token(&toml_config)?;
    let catalog: Arc<dyn CatalogClient> = Arc::new(
        build_catalog_client(&toml_config, &access_token)
            .context("Failed to create catalog client")?,
    );

    match cli.command {
        Command::Weekly(args) => {
            run_weekly(args, cli.root_folder, &toml_config, catalog).await
        }
        Command::Featured { limit } => {
            let playlists = catalog.featured_playlists(limit).await?;
            for playlist in playlists {
                println!(
                    "{} (by {}, {} tracks)\n  {}\n  {}",
                    playlist.name,
                    playlist.owner,
                    playlist.total_tracks,
                    playlist.url.as_deref().unwrap_or("-"),
                    playlist.description
                );
            }
            Ok(())
        }
        Command::Artist { id } => {
            let artist = catalog.get_artist(&id).await?;
            let mut genres: Vec<_> = artist.genres.iter().cloned().collect();
            genres.sort();
            println!("{} ({})", artist.name, artist.id);
            println!("  genres:     {}", genres.join(", "));
            println!("  followers:  {}", artist.followers);
            println!("  popularity: {}", artist.popularity);
            if let Some(url) = &artist.url {
                println!("  url:        {}", url);
            }
            Ok(())
        }
    }
}

async fn run_weekly(
    args: WeeklyArgs,
    root_arg: Option<PathBuf>,
    toml_config: &TomlConfig,
    catalog: Arc<dyn CatalogClient>,
) -> Result<()> {
    let genres = if args.genres.is_empty() {
        toml_config.genres.clone()
    } else {
        args.genres
    };
    if genres.is_empty() {
        bail!("No genres given. Pass --genre or set `genres` in the config file");
    }

    let root_folder = common_config::resolve_root_folder(root_arg.as_deref(), toml_config);
    let db_path = common_config::ensure_root_folder(&root_folder)
        .context("Failed to initialize root folder")?;
    info!("Database: {}", db_path.display());

    let pool = init_database_pool(&db_path).await?;
    let mut store = SqlitePlaylistStore::new(pool);

    let mut options = driver_options(toml_config, &root_folder);
    if args.unbounded {
        options.rank.top_n = None;
    } else if let Some(top_n) = args.top_n {
        options.rank.top_n = (top_n > 0).then_some(top_n);
    }
    if args.no_download {
        options.download_previews = false;
    }
    if args.all_or_nothing {
        options.persistence = common_config::PersistenceMode::AllOrNothing;
    }

    let fetcher: Option<Arc<dyn AssetFetcher>> = if options.download_previews {
        let fetcher = HttpAssetFetcher::new(&common_config::get_user_agent())
            .context("Failed to create preview fetcher")?;
        Some(Arc::new(fetcher))
    } else {
        None
    };

    let driver = WeeklyDriver::new(catalog, fetcher, options);
    let summary = driver
        .run(&mut store, &genres, wmf_common::time::today())
        .await
        .context("Weekly run failed")?;

    println!("Week {}", summary.week_nb);
    for genre in &summary.genres {
        match &genre.failure {
            Some(reason) => println!("  {:<20} skipped: {}", genre.genre, reason),
            None => println!(
                "  {:<20} {} rows, {} previews ({} failed)",
                genre.genre, genre.rows_persisted, genre.previews_downloaded, genre.previews_failed
            ),
        }
    }

    Ok(())
}
