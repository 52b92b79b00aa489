//! backfill-durations - fill in missing item durations
//!
//! Items added before durations were recorded have no `duration`. This tool
//! resolves each of them again and stores the duration. Items whose URL no
//! longer parses or whose lookup fails are skipped.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use watchq_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use watchq_common::db::init_database;
use watchq_common::video_id::extract_video_id;
use watchq_server::db;
use watchq_server::resolver::{MetadataResolver, YouTubeResolver};

#[derive(Parser, Debug)]
#[command(name = "backfill-durations", version, about = "Fill in missing item durations")]
struct Args {
    /// Folder holding watchq.db
    #[arg(short, long, env = "WATCHQ_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Path to watchq.toml
    #[arg(short, long, env = "WATCHQ_CONFIG")]
    config: Option<PathBuf>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    youtube_api_key: Option<String>,

    /// Pause between upstream requests, in milliseconds
    #[arg(long, default_value = "1000")]
    delay_ms: u64,

    /// Report what would change without writing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Default)]
struct Summary {
    updated: usize,
    skipped: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backfill_durations=info,watchq_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let toml = TomlConfig::load_or_default(args.config.as_deref());

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&toml)
        .resolve();
    let db_path = RootFolderInitializer::new(root_folder).database_path();
    if !db_path.exists() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let api_key = args.youtube_api_key.or(toml.youtube_api_key);
    let resolver = YouTubeResolver::new(api_key).context("Failed to build YouTube client")?;

    let items = db::items::list_missing_duration(&pool).await?;
    info!("Found {} items without duration", items.len());

    let delay = Duration::from_millis(args.delay_ms);
    let mut summary = Summary::default();

    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }

        let Some(video_id) = extract_video_id(&item.url) else {
            warn!(id = %item.id, url = %item.url, "Skipping item with unrecognized URL");
            summary.skipped += 1;
            continue;
        };

        let duration = match resolver.resolve(&video_id).await {
            Ok(metadata) => metadata.duration,
            Err(e) => {
                warn!(id = %item.id, title = %item.title, "Could not resolve duration: {}", e);
                summary.skipped += 1;
                continue;
            }
        };

        let Some(duration) = duration else {
            warn!(id = %item.id, title = %item.title, "Upstream reported no duration");
            summary.skipped += 1;
            continue;
        };

        if args.dry_run {
            info!(id = %item.id, "Would set duration for {} -> {}", item.title, duration);
        } else {
            db::items::set_duration(&pool, item.id, &duration).await?;
            info!(id = %item.id, "Updated duration for {} -> {}", item.title, duration);
        }
        summary.updated += 1;
    }

    info!(
        updated = summary.updated,
        skipped = summary.skipped,
        dry_run = args.dry_run,
        "Backfill complete"
    );
    Ok(())
}
