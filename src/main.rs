use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{info, warn};

mod analyzer;
mod config;
mod models;
mod notify;
mod pipeline;
mod scraper;

use crate::config::Config;
use crate::pipeline::MonitorPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets come from .env in development, real env vars in cron
    let _ = dotenvy::dotenv();

    let matches = Command::new("YouTube Competitor Monitor")
        .version("0.1.0")
        .author("UAbility")
        .about("Tracks competitor channels and reports outperforming videos")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file"),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory for report artifacts")
                .default_value("./output"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Run the analysis without sending notifications")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    tracing_subscriber::fmt()
        .with_env_filter(if verbose {
            "competitor_monitor=debug,info"
        } else {
            "competitor_monitor=info,warn"
        })
        .init();

    let output_dir = PathBuf::from(matches.get_one::<String>("output-dir").unwrap());
    let dry_run = matches.get_flag("dry-run");

    // Load configuration
    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };
    config.validate()?;

    if config.scraper.api_key.is_none() {
        return Err(anyhow::anyhow!(
            "SCRAPINGDOG_API_KEY is not set, cannot fetch channel data"
        ));
    }
    if config.email.address.is_none() || config.email.recipient.is_none() {
        warn!("Gmail credentials not configured, email report will not be sent");
    }
    if config.telegram.bot_token.is_none() {
        warn!("Telegram not configured, alerts will not be sent");
    }

    info!("🚀 YouTube Competitor Monitor starting...");
    info!("📡 Tracking {} competitor channels", config.channels.len());
    info!("📂 Output directory: {}", output_dir.display());
    if dry_run {
        info!("🧪 Dry run: notifications disabled");
    }

    let pipeline = MonitorPipeline::new(config, output_dir, dry_run)?;
    let summary = pipeline.run().await?;

    info!("🎉 Run completed in {:.1}s", summary.elapsed_seconds);
    info!(
        "✅ Channels fetched: {}/{}",
        summary.channels_fetched, summary.channels_requested
    );
    info!(
        "🔥 Outperforming videos: {} across {} channels",
        summary.outperforming_total, summary.channels_reported
    );
    if summary.notifications_failed > 0 {
        warn!(
            "⚠️ {} notification channel(s) failed",
            summary.notifications_failed
        );
    }

    Ok(())
}
