use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::analyzer::{analyze_channel, rank_channels, ChannelAnalysis};
use crate::config::Config;
use crate::models::ChannelRecord;
use crate::notify::create_notifiers;
use crate::scraper::ScrapingDogClient;

/// Outcome of one monitoring run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub channels_requested: usize,
    pub channels_fetched: usize,
    pub videos_seen: usize,
    pub channels_reported: usize,
    pub outperforming_total: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub elapsed_seconds: f64,
}

#[derive(Serialize)]
struct ReportArtifact<'a> {
    generated_at: String,
    results: &'a [ChannelAnalysis],
}

/// Full monitoring pipeline: fetch, analyze, persist, notify.
pub struct MonitorPipeline {
    config: Config,
    scraper: ScrapingDogClient,
    output_dir: PathBuf,
    dry_run: bool,
}

impl MonitorPipeline {
    pub fn new(config: Config, output_dir: PathBuf, dry_run: bool) -> Result<Self> {
        let scraper = ScrapingDogClient::new(config.scraper.clone())?;
        Ok(Self {
            config,
            scraper,
            output_dir,
            dry_run,
        })
    }

    /// Run the full pipeline once.
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let handles = &self.config.channels;

        info!("🚀 Monitoring {} competitor channels", handles.len());

        // Step 1: fetch channel data
        let channels = self.scraper.fetch_all(handles).await;
        if channels.is_empty() {
            return Err(anyhow!(
                "no channel data retrieved, check API key and network"
            ));
        }
        let channels_fetched = channels.len();
        let videos_seen: usize = channels.iter().map(|c| c.videos.len()).sum();
        info!(
            "✅ Fetched {} channels with {} total videos",
            channels_fetched, videos_seen
        );

        // Step 2: find outperforming videos
        let results = self.analyze_parallel(channels).await;
        let outperforming_total: usize = results.iter().map(|r| r.outperforming.len()).sum();
        info!(
            "📊 Found {} outperforming videos across {} channels",
            outperforming_total,
            results.len()
        );
        self.log_highlights(&results);

        // Step 3: persist the report artifact
        if self.config.output.save_report {
            self.write_report(&results).await?;
        }

        // Step 4: deliver the report
        let (notifications_sent, notifications_failed) = if self.dry_run {
            info!("Dry run: skipping notifications");
            (0, 0)
        } else {
            self.dispatch_notifications(&results).await
        };

        Ok(RunSummary {
            channels_requested: handles.len(),
            channels_fetched,
            videos_seen,
            channels_reported: results.len(),
            outperforming_total,
            notifications_sent,
            notifications_failed,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    /// Analyze every channel concurrently, one task per channel. Results are
    /// collected back into input order so channels with equal hit counts keep
    /// their configured ordering in the final ranking.
    pub async fn analyze_parallel(&self, channels: Vec<ChannelRecord>) -> Vec<ChannelAnalysis> {
        let semaphore = Arc::new(Semaphore::new(num_cpus::get().min(8)));
        let analysis_config = self.config.analysis.clone();

        let tasks: Vec<_> = channels
            .into_iter()
            .map(|channel| {
                let semaphore = Arc::clone(&semaphore);
                let analysis_config = analysis_config.clone();
                tokio::spawn(async move {
                    let _permit = semaphore.acquire().await.unwrap();
                    analyze_channel(&channel, &analysis_config)
                })
            })
            .collect();

        let mut results = Vec::new();
        for task in join_all(tasks).await {
            match task {
                Ok(result) => results.push(result),
                Err(e) => error!("Channel analysis task failed: {}", e),
            }
        }

        rank_channels(results)
    }

    fn log_highlights(&self, results: &[ChannelAnalysis]) {
        for result in results {
            info!(
                "   📺 {}: {} outperforming (avg: {} views)",
                result.channel_name,
                result.outperforming.len(),
                result.avg_views
            );
            for video in result.outperforming.iter().take(3) {
                let title: String = video.title.chars().take(50).collect();
                info!(
                    "      🔥 {}... ({} views, {}x avg)",
                    title, video.views, video.performance_ratio
                );
            }
        }
    }

    async fn write_report(&self, results: &[ChannelAnalysis]) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let report_path = self.output_dir.join("report.json");
        let artifact = ReportArtifact {
            generated_at: chrono::Local::now().to_rfc3339(),
            results,
        };
        let json_data = serde_json::to_string_pretty(&artifact)?;
        tokio::fs::write(&report_path, json_data).await?;

        info!("💾 Report saved to: {}", report_path.display());
        Ok(())
    }

    async fn dispatch_notifications(&self, results: &[ChannelAnalysis]) -> (usize, usize) {
        let notifiers = create_notifiers(&self.config);
        if notifiers.is_empty() {
            warn!("No notification channels configured, report not delivered");
            return (0, 0);
        }

        let mut sent = 0;
        let mut failed = 0;
        for notifier in &notifiers {
            match notifier.send(results).await {
                Ok(()) => {
                    info!("✅ {} report sent", notifier.name());
                    sent += 1;
                }
                Err(e) => {
                    error!("❌ {} report failed: {}", notifier.name(), e);
                    failed += 1;
                }
            }
        }
        (sent, failed)
    }
}
