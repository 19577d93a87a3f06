/// YouTube Competitor Monitor - Rust Implementation
///
/// Fetches competitor channel statistics from the ScrapingDog YouTube API,
/// finds videos performing above each channel's own average view count, and
/// delivers email and Telegram reports.

pub mod analyzer;
pub mod config;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod scraper;

// Re-export main types for easy access
pub use crate::analyzer::{
    analyze_channel, analyze_channels, AnalysisConfig, ChannelAnalysis, ScoredVideo,
};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::models::{ChannelRecord, VideoRecord};
pub use crate::notify::{create_notifiers, Notifier};
pub use crate::pipeline::{MonitorPipeline, RunSummary};
pub use crate::scraper::{ScraperError, ScrapingDogClient};
