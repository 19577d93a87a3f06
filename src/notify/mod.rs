pub mod email;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::analyzer::ChannelAnalysis;
use crate::config::Config;

/// A delivery channel for the outperformance report.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, results: &[ChannelAnalysis]) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Build every notifier that has working credentials configured.
/// Misconfigured channels are skipped with a warning, never an error.
pub fn create_notifiers(config: &Config) -> Vec<Box<dyn Notifier>> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    match email::EmailNotifier::from_config(&config.email) {
        Ok(Some(notifier)) => notifiers.push(Box::new(notifier)),
        Ok(None) => warn!("Email credentials not configured, skipping email report"),
        Err(e) => warn!("Email notifier unavailable: {}", e),
    }

    match telegram::TelegramNotifier::from_config(&config.telegram) {
        Ok(Some(notifier)) => notifiers.push(Box::new(notifier)),
        Ok(None) => warn!("Telegram not configured, skipping Telegram alert"),
        Err(e) => warn!("Telegram notifier unavailable: {}", e),
    }

    notifiers
}

/// Compact view-count label: 1.2M, 3.4K, 999.
pub fn format_views(views: u64) -> String {
    if views >= 1_000_000 {
        format!("{:.1}M", views as f64 / 1_000_000.0)
    } else if views >= 1_000 {
        format!("{:.1}K", views as f64 / 1_000.0)
    } else {
        views.to_string()
    }
}

/// Performance ratio rendered as percent above average: 2.29 -> "+129%".
pub fn format_ratio(ratio: f64) -> String {
    format!("+{:.0}%", (ratio - 1.0) * 100.0)
}

/// Total outperforming videos across all channel results.
pub fn total_outperforming(results: &[ChannelAnalysis]) -> usize {
    results.iter().map(|r| r.outperforming.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    #[test]
    fn test_format_views() {
        assert_eq!(format_views(312), "312");
        assert_eq!(format_views(1_200), "1.2K");
        assert_eq!(format_views(43_500), "43.5K");
        assert_eq!(format_views(3_400_000), "3.4M");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(2.29), "+129%");
        assert_eq!(format_ratio(1.5), "+50%");
        assert_eq!(format_ratio(1.0), "+0%");
    }

    #[test]
    fn test_no_notifiers_without_credentials() {
        let config = ConfigBuilder::new().build();
        assert!(create_notifiers(&config).is_empty());
    }
}
