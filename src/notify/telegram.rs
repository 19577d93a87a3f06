use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info};

use super::{format_ratio, format_views, total_outperforming, Notifier};
use crate::analyzer::ChannelAnalysis;
use crate::config::TelegramConfig;

/// Maximum videos shown per channel in a Telegram alert.
const MAX_VIDEOS_PER_CHANNEL: usize = 5;

/// Telegram caps messages at 4096 characters; leave headroom for separators.
const MESSAGE_LIMIT: usize = 4000;

const SECTION_SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━";

/// Outperformance alerts delivered through the Telegram Bot API.
pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Build the notifier when both token and chat id are configured;
    /// `Ok(None)` otherwise.
    pub fn from_config(config: &TelegramConfig) -> Result<Option<Self>> {
        let (Some(bot_token), Some(chat_id)) =
            (config.bot_token.clone(), config.chat_id.clone())
        else {
            return Ok(None);
        };

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Some(Self {
            client,
            bot_token,
            chat_id,
        }))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, results: &[ChannelAnalysis]) -> Result<()> {
        let today = Local::now().format("%B %d, %Y").to_string();
        let message = build_message(results, &today);
        let parts = split_message(&message);
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        let mut failures = 0;
        for (i, part) in parts.iter().enumerate() {
            let payload = json!({
                "chat_id": self.chat_id,
                "text": part,
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            });

            let response = self.client.post(&url).json(&payload).send().await?;
            if response.status().is_success() {
                info!("Telegram message {}/{} sent", i + 1, parts.len());
            } else {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!(
                    "Telegram API error: {} - {}",
                    status,
                    body.chars().take(200).collect::<String>()
                );
                failures += 1;
            }
        }

        if failures > 0 {
            return Err(anyhow!("{} of {} Telegram messages failed", failures, parts.len()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

/// Build the full HTML-formatted alert text.
pub fn build_message(results: &[ChannelAnalysis], today: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("🎯 <b>YouTube Competitor Report</b>".to_string());
    lines.push(format!("📅 {}", today));
    lines.push(format!(
        "📊 {} outperforming videos across {} channels",
        total_outperforming(results),
        results.len()
    ));
    lines.push(String::new());

    if results.is_empty() {
        lines.push("✅ No outperforming videos found today. All competitors at baseline.".to_string());
        return lines.join("\n");
    }

    for result in results {
        lines.push(SECTION_SEPARATOR.to_string());
        lines.push(format!(
            "📺 <b>{}</b> ({})",
            result.channel_name, result.handle
        ));
        lines.push(format!(
            "   Avg: {} views | {} hits",
            format_views(result.avg_views),
            result.outperforming.len()
        ));
        lines.push(String::new());

        for video in result.outperforming.iter().take(MAX_VIDEOS_PER_CHANNEL) {
            let title: String = video.title.chars().take(60).collect();
            let recent = if video.is_recent { " 🆕" } else { "" };

            lines.push(format!("  🔥 <a href=\"{}\">{}</a>{}", video.link, title, recent));
            lines.push(format!(
                "     👁 {} views | {} above avg",
                format_views(video.views as u64),
                format_ratio(video.performance_ratio)
            ));
            lines.push(String::new());
        }

        let remaining = result.outperforming.len().saturating_sub(MAX_VIDEOS_PER_CHANNEL);
        if remaining > 0 {
            lines.push(format!("   ... and {} more", remaining));
            lines.push(String::new());
        }
    }

    lines.push(SECTION_SEPARATOR.to_string());
    lines.push("🤖 <i>UAbility YouTube Monitor</i>".to_string());

    lines.join("\n")
}

/// Split an over-long alert into several messages, breaking on channel
/// section separators so no single send exceeds the API limit.
pub fn split_message(message: &str) -> Vec<String> {
    if message.chars().count() <= MESSAGE_LIMIT {
        return vec![message.to_string()];
    }

    let mut messages = Vec::new();
    let mut parts = message.split(SECTION_SEPARATOR);
    let mut current = parts.next().unwrap_or_default().to_string();

    for part in parts {
        if current.chars().count() + part.chars().count() + 20 > MESSAGE_LIMIT {
            messages.push(current);
            current = format!("{}{}", SECTION_SEPARATOR, part);
        } else {
            current.push_str(SECTION_SEPARATOR);
            current.push_str(part);
        }
    }
    if !current.is_empty() {
        messages.push(current);
    }

    messages
}
