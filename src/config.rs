use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::analyzer::AnalysisConfig;

/// Configuration for the competitor monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Competitor channel handles to track, in @handle form
    pub channels: Vec<String>,

    /// Outperformance thresholds
    pub analysis: AnalysisConfig,

    /// ScrapingDog API client settings
    pub scraper: ScraperConfig,

    /// SMTP report delivery
    pub email: EmailConfig,

    /// Telegram report delivery
    pub telegram: TelegramConfig,

    /// Report artifacts and logging
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// ScrapingDog API key (env: SCRAPINGDOG_API_KEY)
    pub api_key: Option<String>,

    /// Channel API endpoint
    pub endpoint: String,

    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Attempts per channel before giving up
    pub max_retries: u32,

    /// Initial retry backoff in seconds, doubles each retry
    pub retry_backoff_seconds: u64,

    /// Pause between channel requests in milliseconds
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP relay host
    pub smtp_host: String,

    /// SMTP submission port (STARTTLS)
    pub smtp_port: u16,

    /// Sender address (env: GMAIL_ADDRESS)
    pub address: Option<String>,

    /// App password for the sender account (env: GMAIL_APP_PASSWORD)
    pub app_password: Option<String>,

    /// Report recipient (env: RECIPIENT_EMAIL)
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token (env: TELEGRAM_BOT_TOKEN)
    pub bot_token: Option<String>,

    /// Target chat or group id (env: TELEGRAM_CHAT_ID)
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for report artifacts
    pub base_dir: PathBuf,

    /// Write report.json after each run
    pub save_report: bool,

    /// Log level
    pub log_level: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.scrapingdog.com/youtube/channel/".to_string(),
            request_timeout_seconds: 30,
            max_retries: 3,
            retry_backoff_seconds: 2,
            request_delay_ms: 1500, // Stay under the API rate limit
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            address: None,
            app_password: None,
            recipient: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./output"),
            save_report: true,
            log_level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Competitor channels in the AI / no-code / automation niche
            channels: vec![
                "@buildwithkaran".to_string(),
                "@AIJasonZ".to_string(),
                "@MattVidPro".to_string(),
                "@WorldofAI".to_string(),
                "@AllAboutAI".to_string(),
                "@maboroshitech".to_string(),
                "@SkillLeapAI".to_string(),
                "@TheAIGRID".to_string(),
                "@NoCodeFamily".to_string(),
                "@MattWolfe".to_string(),
                "@1littlecoder".to_string(),
                "@GregIsenberg".to_string(),
                "@aiaborsh".to_string(),
                "@income_stream_surfers".to_string(),
                "@FutureTools".to_string(),
            ],
            analysis: AnalysisConfig::default(),
            scraper: ScraperConfig::default(),
            email: EmailConfig::default(),
            telegram: TelegramConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first parseable file in the usual
    /// locations, falling back to defaults. Environment variables are
    /// applied on top either way.
    pub fn load() -> Result<Self> {
        let config_paths = [
            "competitor-monitor.toml",
            "config/competitor-monitor.toml",
            "~/.config/competitor-monitor/config.toml",
            "/etc/competitor-monitor/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config.apply_env();
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config file {}: {}", path, e))?;
        let mut config: Config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Cannot parse config file {}: {}", path, e))?;
        tracing::info!("📄 Loaded configuration from: {}", path);
        config.apply_env();
        Ok(config)
    }

    /// Override secrets and credentials from environment variables. A .env
    /// file loaded at startup feeds through here as well.
    pub fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var("SCRAPINGDOG_API_KEY") {
            if !api_key.is_empty() {
                self.scraper.api_key = Some(api_key);
            }
        }
        if let Ok(address) = std::env::var("GMAIL_ADDRESS") {
            if !address.is_empty() {
                self.email.address = Some(address);
            }
        }
        if let Ok(password) = std::env::var("GMAIL_APP_PASSWORD") {
            if !password.is_empty() {
                self.email.app_password = Some(password);
            }
        }
        if let Ok(recipient) = std::env::var("RECIPIENT_EMAIL") {
            if !recipient.is_empty() {
                self.email.recipient = Some(recipient);
            }
        }
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if !token.is_empty() {
                self.telegram.bot_token = Some(token);
            }
        }
        if let Ok(chat_id) = std::env::var("TELEGRAM_CHAT_ID") {
            if !chat_id.is_empty() {
                self.telegram.chat_id = Some(chat_id);
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(anyhow!("channel list must not be empty"));
        }

        if self.analysis.recent_days <= 0 {
            return Err(anyhow!("recent_days must be greater than 0"));
        }

        if self.analysis.min_performance_ratio < 0.0 {
            return Err(anyhow!("min_performance_ratio must not be negative"));
        }

        if self.scraper.max_retries == 0 {
            return Err(anyhow!("max_retries must be greater than 0"));
        }

        if Url::parse(&self.scraper.endpoint).is_err() {
            return Err(anyhow!("invalid scraper endpoint: {}", self.scraper.endpoint));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Competitor Monitor Configuration:\n\
            - Channels tracked: {}\n\
            - Recent window: {} days\n\
            - Minimum performance ratio: {}\n\
            - API key configured: {}\n\
            - Email configured: {}\n\
            - Telegram configured: {}\n\
            - Output directory: {}",
            self.channels.len(),
            self.analysis.recent_days,
            self.analysis.min_performance_ratio,
            self.scraper.api_key.is_some(),
            self.email.address.is_some() && self.email.recipient.is_some(),
            self.telegram.bot_token.is_some() && self.telegram.chat_id.is_some(),
            self.output.base_dir.display()
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_channels(mut self, channels: Vec<String>) -> Self {
        self.config.channels = channels;
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.scraper.api_key = Some(api_key);
        self
    }

    pub fn with_recent_days(mut self, days: i64) -> Self {
        self.config.analysis.recent_days = days;
        self
    }

    pub fn with_min_performance_ratio(mut self, ratio: f64) -> Self {
        self.config.analysis.min_performance_ratio = ratio;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
