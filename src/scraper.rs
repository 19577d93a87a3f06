use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ScraperConfig;
use crate::models::{ChannelRecord, VideoRecord};

/// Errors from the ScrapingDog channel API.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ScrapingDog API key not configured")]
    MissingApiKey,

    #[error("all {0} fetch attempts failed")]
    Exhausted(u32),
}

/// Parse a view count that may arrive as a JSON number or a display string
/// such as "3,903,884 views", "876,754,415 views", "3M" or "1.2K".
/// Unparsable input maps to 0.
pub fn parse_view_count(raw: &Value) -> i64 {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => parse_view_count_str(s),
        _ => 0,
    }
}

fn parse_view_count_str(raw: &str) -> i64 {
    let cleaned = raw.to_lowercase().replace(',', "").replace("views", "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return 0;
    }

    // Shorthand like "3M", "1.2K", "19B"
    for (suffix, multiplier) in [("k", 1_000.0), ("m", 1_000_000.0), ("b", 1_000_000_000.0)] {
        if let Some(number) = cleaned.strip_suffix(suffix) {
            return number
                .trim()
                .parse::<f64>()
                .map(|n| (n * multiplier) as i64)
                .unwrap_or(0);
        }
    }

    cleaned.parse::<f64>().map(|n| n as i64).unwrap_or(0)
}

/// Parse relative publish labels like "3 months ago" or "1 day ago" into an
/// approximate number of days. Returns `None` when the label has some other
/// shape ("Streamed 2 weeks ago", empty, a date).
pub fn parse_relative_time(raw: &str) -> Option<i64> {
    let re = Regex::new(r"^(\d+)\s+(hour|day|week|month|year)s?\s+ago$").ok()?;
    let label = raw.trim().to_lowercase();
    let captures = re.captures(&label)?;
    let number: i64 = captures.get(1)?.as_str().parse().ok()?;

    match captures.get(2)?.as_str() {
        "hour" => Some(0),
        "day" => Some(number),
        "week" => Some(number * 7),
        "month" => Some(number * 30),
        "year" => Some(number * 365),
        _ => None,
    }
}

/// Raw ScrapingDog channel response shape. Fields the API sometimes returns
/// as numbers and sometimes as display strings come in as `Value`.
#[derive(Debug, Default, Deserialize)]
struct ChannelResponse {
    #[serde(default)]
    channel: ChannelSection,
    #[serde(default)]
    about: AboutSection,
    #[serde(default)]
    videos_sections: Vec<VideoSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ChannelSection {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AboutSection {
    #[serde(default)]
    subscribers: Option<Value>,
    #[serde(default)]
    videos: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoSection {
    #[serde(default)]
    videos: Vec<RawVideo>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVideo {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    views: Option<Value>,
    #[serde(default)]
    published_time: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    length: Option<String>,
}

/// Flatten a raw channel response into a clean `ChannelRecord`. Videos are
/// collected across all sections and de-duplicated by id.
fn build_channel_record(response: ChannelResponse, handle: &str) -> ChannelRecord {
    let channel_name = response
        .channel
        .title
        .unwrap_or_else(|| handle.to_string());
    let subscribers = response
        .about
        .subscribers
        .as_ref()
        .map(parse_view_count)
        .unwrap_or(0)
        .max(0) as u64;
    let total_videos = response
        .about
        .videos
        .as_ref()
        .map(parse_view_count)
        .unwrap_or(0)
        .max(0) as u64;

    let mut seen_ids = HashSet::new();
    let mut videos = Vec::new();

    for section in response.videos_sections {
        for raw in section.videos {
            if raw.id.is_empty() || !seen_ids.insert(raw.id.clone()) {
                continue;
            }
            let published_time = raw.published_time.unwrap_or_default();
            videos.push(VideoRecord {
                title: raw.title.unwrap_or_else(|| "Untitled".to_string()),
                link: raw.link.unwrap_or_else(|| VideoRecord::watch_link(&raw.id)),
                views: raw.views.as_ref().map(parse_view_count).unwrap_or(0),
                days_ago: parse_relative_time(&published_time),
                thumbnail: raw.thumbnail.unwrap_or_default(),
                length: raw.length.unwrap_or_default(),
                published_time,
                id: raw.id,
            });
        }
    }

    info!(
        "Parsed {}: {} videos, {} subscribers",
        channel_name,
        videos.len(),
        subscribers
    );

    ChannelRecord {
        channel_name,
        handle: handle.to_string(),
        subscribers,
        total_videos,
        videos,
    }
}

/// ScrapingDog YouTube Channel API client.
#[derive(Clone)]
pub struct ScrapingDogClient {
    client: Client,
    config: ScraperConfig,
}

impl ScrapingDogClient {
    pub fn new(config: ScraperConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    async fn fetch_once(&self, handle: &str) -> Result<ChannelRecord, ScraperError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ScraperError::MissingApiKey)?;

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("api_key", api_key), ("channel_id", handle)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScraperError::Api {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        let data: ChannelResponse = response.json().await?;
        Ok(build_channel_record(data, handle))
    }

    /// Fetch one channel, retrying failures with exponential backoff.
    pub async fn fetch_channel(&self, handle: &str) -> Result<ChannelRecord, ScraperError> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            if attempt > 0 {
                let delay =
                    Duration::from_secs(self.config.retry_backoff_seconds * 2u64.pow(attempt - 1));
                warn!(
                    "Retry {}/{} for {}, waiting {:?}",
                    attempt, self.config.max_retries, handle, delay
                );
                tokio::time::sleep(delay).await;
            }

            info!("Fetching channel data for {} (attempt {})", handle, attempt + 1);
            match self.fetch_once(handle).await {
                Ok(record) => return Ok(record),
                Err(e) => {
                    warn!("Fetch failed for {}: {}", handle, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(ScraperError::Exhausted(self.config.max_retries)))
    }

    /// Fetch every configured channel sequentially, pacing requests to stay
    /// under the API rate limit. Failed channels are skipped, not fatal.
    pub async fn fetch_all(&self, handles: &[String]) -> Vec<ChannelRecord> {
        let mut records = Vec::new();

        for (i, handle) in handles.iter().enumerate() {
            match self.fetch_channel(handle).await {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping {} after failed fetch: {}", handle, e),
            }

            if i + 1 < handles.len() {
                tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
            }
        }

        info!(
            "Successfully fetched {}/{} channels",
            records.len(),
            handles.len()
        );
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_view_count_numbers() {
        assert_eq!(parse_view_count(&json!(33)), 33);
        assert_eq!(parse_view_count(&json!(3.9)), 3);
        assert_eq!(parse_view_count(&json!(-1)), -1);
    }

    #[test]
    fn test_parse_view_count_strings() {
        assert_eq!(parse_view_count(&json!("876,754,415 views")), 876_754_415);
        assert_eq!(parse_view_count(&json!("3,903,884 views")), 3_903_884);
        assert_eq!(parse_view_count(&json!("33")), 33);
        assert_eq!(parse_view_count(&json!("3M")), 3_000_000);
        assert_eq!(parse_view_count(&json!("1.2K")), 1_200);
        assert_eq!(parse_view_count(&json!("19m")), 19_000_000);
        assert_eq!(parse_view_count(&json!("2B")), 2_000_000_000);
    }

    #[test]
    fn test_parse_view_count_garbage() {
        assert_eq!(parse_view_count(&json!("")), 0);
        assert_eq!(parse_view_count(&json!("views")), 0);
        assert_eq!(parse_view_count(&json!("N/A")), 0);
        assert_eq!(parse_view_count(&json!(null)), 0);
        assert_eq!(parse_view_count(&json!({"nested": true})), 0);
    }

    #[test]
    fn test_parse_relative_time() {
        assert_eq!(parse_relative_time("3 hours ago"), Some(0));
        assert_eq!(parse_relative_time("1 day ago"), Some(1));
        assert_eq!(parse_relative_time("2 weeks ago"), Some(14));
        assert_eq!(parse_relative_time("3 months ago"), Some(90));
        assert_eq!(parse_relative_time("2 years ago"), Some(730));
        assert_eq!(parse_relative_time(" 1 Month ago "), Some(30));
    }

    #[test]
    fn test_parse_relative_time_unparsable() {
        assert_eq!(parse_relative_time(""), None);
        assert_eq!(parse_relative_time("yesterday"), None);
        assert_eq!(parse_relative_time("Streamed 2 weeks ago"), None);
        assert_eq!(parse_relative_time("2024-01-01"), None);
    }

    #[test]
    fn test_build_channel_record() {
        let response: ChannelResponse = serde_json::from_value(json!({
            "channel": { "title": "Matt Wolfe" },
            "about": { "subscribers": "712K", "videos": 540 },
            "videos_sections": [
                {
                    "videos": [
                        {
                            "id": "abc",
                            "title": "AI News",
                            "link": "https://www.youtube.com/watch?v=abc",
                            "views": "1.2M views",
                            "published_time": "2 days ago",
                            "thumbnail": "https://i.ytimg.com/abc.jpg",
                            "length": "18:42"
                        },
                        { "id": "def", "views": 420, "published_time": "soon" }
                    ]
                },
                {
                    "videos": [
                        { "id": "abc", "title": "duplicate, must be dropped" }
                    ]
                }
            ]
        }))
        .unwrap();

        let record = build_channel_record(response, "@MattWolfe");

        assert_eq!(record.channel_name, "Matt Wolfe");
        assert_eq!(record.handle, "@MattWolfe");
        assert_eq!(record.subscribers, 712_000);
        assert_eq!(record.total_videos, 540);
        assert_eq!(record.videos.len(), 2);

        assert_eq!(record.videos[0].id, "abc");
        assert_eq!(record.videos[0].views, 1_200_000);
        assert_eq!(record.videos[0].days_ago, Some(2));

        // Missing fields fall back instead of failing
        assert_eq!(record.videos[1].title, "Untitled");
        assert_eq!(record.videos[1].link, "https://www.youtube.com/watch?v=def");
        assert_eq!(record.videos[1].days_ago, None);
    }

    #[test]
    fn test_build_channel_record_empty_response() {
        let response: ChannelResponse = serde_json::from_value(json!({})).unwrap();
        let record = build_channel_record(response, "@ghost");

        assert_eq!(record.channel_name, "@ghost");
        assert_eq!(record.subscribers, 0);
        assert!(record.videos.is_empty());
    }

    #[test]
    fn test_fetch_without_api_key() {
        let client = ScrapingDogClient::new(ScraperConfig {
            api_key: None,
            max_retries: 1,
            ..ScraperConfig::default()
        })
        .unwrap();

        let err = tokio_test::block_on(client.fetch_channel("@nobody")).unwrap_err();
        assert!(matches!(err, ScraperError::MissingApiKey));
    }
}
