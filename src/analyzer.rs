use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{ChannelRecord, VideoRecord};

/// Thresholds for outperformance analysis.
///
/// Passed explicitly into every analysis call so the analyzer stays pure and
/// independently testable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Videos published within this many days count as recent
    pub recent_days: i64,

    /// Minimum views/average ratio to keep a video (1.0 = above average)
    pub min_performance_ratio: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            recent_days: 90,
            min_performance_ratio: 1.0,
        }
    }
}

/// A video scored against its channel's average view count.
///
/// Created only by the analyzer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVideo {
    pub id: String,
    pub title: String,
    pub link: String,
    pub views: i64,
    pub published_time: String,
    pub days_ago: Option<i64>,
    pub thumbnail: String,
    pub length: String,

    /// views / channel average, rounded to two decimals
    pub performance_ratio: f64,

    /// Publish age is known and within the configured recent window
    pub is_recent: bool,
}

/// Analysis output for a single channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAnalysis {
    pub channel_name: String,
    pub handle: String,
    pub subscribers: u64,

    /// Average views over valid videos, rounded to the nearest integer
    pub avg_views: u64,

    /// Number of videos with a positive view count
    pub videos_analyzed: usize,

    /// Videos strictly above the channel average, best ratio first
    pub outperforming: Vec<ScoredVideo>,
}

impl ChannelAnalysis {
    fn empty(channel: &ChannelRecord) -> Self {
        Self {
            channel_name: channel.channel_name.clone(),
            handle: channel.handle.clone(),
            subscribers: channel.subscribers,
            avg_views: 0,
            videos_analyzed: 0,
            outperforming: Vec::new(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn score_video(video: &VideoRecord, ratio: f64, config: &AnalysisConfig) -> ScoredVideo {
    ScoredVideo {
        id: video.id.clone(),
        title: video.title.clone(),
        link: video.link.clone(),
        views: video.views,
        published_time: video.published_time.clone(),
        days_ago: video.days_ago,
        thumbnail: video.thumbnail.clone(),
        length: video.length.clone(),
        performance_ratio: round2(ratio),
        is_recent: video.days_ago.map_or(false, |days| days <= config.recent_days),
    }
}

/// Analyze one channel's videos against its own average view count.
///
/// Videos with a non-positive view count are ignored entirely: they count
/// neither towards the average nor towards the output. A channel with no
/// usable videos produces an empty result rather than an error; that is a
/// normal case for small or new channels.
pub fn analyze_channel(channel: &ChannelRecord, config: &AnalysisConfig) -> ChannelAnalysis {
    let valid: Vec<&VideoRecord> = channel.videos.iter().filter(|v| v.views > 0).collect();

    if valid.is_empty() {
        warn!("No videos with valid view counts for {}", channel.channel_name);
        return ChannelAnalysis::empty(channel);
    }

    let total_views: i64 = valid.iter().map(|v| v.views).sum();
    let avg_views = total_views as f64 / valid.len() as f64;

    let mut scored: Vec<ScoredVideo> = valid
        .iter()
        .filter_map(|video| {
            let ratio = if avg_views > 0.0 {
                video.views as f64 / avg_views
            } else {
                0.0
            };
            if ratio >= config.min_performance_ratio {
                Some(score_video(video, ratio, config))
            } else {
                None
            }
        })
        .collect();

    // Stable sort keeps upload order between equal ratios
    scored.sort_by(|a, b| b.performance_ratio.total_cmp(&a.performance_ratio));

    // Meeting the configured threshold is not enough on its own: only videos
    // strictly above the channel average count as outperforming
    scored.retain(|v| v.performance_ratio > 1.0);

    info!(
        "{}: avg={:.0} views, {}/{} outperforming",
        channel.channel_name,
        avg_views,
        scored.len(),
        valid.len()
    );

    ChannelAnalysis {
        channel_name: channel.channel_name.clone(),
        handle: channel.handle.clone(),
        subscribers: channel.subscribers,
        avg_views: avg_views.round() as u64,
        videos_analyzed: valid.len(),
        outperforming: scored,
    }
}

/// Rank aggregated results: busiest channels first, quiet channels dropped.
///
/// Relies on a stable sort so channels with equal hit counts keep their
/// original order.
pub fn rank_channels(mut results: Vec<ChannelAnalysis>) -> Vec<ChannelAnalysis> {
    results.retain(|r| !r.outperforming.is_empty());
    results.sort_by(|a, b| b.outperforming.len().cmp(&a.outperforming.len()));
    results
}

/// Analyze every channel and keep only those with outperforming videos,
/// most hits first.
pub fn analyze_channels(channels: &[ChannelRecord], config: &AnalysisConfig) -> Vec<ChannelAnalysis> {
    let results = channels
        .iter()
        .map(|channel| analyze_channel(channel, config))
        .collect();
    let ranked = rank_channels(results);

    let total: usize = ranked.iter().map(|r| r.outperforming.len()).sum();
    info!(
        "Analysis complete: {} outperforming videos across {} channels",
        total,
        ranked.len()
    );

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, views: i64) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: format!("Video {}", id),
            link: VideoRecord::watch_link(id),
            views,
            published_time: "2 months ago".to_string(),
            days_ago: Some(60),
            thumbnail: String::new(),
            length: "10:00".to_string(),
        }
    }

    fn channel(name: &str, videos: Vec<VideoRecord>) -> ChannelRecord {
        ChannelRecord {
            channel_name: name.to_string(),
            handle: format!("@{}", name),
            subscribers: 10_000,
            total_videos: videos.len() as u64,
            videos,
        }
    }

    #[test]
    fn test_empty_channel() {
        let result = analyze_channel(&channel("empty", vec![]), &AnalysisConfig::default());
        assert_eq!(result.avg_views, 0);
        assert_eq!(result.videos_analyzed, 0);
        assert!(result.outperforming.is_empty());
    }

    #[test]
    fn test_all_invalid_views() {
        let ch = channel("zeroed", vec![video("a", 0), video("b", 0)]);
        let result = analyze_channel(&ch, &AnalysisConfig::default());
        assert_eq!(result.avg_views, 0);
        assert_eq!(result.videos_analyzed, 0);
        assert!(result.outperforming.is_empty());
    }

    #[test]
    fn test_negative_views_excluded_from_average() {
        // Only the positive counts feed the average
        let ch = channel("mixed", vec![video("a", -5), video("b", 100), video("c", 300)]);
        let result = analyze_channel(&ch, &AnalysisConfig::default());
        assert_eq!(result.videos_analyzed, 2);
        assert_eq!(result.avg_views, 200);
        assert_eq!(result.outperforming.len(), 1);
        assert_eq!(result.outperforming[0].id, "c");
    }

    #[test]
    fn test_single_spike_above_average() {
        // views [100, 100, 100, 400] -> avg 175, only the spike outperforms
        let ch = channel(
            "spike",
            vec![video("a", 100), video("b", 100), video("c", 100), video("d", 400)],
        );
        let result = analyze_channel(&ch, &AnalysisConfig::default());

        assert_eq!(result.avg_views, 175);
        assert_eq!(result.videos_analyzed, 4);
        assert_eq!(result.outperforming.len(), 1);
        assert_eq!(result.outperforming[0].id, "d");
        assert_eq!(result.outperforming[0].performance_ratio, 2.29);
    }

    #[test]
    fn test_uniform_views_produce_no_outperformers() {
        // Every ratio is exactly 1.0, which is not strictly above average
        let ch = channel("flat", vec![video("a", 100), video("b", 100), video("c", 100)]);
        let result = analyze_channel(&ch, &AnalysisConfig::default());
        assert_eq!(result.avg_views, 100);
        assert!(result.outperforming.is_empty());
    }

    #[test]
    fn test_ratio_monotonic_across_inclusion_boundary() {
        let base = vec![video("a", 100), video("b", 100), video("c", 100)];

        let mut below = base.clone();
        below.push(video("d", 100));
        let result = analyze_channel(&channel("below", below), &AnalysisConfig::default());
        assert!(result.outperforming.is_empty());

        // Bumping one view count flips it across the boundary
        let mut above = base;
        above.push(video("d", 105));
        let result = analyze_channel(&channel("above", above), &AnalysisConfig::default());
        assert_eq!(result.outperforming.len(), 1);
        assert_eq!(result.outperforming[0].id, "d");
    }

    #[test]
    fn test_rounded_ratio_is_the_cut_key() {
        // 1004 / 1001 = 1.003, which rounds to 1.0 and is therefore excluded
        let ch = channel(
            "edge",
            vec![video("a", 1000), video("b", 1000), video("c", 1000), video("d", 1004)],
        );
        let result = analyze_channel(&ch, &AnalysisConfig::default());
        assert!(result.outperforming.is_empty());
    }

    #[test]
    fn test_descending_order_with_stable_ties() {
        // c and d share a ratio; their upload order must survive the sort
        let ch = channel(
            "ties",
            vec![video("a", 10), video("b", 10), video("c", 40), video("d", 40)],
        );
        let result = analyze_channel(&ch, &AnalysisConfig::default());

        let ids: Vec<&str> = result.outperforming.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
        for pair in result.outperforming.windows(2) {
            assert!(pair[0].performance_ratio >= pair[1].performance_ratio);
        }
    }

    #[test]
    fn test_min_performance_ratio_raises_the_bar() {
        // views 500 against an exact average of 250 gives ratio 2.00
        let ch = channel("bar", vec![video("a", 500), video("b", 125), video("c", 125)]);

        let default_result = analyze_channel(&ch, &AnalysisConfig::default());
        assert_eq!(default_result.outperforming.len(), 1);
        assert_eq!(default_result.outperforming[0].performance_ratio, 2.00);

        let strict = AnalysisConfig {
            min_performance_ratio: 2.5,
            ..AnalysisConfig::default()
        };
        let strict_result = analyze_channel(&ch, &strict);
        assert!(strict_result.outperforming.is_empty());
    }

    #[test]
    fn test_recency_flag() {
        let mut fresh = video("a", 400);
        fresh.days_ago = Some(30);
        let mut stale = video("b", 390);
        stale.days_ago = Some(180);
        let mut unknown = video("c", 380);
        unknown.days_ago = None;
        let padding = video("d", 30);

        let ch = channel("recency", vec![fresh, stale, unknown, padding]);
        let result = analyze_channel(&ch, &AnalysisConfig::default());

        assert_eq!(result.outperforming.len(), 3);
        assert!(result.outperforming[0].is_recent);
        assert!(!result.outperforming[1].is_recent);
        // Unknown publish age is never recent, regardless of the window
        assert!(!result.outperforming[2].is_recent);
    }

    #[test]
    fn test_exact_average_no_premature_rounding() {
        // avg of [3, 4] is 3.5; the output field rounds but the ratios do not
        let ch = channel("frac", vec![video("a", 3), video("b", 4)]);
        let result = analyze_channel(&ch, &AnalysisConfig::default());
        assert_eq!(result.avg_views, 4); // 3.5 rounds away from zero
        assert_eq!(result.outperforming.len(), 1);
        assert_eq!(result.outperforming[0].performance_ratio, 1.14); // 4 / 3.5
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let ch = channel(
            "idem",
            vec![video("a", 123), video("b", 456), video("c", 789), video("d", 10)],
        );
        let config = AnalysisConfig::default();
        assert_eq!(analyze_channel(&ch, &config), analyze_channel(&ch, &config));
    }

    #[test]
    fn test_aggregate_drops_quiet_channels_and_sorts_by_hits() {
        let a = channel(
            "a",
            vec![video("a1", 10), video("a2", 10), video("a3", 100), video("a4", 90), video("a5", 80)],
        );
        let b = channel("b", vec![video("b1", 100), video("b2", 100), video("b3", 400)]);
        let c = channel("c", vec![video("c1", 50), video("c2", 50)]);

        let results = analyze_channels(&[b.clone(), a.clone(), c], &AnalysisConfig::default());

        // a has 3 hits, b has 1, c has none
        let names: Vec<&str> = results.iter().map(|r| r.channel_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_aggregate_stable_on_equal_hit_counts() {
        let first = channel("first", vec![video("f1", 100), video("f2", 100), video("f3", 400)]);
        let second = channel("second", vec![video("s1", 10), video("s2", 10), video("s3", 40)]);

        let results = analyze_channels(&[first, second], &AnalysisConfig::default());
        let names: Vec<&str> = results.iter().map(|r| r.channel_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_aggregate_empty_input() {
        let results = analyze_channels(&[], &AnalysisConfig::default());
        assert!(results.is_empty());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(2.2857), 2.29);
        assert_eq!(round2(1.004), 1.0);
        assert_eq!(round2(0.5714), 0.57);
    }
}
