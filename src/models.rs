use serde::{Deserialize, Serialize};

/// A single video as supplied by the ingestion layer.
///
/// `views <= 0` means the view count could not be determined; such videos
/// are excluded from analysis entirely. `days_ago` is `None` when the
/// publish label could not be parsed into an age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// YouTube video id, unique within a channel
    pub id: String,

    /// Video title
    pub title: String,

    /// Watch URL
    pub link: String,

    /// Raw view count, non-positive when unknown
    pub views: i64,

    /// Original publish label, e.g. "3 months ago"
    pub published_time: String,

    /// Approximate days since publish, `None` when unparsable
    pub days_ago: Option<i64>,

    /// Thumbnail URL
    pub thumbnail: String,

    /// Duration label, e.g. "12:34"
    pub length: String,
}

/// One competitor channel as returned by a single fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Display name of the channel
    pub channel_name: String,

    /// Channel handle, e.g. "@MattWolfe"
    pub handle: String,

    /// Subscriber count
    pub subscribers: u64,

    /// Total video count reported on the channel page
    pub total_videos: u64,

    /// Videos in the order the channel page lists them
    pub videos: Vec<VideoRecord>,
}

impl VideoRecord {
    /// Canonical watch URL for a video id
    pub fn watch_link(id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_link() {
        assert_eq!(
            VideoRecord::watch_link("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
