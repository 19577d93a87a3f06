use criterion::{black_box, criterion_group, criterion_main, Criterion};

use competitor_monitor::{analyze_channels, AnalysisConfig, ChannelRecord, VideoRecord};

fn synth_channel(index: usize, video_count: usize) -> ChannelRecord {
    let videos = (0..video_count)
        .map(|i| {
            // Deterministic spread with a spike every 17th video
            let views = if i % 17 == 0 { 250_000 } else { 3_000 + (i as i64 * 37) % 9_000 };
            VideoRecord {
                id: format!("c{}v{}", index, i),
                title: format!("Upload {}", i),
                link: VideoRecord::watch_link(&format!("c{}v{}", index, i)),
                views,
                published_time: "2 months ago".to_string(),
                days_ago: Some((i as i64 * 3) % 400),
                thumbnail: String::new(),
                length: "10:00".to_string(),
            }
        })
        .collect();

    ChannelRecord {
        channel_name: format!("channel-{}", index),
        handle: format!("@channel{}", index),
        subscribers: 100_000,
        total_videos: video_count as u64,
        videos,
    }
}

fn bench_analyze(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let channels: Vec<ChannelRecord> = (0..25).map(|i| synth_channel(i, 200)).collect();

    c.bench_function("analyze_channels_25x200", |b| {
        b.iter(|| analyze_channels(black_box(&channels), black_box(&config)))
    });
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
