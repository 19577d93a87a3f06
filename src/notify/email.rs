use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::{format_ratio, format_views, total_outperforming, Notifier};
use crate::analyzer::ChannelAnalysis;
use crate::config::EmailConfig;

/// Maximum videos shown per channel in the email report; the analysis itself
/// is never truncated, only this rendering.
const MAX_VIDEOS_PER_CHANNEL: usize = 10;

/// Styled HTML email report sent over SMTP.
pub struct EmailNotifier {
    address: String,
    recipient: String,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    /// Build the notifier when sender, app password and recipient are all
    /// configured; `Ok(None)` otherwise.
    pub fn from_config(config: &EmailConfig) -> Result<Option<Self>> {
        let (Some(address), Some(password), Some(recipient)) = (
            config.address.clone(),
            config.app_password.clone(),
            config.recipient.clone(),
        ) else {
            return Ok(None);
        };

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(address.clone(), password))
            .build();

        Ok(Some(Self {
            address,
            recipient,
            mailer,
        }))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, results: &[ChannelAnalysis]) -> Result<()> {
        let today = Local::now().format("%B %d, %Y").to_string();
        let total = total_outperforming(results);

        let message = Message::builder()
            .from(format!("UAbility Monitor <{}>", self.address).parse()?)
            .to(self.recipient.parse()?)
            .subject(format!(
                "🎯 YouTube Competitor Report — {} Outperforming Videos ({})",
                total, today
            ))
            .multipart(MultiPart::alternative_plain_html(
                build_plain_report(results, &today),
                build_html_report(results, &today),
            ))?;

        info!("Sending email report to {}...", self.recipient);
        self.mailer.send(message).await?;
        info!("✅ Email sent successfully");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}

fn ratio_color(ratio: f64) -> &'static str {
    if ratio >= 2.0 {
        "#27ae60"
    } else if ratio >= 1.5 {
        "#f39c12"
    } else {
        "#3498db"
    }
}

/// Plain text fallback body listing the same top videos per channel.
pub fn build_plain_report(results: &[ChannelAnalysis], today: &str) -> String {
    let mut text = format!("YouTube Competitor Report for {}\n", today);
    text.push_str(&format!(
        "Found {} outperforming videos.\n\n",
        total_outperforming(results)
    ));

    for result in results {
        text.push_str(&format!("\n{} ({}):\n", result.channel_name, result.handle));
        text.push_str(&format!("  Average views: {}\n", result.avg_views));
        for video in result.outperforming.iter().take(MAX_VIDEOS_PER_CHANNEL) {
            text.push_str(&format!(
                "  - {} ({} views, {} above avg)\n    {}\n",
                video.title,
                format_views(video.views as u64),
                format_ratio(video.performance_ratio),
                video.link
            ));
        }
    }

    text
}

/// Styled HTML body: header, summary tiles, one card per channel.
pub fn build_html_report(results: &[ChannelAnalysis], today: &str) -> String {
    let total_channels = results.len();
    let total = total_outperforming(results);

    let mut html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body style="margin:0; padding:0; background-color:#0f0f0f; font-family: 'Segoe UI', Arial, sans-serif;">
<div style="max-width:700px; margin:20px auto; background-color:#1a1a2e; border-radius:12px; overflow:hidden;">

  <div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); padding:30px; text-align:center;">
    <h1 style="color:#ffffff; font-size:24px; margin:0 0 8px 0; font-weight:700;">
      🎯 YouTube Competitor Report
    </h1>
    <p style="color:#e0d4f7; font-size:14px; margin:0;">
      {today} &bull; UAbility Competitive Intelligence
    </p>
  </div>

  <div style="display:flex; padding:20px 30px; background-color:#16213e; border-bottom:1px solid #2a2a4a;">
    <div style="flex:1; text-align:center; padding:10px;">
      <div style="color:#667eea; font-size:28px; font-weight:700;">{total_channels}</div>
      <div style="color:#8888aa; font-size:12px; text-transform:uppercase; letter-spacing:1px;">Channels Analyzed</div>
    </div>
    <div style="flex:1; text-align:center; padding:10px; border-left:1px solid #2a2a4a;">
      <div style="color:#f093fb; font-size:28px; font-weight:700;">{total}</div>
      <div style="color:#8888aa; font-size:12px; text-transform:uppercase; letter-spacing:1px;">Outperforming Videos</div>
    </div>
  </div>

  <div style="padding:20px 30px;">
"#
    );

    if results.is_empty() {
        html.push_str(
            r#"    <div style="text-align:center; padding:40px; color:#8888aa;">
      <p style="font-size:18px;">No outperforming videos found today.</p>
      <p style="font-size:13px;">All competitor channels are performing at baseline.</p>
    </div>
"#,
        );
    }

    for result in results {
        html.push_str(&format!(
            r#"    <div style="margin-bottom:25px; border:1px solid #2a2a4a; border-radius:10px; overflow:hidden; background-color:#16213e;">
      <div style="padding:15px 20px; background-color:#1a1a3e; border-bottom:1px solid #2a2a4a;">
        <h2 style="color:#e0e0ff; font-size:16px; margin:0 0 4px 0;">
          📺 {name}
        </h2>
        <p style="color:#6a6a8a; font-size:12px; margin:0;">
          {handle} &bull; {subs} subscribers &bull; Avg: {avg} views/video
        </p>
      </div>
      <div style="padding:10px 15px;">
"#,
            name = result.channel_name,
            handle = result.handle,
            subs = format_views(result.subscribers),
            avg = format_views(result.avg_views),
        ));

        for video in result.outperforming.iter().take(MAX_VIDEOS_PER_CHANNEL) {
            let color = ratio_color(video.performance_ratio);
            let recent_badge = if video.is_recent {
                r#"<span style="background:#27ae60; color:#fff; font-size:10px; padding:2px 6px; border-radius:3px; margin-left:6px;">RECENT</span>"#
            } else {
                ""
            };

            html.push_str(&format!(
                r#"        <div style="display:flex; padding:10px; margin:5px 0; background-color:#1e2747; border-radius:8px; border-left:3px solid {color};">
          <div style="flex:1; min-width:0;">
            <a href="{link}" style="color:#c8c8ff; font-size:13px; text-decoration:none; font-weight:600; display:block; overflow:hidden; text-overflow:ellipsis; white-space:nowrap;">
              {title}
            </a>
            <div style="margin-top:5px; display:flex; gap:12px; flex-wrap:wrap;">
              <span style="color:#8888aa; font-size:11px;">👁 {views} views</span>
              <span style="color:{color}; font-size:11px; font-weight:700;">{ratio} above avg</span>
              <span style="color:#8888aa; font-size:11px;">🕐 {published}</span>
              {recent_badge}
            </div>
          </div>
        </div>
"#,
                color = color,
                link = video.link,
                title = video.title,
                views = format_views(video.views as u64),
                ratio = format_ratio(video.performance_ratio),
                published = video.published_time,
                recent_badge = recent_badge,
            ));
        }

        let remaining = result.outperforming.len().saturating_sub(MAX_VIDEOS_PER_CHANNEL);
        if remaining > 0 {
            html.push_str(&format!(
                r#"        <p style="color:#6a6a8a; font-size:12px; text-align:center; padding:5px;">
          ... and {} more outperforming videos
        </p>
"#,
                remaining
            ));
        }

        html.push_str("      </div>\n    </div>\n");
    }

    html.push_str(
        r#"  </div>

  <div style="padding:20px 30px; background-color:#0f0f1e; text-align:center; border-top:1px solid #2a2a4a;">
    <p style="color:#555577; font-size:11px; margin:0;">
      Automated by UAbility YouTube Monitor &bull; Powered by ScrapingDog API
    </p>
  </div>
</div>
</body>
</html>
"#,
    );

    html
}
