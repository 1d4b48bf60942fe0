//! Forward announcements to a notification sink.

use classcord_classroom::ClassroomClient;
use classcord_core::{DISCORD_MESSAGE_LIMIT, NotificationSink, StdoutSink, format_announcement};
use classcord_discord::DiscordSink;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Counts from one forwarding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardSummary {
    /// Courses visited.
    pub courses: usize,
    /// Messages delivered.
    pub sent: usize,
}

/// Runs `classcord forward`.
pub async fn run(
    config: &ClientConfig,
    dry_run: bool,
    channel_id: Option<String>,
) -> ClientResult<()> {
    // Sink settings are checked before the authorization prompt.
    let sink: Box<dyn NotificationSink> = if dry_run {
        Box::new(StdoutSink)
    } else {
        let sink_config = config
            .discord_settings()
            .to_sink_config(channel_id.as_deref())
            .map_err(ClientError::Config)?;
        Box::new(DiscordSink::new(sink_config)?)
    };

    let client = super::classroom_client(config).await?;
    let summary = forward_all(&client, sink.as_ref()).await?;

    info!(
        "forwarded {} announcements from {} courses via {}",
        summary.sent,
        summary.courses,
        sink.name()
    );
    if !dry_run {
        println!(
            "Forwarded {} announcements from {} courses.",
            summary.sent, summary.courses
        );
    }
    Ok(())
}

/// Sends every announcement of every course to `sink`.
///
/// Announcements go out oldest first within each course. Every listed
/// announcement is sent on every run. The first failure aborts the run.
pub async fn forward_all(
    client: &ClassroomClient,
    sink: &dyn NotificationSink,
) -> ClientResult<ForwardSummary> {
    let mut summary = ForwardSummary::default();

    for course in client.list_courses(None).await? {
        summary.courses += 1;
        let announcements = client.list_announcements(&course.id, None).await?;
        debug!(
            "course {} has {} announcements",
            course.id,
            announcements.len()
        );

        for announcement in announcements.iter().rev() {
            let message = format_announcement(&course, announcement, DISCORD_MESSAGE_LIMIT);
            sink.send_text(&message).await?;
            summary.sent += 1;
        }
    }

    Ok(summary)
}
