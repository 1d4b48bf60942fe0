//! Discord REST sink.

use std::borrow::Cow;

use classcord_core::{
    BoxFuture, DISCORD_MESSAGE_LIMIT, NotificationSink, SinkError, SinkResult, ellipsis,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DiscordConfig;

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct DiscordErrorBody {
    message: Option<String>,
    retry_after: Option<f64>,
}

/// Posts messages to one Discord channel.
#[derive(Debug)]
pub struct DiscordSink {
    http_client: reqwest::Client,
    config: DiscordConfig,
}

impl DiscordSink {
    /// Creates a sink after validating `config`.
    pub fn new(config: DiscordConfig) -> SinkResult<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                "DiscordBot (",
                env!("CARGO_PKG_NAME"),
                ", ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()
            .map_err(|e| {
                SinkError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the sink settings.
    pub fn config(&self) -> &DiscordConfig {
        &self.config
    }

    async fn post(&self, text: &str) -> SinkResult<()> {
        let content = ellipsis(text, DISCORD_MESSAGE_LIMIT);
        if matches!(content, Cow::Owned(_)) {
            warn!(
                "message truncated to {} characters for discord",
                DISCORD_MESSAGE_LIMIT
            );
        }

        let response = self
            .http_client
            .post(self.config.messages_url())
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bot {}", self.config.bot_token),
            )
            .json(&CreateMessage { content: &content })
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    SinkError::network("request timeout")
                } else {
                    SinkError::network(format!("request failed: {}", e))
                };
                err.with_source(e)
            })?;

        let status = response.status();
        if status.is_success() {
            debug!("posted message to channel {}", self.config.channel_id);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<DiscordErrorBody>(&body).ok();
        let detail = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = parsed.and_then(|b| b.retry_after);
                Err(SinkError::rate_limited(format!(
                    "discord rate limit exceeded{}",
                    retry_after
                        .map(|s| format!(", retry after {:.1} seconds", s))
                        .unwrap_or_default()
                )))
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => Err(
                SinkError::unauthorized(format!("discord rejected the bot ({}): {}", status, detail)),
            ),
            _ => Err(SinkError::api(format!(
                "discord API error ({}): {}",
                status, detail
            ))),
        }
    }
}

impl NotificationSink for DiscordSink {
    fn name(&self) -> &str {
        "discord"
    }

    fn send_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, SinkResult<()>> {
        Box::pin(self.post(text))
    }
}
