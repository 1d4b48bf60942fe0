//! Discord sink settings.

use std::fmt;
use std::time::Duration;

use classcord_core::{SinkError, SinkResult};

/// Base URL for the Discord REST API.
const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Settings for [`DiscordSink`](crate::DiscordSink).
#[derive(Clone)]
pub struct DiscordConfig {
    /// REST API root, including the version segment.
    pub api_base: String,
    /// Bot token, sent as `Authorization: Bot <token>`.
    pub bot_token: String,
    /// Target text channel ID.
    pub channel_id: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
}

impl DiscordConfig {
    /// Creates settings for the given bot token and channel.
    pub fn new(bot_token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            api_base: DISCORD_API_BASE.to_string(),
            bot_token: bot_token.into(),
            channel_id: channel_id.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Builder method to set the API root.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the settings.
    pub fn validate(&self) -> SinkResult<()> {
        if self.bot_token.trim().is_empty() {
            return Err(SinkError::configuration("discord bot token is empty"));
        }
        if self.channel_id.trim().is_empty() {
            return Err(SinkError::configuration("discord channel_id is empty"));
        }
        if !self.channel_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(SinkError::configuration(format!(
                "discord channel_id must be numeric, got '{}'",
                self.channel_id
            )));
        }
        Ok(())
    }

    /// Returns the message endpoint for the configured channel.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/channels/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.channel_id
        )
    }
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}
