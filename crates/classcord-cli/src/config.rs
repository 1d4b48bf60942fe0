//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/classcord/config.toml` by default. A missing file means
//! defaults everywhere.
//!
//! The Discord `bot_token` supports secret references:
//! - `pass::path/in/store`: resolved via `pass show`
//! - `env::VAR_NAME`: resolved from the environment
//! - plain text: used as-is

use std::path::{Path, PathBuf};
use std::time::Duration;

use classcord_auth::CredentialManager;
use classcord_classroom::ClassroomConfig;
use classcord_discord::DiscordConfig;
use serde::{Deserialize, Serialize};

/// Environment variable consulted when `[discord] bot_token` is not set.
pub const BOT_TOKEN_ENV: &str = "DISCORD_BOT_TOKEN";

/// Read-only access to course metadata.
pub const SCOPE_COURSES_READONLY: &str =
    "https://www.googleapis.com/auth/classroom.courses.readonly";

/// Read-only access to course announcements.
pub const SCOPE_ANNOUNCEMENTS_READONLY: &str =
    "https://www.googleapis.com/auth/classroom.announcements.readonly";

/// Configuration for the classcord client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Google OAuth settings.
    pub google: GoogleSettings,

    /// Classroom API settings.
    pub classroom: ClassroomSettings,

    /// Discord delivery settings.
    pub discord: Option<DiscordSettings>,
}

/// Google OAuth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// Client credentials JSON downloaded from the Google Cloud Console.
    pub credentials_file: PathBuf,

    /// Where the access/refresh token record is stored.
    pub token_path: PathBuf,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,

    /// Seconds to wait for the authorization code. `0` waits forever.
    pub prompt_timeout_secs: u64,

    /// Open the authorization URL in the default browser.
    pub open_browser: bool,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            scopes: vec![
                SCOPE_COURSES_READONLY.to_string(),
                SCOPE_ANNOUNCEMENTS_READONLY.to_string(),
            ],
            prompt_timeout_secs: 300,
            open_browser: false,
        }
    }
}

impl GoogleSettings {
    /// Builds a credential manager for these settings.
    pub fn credential_manager(&self) -> CredentialManager {
        let timeout = match self.prompt_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        CredentialManager::new(&self.credentials_file, &self.token_path, self.scopes.clone())
            .with_prompt_timeout(timeout)
    }
}

/// Classroom API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassroomSettings {
    /// Items requested per page.
    pub page_size: usize,

    /// API root override.
    pub base_url: Option<String>,
}

impl Default for ClassroomSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            base_url: None,
        }
    }
}

impl ClassroomSettings {
    /// Converts to client configuration.
    pub fn to_client_config(&self) -> ClassroomConfig {
        let config = ClassroomConfig::default().with_page_size(self.page_size);
        match self.base_url {
            Some(ref url) => config.with_base_url(url),
            None => config,
        }
    }
}

/// Discord delivery settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DiscordSettings {
    /// Bot token (supports `pass::` and `env::` prefixes).
    pub bot_token: Option<String>,

    /// Target channel ID.
    pub channel_id: Option<String>,

    /// REST API root override.
    pub api_base: Option<String>,
}

impl std::fmt::Debug for DiscordSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordSettings")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("channel_id", &self.channel_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl DiscordSettings {
    /// Converts to sink configuration.
    ///
    /// `channel_override` wins over the configured channel. The bot token is
    /// resolved through `secret::resolve()`, falling back to
    /// `$DISCORD_BOT_TOKEN` when the file has none.
    pub fn to_sink_config(&self, channel_override: Option<&str>) -> Result<DiscordConfig, String> {
        let token = match self.bot_token.as_deref() {
            Some(raw) => crate::secret::resolve(raw)
                .map_err(|e| format!("failed to resolve discord bot_token: {}", e))?,
            None => std::env::var(BOT_TOKEN_ENV).map_err(|_| {
                format!(
                    "Discord bot token not found. Add to {}:\n  \
                     [discord]\n  \
                     bot_token = \"env::{}\"\n\n  \
                     Or export {}",
                    ClientConfig::default_path().display(),
                    BOT_TOKEN_ENV,
                    BOT_TOKEN_ENV
                )
            })?,
        };

        let channel_id = channel_override
            .or(self.channel_id.as_deref())
            .ok_or_else(|| {
                "discord channel_id is missing; set it in [discord] or pass --channel-id"
                    .to_string()
            })?;

        let config = DiscordConfig::new(token, channel_id);
        let config = match self.api_base {
            Some(ref base) => config.with_api_base(base),
            None => config,
        };
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("classcord")
    }

    /// Returns the Discord settings, or an empty section if there is none.
    pub fn discord_settings(&self) -> DiscordSettings {
        self.discord.clone().unwrap_or_default()
    }
}
