//! Discord delivery for classcord.
//!
//! [`DiscordSink`] posts messages to a single text channel through the
//! Discord REST API using a bot token. It implements
//! [`NotificationSink`](classcord_core::NotificationSink), so the forwarding
//! command does not know it is talking to Discord.

mod config;
mod sink;

pub use config::DiscordConfig;
pub use sink::DiscordSink;
