//! classcord command-line interface.
//!
//! Lists Google Classroom courses and announcements and forwards
//! announcements to a Discord channel.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
