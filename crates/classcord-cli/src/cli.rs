//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// classcord - Google Classroom announcements, forwarded to Discord
#[derive(Debug, Parser)]
#[command(name = "classcord")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CLASSCORD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines (for cron or systemd timers)
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List courses visible to the authorized account (default)
    Courses {
        /// Maximum number of courses to list
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// List announcements of one course
    Announcements {
        /// Course ID, as printed by `classcord courses`
        course_id: String,

        /// Maximum number of announcements to list
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Send every course announcement to the Discord channel
    Forward {
        /// Print the messages instead of sending them
        #[arg(long)]
        dry_run: bool,

        /// Discord channel ID (overrides config.toml)
        #[arg(long, env = "DISCORD_CHANNEL_ID")]
        channel_id: Option<String>,
    },

    /// Authorize access to Google Classroom and store the token
    Auth {
        /// Path to the Google Cloud Console credentials JSON file
        ///
        /// The path is remembered in config.toml for later runs.
        #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
        credentials_file: Option<PathBuf>,

        /// Authorize again even if a token is stored
        #[arg(long, short)]
        force: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_command_parses() {
        let cli = Cli::try_parse_from(["classcord"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn forward_flags() {
        let cli =
            Cli::try_parse_from(["classcord", "forward", "--dry-run", "--channel-id", "42"]).unwrap();
        match cli.command {
            Some(Command::Forward {
                dry_run,
                channel_id,
            }) => {
                assert!(dry_run);
                assert_eq!(channel_id.as_deref(), Some("42"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["classcord", "courses", "--limit", "3", "-v"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Command::Courses { limit: Some(3) })));
    }

    #[test]
    fn announcements_requires_course_id() {
        assert!(Cli::try_parse_from(["classcord", "announcements"]).is_err());
    }
}
