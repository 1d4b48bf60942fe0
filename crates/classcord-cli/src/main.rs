//! classcord CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use classcord_cli::cli::{Cli, Command, ConfigAction};
use classcord_cli::commands;
use classcord_cli::config::ClientConfig;
use classcord_cli::error::{ClientError, ClientResult};
use classcord_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else if cli.json_logs {
        TracingConfig::unattended()
    } else {
        TracingConfig::default().with_level(Level::WARN)
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    // An explicit --config must exist; the default location may be absent.
    let (config_path, config) = match cli.config {
        Some(path) => {
            let config = ClientConfig::load_from(&path).map_err(ClientError::Config)?;
            (path, config)
        }
        None => (
            ClientConfig::default_path(),
            ClientConfig::load().map_err(ClientError::Config)?,
        ),
    };

    match cli.command {
        None => commands::courses::courses(&config, None).await,
        Some(Command::Courses { limit }) => commands::courses::courses(&config, limit).await,
        Some(Command::Announcements { course_id, limit }) => {
            commands::courses::announcements(&config, &course_id, limit).await
        }
        Some(Command::Forward {
            dry_run,
            channel_id,
        }) => commands::forward::run(&config, dry_run, channel_id).await,
        Some(Command::Auth {
            credentials_file,
            force,
        }) => commands::auth::run(&config_path, &config, credentials_file, force).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config_path, &config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}
