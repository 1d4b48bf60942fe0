//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Dump the current configuration to stdout.
///
/// A literal bot token is masked; `env::` and `pass::` references are shown.
pub fn dump(config_path: &Path, config: &ClientConfig) -> ClientResult<()> {
    let mut shown = config.clone();
    if let Some(ref mut discord) = shown.discord
        && let Some(ref mut token) = discord.bot_token
        && !secret::is_reference(token)
    {
        *token = "********".to_string();
    }

    let toml_str = toml::to_string_pretty(&shown)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", config_path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
///
/// Checks what can be checked without network access: the credentials file,
/// the scope list, and the Discord section if present.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    let google = &config.google;

    if google.scopes.is_empty() {
        return Err(ClientError::Config(
            "[google] scopes must not be empty".to_string(),
        ));
    }

    classcord_auth::ClientCredentials::from_file(&google.credentials_file)?;
    println!(
        "Google credentials in {} are valid.",
        google.credentials_file.display()
    );

    if google.token_path.exists() {
        println!("Token file: {}", google.token_path.display());
    } else {
        println!(
            "No token at {} yet; run `classcord auth`.",
            google.token_path.display()
        );
    }

    if let Some(ref discord) = config.discord {
        discord
            .to_sink_config(None)
            .map_err(|e| ClientError::Config(format!("invalid [discord] section: {}", e)))?;
        println!("Discord settings are valid.");
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(config_path: &Path) -> ClientResult<()> {
    println!("config: {}", config_path.display());
    Ok(())
}
