//! Authentication command.

use std::path::{Path, PathBuf};

use classcord_auth::{AuthState, ConsolePrompt};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Runs the credential lifecycle on its own.
///
/// With `force`, a stored token is ignored and replaced once the new code
/// has been exchanged. A `credentials_file` given on the command line is
/// written to `config_path` so later runs find it.
pub async fn run(
    config_path: &Path,
    config: &ClientConfig,
    credentials_file: Option<PathBuf>,
    force: bool,
) -> ClientResult<()> {
    let mut google = config.google.clone();
    if let Some(ref path) = credentials_file {
        google.credentials_file = path.clone();
    }

    let mut manager = google.credential_manager().with_reauthorize(force);
    let mut prompt = ConsolePrompt::new().with_open_browser(google.open_browser);
    let client = manager.load_or_authorize(&mut prompt).await?;

    if manager.history().contains(&AuthState::TokenPersisted) {
        println!();
        println!("Token stored to {}", google.token_path.display());
    } else {
        println!(
            "Already authorized (token {}).",
            google.token_path.display()
        );
        println!("Use --force to re-authorize.");
    }
    info!(
        "authorized client {} with scopes: {}",
        client.credentials().client_id,
        client.token().scope
    );

    if let Some(path) = credentials_file {
        remember_credentials_file(config_path, &path)?;
        println!("Credentials file saved to {}", config_path.display());
    }

    Ok(())
}

/// Records `credentials_file` under `[google]` in the config file.
///
/// Other keys, comments and formatting are preserved. The file and its
/// directory are created if needed.
pub fn remember_credentials_file(config_path: &Path, credentials_file: &Path) -> ClientResult<()> {
    let content = if config_path.exists() {
        std::fs::read_to_string(config_path)?
    } else {
        String::new()
    };

    let mut doc = content.parse::<toml_edit::DocumentMut>().map_err(|e| {
        ClientError::Config(format!(
            "could not parse {} for writing: {}",
            config_path.display(),
            e
        ))
    })?;

    if !doc.contains_key("google") {
        doc["google"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let google = doc["google"].as_table_mut().ok_or_else(|| {
        ClientError::Config(format!(
            "`google` in {} is not a table",
            config_path.display()
        ))
    })?;
    google["credentials_file"] = toml_edit::value(credentials_file.display().to_string());

    if let Some(parent) = config_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, doc.to_string())?;

    info!(
        "remembered credentials file {} in {}",
        credentials_file.display(),
        config_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_creates_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("nested").join("config.toml");

        remember_credentials_file(&config_path, Path::new("/secrets/credentials.json")).unwrap();

        let config = ClientConfig::load_from(&config_path).unwrap();
        assert_eq!(
            config.google.credentials_file,
            PathBuf::from("/secrets/credentials.json")
        );
    }

    #[test]
    fn remember_preserves_existing_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            "# my settings\n[google]\ntoken_path = \"/var/lib/classcord/token.json\"\n\n[classroom]\npage_size = 5\n",
        )
        .unwrap();

        remember_credentials_file(&config_path, Path::new("creds.json")).unwrap();

        let raw = std::fs::read_to_string(&config_path).unwrap();
        assert!(raw.starts_with("# my settings"));

        let config = ClientConfig::load_from(&config_path).unwrap();
        assert_eq!(config.google.credentials_file, PathBuf::from("creds.json"));
        assert_eq!(
            config.google.token_path,
            PathBuf::from("/var/lib/classcord/token.json")
        );
        assert_eq!(config.classroom.page_size, 5);
    }

    #[test]
    fn remember_rejects_non_table_google() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "google = 1\n").unwrap();

        let err = remember_credentials_file(&config_path, Path::new("c.json")).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[tokio::test]
    async fn force_with_malformed_credentials_keeps_token() {
        let tmp = tempfile::tempdir().unwrap();
        let credentials = tmp.path().join("credentials.json");
        let token = tmp.path().join("token.json");
        std::fs::write(
            &credentials,
            r#"{"installed":{"client_secret":"s1","redirect_uris":["urn:ietf:wg:oauth:2.0:oob"]}}"#,
        )
        .unwrap();
        std::fs::write(&token, "stored token").unwrap();

        let mut config = ClientConfig::default();
        config.google.credentials_file = credentials;
        config.google.token_path = token.clone();

        let err = run(&tmp.path().join("config.toml"), &config, None, true)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Credentials(ref e) if e.is_config()));
        assert_eq!(std::fs::read_to_string(&token).unwrap(), "stored token");
    }
}
