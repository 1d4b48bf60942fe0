//! OAuth client credentials.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{CredentialError, CredentialResult};

/// OAuth 2.0 client credentials for an installed or web application.
///
/// Loaded once per process and never modified afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
    /// The redirect URI registered for this client.
    pub redirect_uri: String,
}

/// Structure of Google's OAuth credentials JSON file.
///
/// The download from the Google Cloud Console holds either an `installed`
/// (desktop) or a `web` section.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl ClientCredentials {
    /// Creates new client credentials.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Loads client credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> CredentialResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CredentialError::config(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;

        let credentials = Self::from_json(&content)?;
        debug!("loaded client credentials from {}", path.display());
        Ok(credentials)
    }

    /// Parses client credentials from a Google credentials JSON string.
    ///
    /// The first entry of `redirect_uris` becomes the redirect URI.
    pub fn from_json(json: &str) -> CredentialResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            CredentialError::config(format!("failed to parse credentials JSON: {}", e))
        })?;

        let nested = file.installed.or(file.web).ok_or_else(|| {
            CredentialError::config("credentials file must contain an 'installed' or 'web' section")
        })?;

        let redirect_uri = nested.redirect_uris.into_iter().next().ok_or_else(|| {
            CredentialError::config("credentials file has no entry in 'redirect_uris'")
        })?;

        let credentials = Self::new(nested.client_id, nested.client_secret, redirect_uri);
        credentials.validate()?;
        Ok(credentials)
    }

    /// Checks that every field is usable.
    pub fn validate(&self) -> CredentialResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(CredentialError::config("client_id is required"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(CredentialError::config("client_secret is required"));
        }
        url::Url::parse(&self.redirect_uri).map_err(|e| {
            CredentialError::config(format!(
                "redirect URI '{}' is not a valid URI: {}",
                self.redirect_uri, e
            ))
        })?;
        Ok(())
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}
