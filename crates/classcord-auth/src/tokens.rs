//! Token records and their on-disk storage.
//!
//! A token file is either absent or holds one complete [`TokenRecord`].
//! Writes replace the whole file through a temporary file and a rename, so
//! a reader never sees half of a record.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AuthStep, CredentialError, CredentialResult};

/// Seconds subtracted from the real expiry so a token is refreshed before
/// Google starts rejecting it.
const EXPIRY_SKEW_SECS: i64 = 60;

/// The persisted authorization state.
///
/// Every field is required when deserializing; a file missing any of them is
/// treated as invalid rather than partially loaded.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Bearer token for API requests.
    pub access_token: String,
    /// Long-lived token used to obtain new access tokens.
    pub refresh_token: String,
    /// When the access token stops being accepted.
    pub expiry: DateTime<Utc>,
    /// Space-separated scopes granted by the token owner.
    pub scope: String,
    /// Token type, normally `Bearer`.
    pub token_type: String,
}

impl TokenRecord {
    /// Creates a record expiring `expires_in_secs` from now.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in_secs: i64,
        scope: impl Into<String>,
        token_type: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expiry: Utc::now() + Duration::seconds(expires_in_secs),
            scope: scope.into(),
            token_type: token_type.into(),
        }
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expiry
    }

    /// Iterates over the granted scopes.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split_whitespace()
    }

    /// Returns true if every required scope was granted.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|r| self.scopes().any(|s| s == r))
    }

    /// Checks the structural invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.access_token.is_empty() {
            return Err("access_token is empty".to_string());
        }
        if self.refresh_token.is_empty() {
            return Err("refresh_token is empty".to_string());
        }
        if self.token_type.is_empty() {
            return Err("token_type is empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expiry", &self.expiry)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Outcome of reading the token file.
#[derive(Debug)]
pub enum TokenLoad {
    /// No token file exists; this is the first run.
    Missing,
    /// A file exists but does not hold a complete record.
    Invalid(String),
    /// A complete record was read.
    Loaded(TokenRecord),
}

/// File-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store for the given token file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the token file.
    ///
    /// A missing file and an unparsable one are normal outcomes. Any other
    /// I/O failure (permissions, a directory in the way) is a storage error.
    pub fn load(&self) -> CredentialResult<TokenLoad> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no token file at {}", self.path.display());
                return Ok(TokenLoad::Missing);
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Ok(TokenLoad::Invalid(format!("token file is not UTF-8: {}", e)));
            }
            Err(e) => {
                return Err(CredentialError::storage(
                    AuthStep::LoadToken,
                    format!("failed to read token file {}: {}", self.path.display(), e),
                )
                .with_source(e));
            }
        };

        let record: TokenRecord = match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => return Ok(TokenLoad::Invalid(format!("failed to parse token file: {}", e))),
        };

        if let Err(reason) = record.validate() {
            return Ok(TokenLoad::Invalid(reason));
        }

        info!("loaded token from {}", self.path.display());
        Ok(TokenLoad::Loaded(record))
    }

    /// Writes the record, replacing any previous file content.
    pub fn save(&self, record: &TokenRecord) -> CredentialResult<()> {
        let persist_err = |what: &str, e: std::io::Error| {
            CredentialError::storage(
                AuthStep::Persistence,
                format!("failed to {} {}: {}", what, self.path.display(), e),
            )
            .with_source(e)
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| persist_err("create directory for", e))?;
        }

        let content = serde_json::to_string_pretty(record).map_err(|e| {
            CredentialError::storage(
                AuthStep::Persistence,
                format!("failed to serialize token: {}", e),
            )
        })?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, content).map_err(|e| persist_err("write", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))
                .map_err(|e| persist_err("restrict permissions on", e))?;
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(persist_err("replace", e));
        }

        info!("token stored to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "token.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
