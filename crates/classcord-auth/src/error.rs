//! Error types for the credential lifecycle.
//!
//! Every error carries a [`CredentialErrorCode`] (what went wrong) and an
//! [`AuthStep`] (where it went wrong), so a diagnostic can tell a bad
//! credentials file apart from a rejected code or a full disk.

use std::fmt;
use thiserror::Error;

/// The category of a credential error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialErrorCode {
    /// The client credentials file is missing or malformed, or the request
    /// itself is unusable (e.g. no scopes).
    Config,
    /// Authorization was not granted: no code, a rejected code, a failed
    /// token exchange or refresh.
    Auth,
    /// The token file could not be read or written.
    Storage,
}

impl CredentialErrorCode {
    /// Returns a machine-friendly name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config_error",
            Self::Auth => "auth_error",
            Self::Storage => "storage_error",
        }
    }
}

impl fmt::Display for CredentialErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The lifecycle step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStep {
    /// Reading the client credentials file.
    LoadCredentials,
    /// Reading the stored token.
    LoadToken,
    /// Presenting the authorization URL or reading the operator's code.
    Authorization,
    /// Exchanging the authorization code at the token endpoint.
    TokenExchange,
    /// Writing the token file.
    Persistence,
    /// Refreshing an expired access token.
    Refresh,
}

impl AuthStep {
    /// Returns a human-readable name for this step.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadCredentials => "config load",
            Self::LoadToken => "token load",
            Self::Authorization => "authorization",
            Self::TokenExchange => "token exchange",
            Self::Persistence => "persistence",
            Self::Refresh => "token refresh",
        }
    }
}

impl fmt::Display for AuthStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised by the credential lifecycle.
#[derive(Debug, Error)]
pub struct CredentialError {
    code: CredentialErrorCode,
    step: AuthStep,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CredentialError {
    /// Creates a new error.
    pub fn new(code: CredentialErrorCode, step: AuthStep, message: impl Into<String>) -> Self {
        Self {
            code,
            step,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error raised while loading credentials.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(CredentialErrorCode::Config, AuthStep::LoadCredentials, message)
    }

    /// Creates an error for a failed operator interaction.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(CredentialErrorCode::Auth, AuthStep::Authorization, message)
    }

    /// Creates an error for a failed or rejected code exchange.
    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::new(CredentialErrorCode::Auth, AuthStep::TokenExchange, message)
    }

    /// Creates an error for a failed token refresh.
    pub fn refresh(message: impl Into<String>) -> Self {
        Self::new(CredentialErrorCode::Auth, AuthStep::Refresh, message)
    }

    /// Creates a storage error at the given step.
    pub fn storage(step: AuthStep, message: impl Into<String>) -> Self {
        Self::new(CredentialErrorCode::Storage, step, message)
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> CredentialErrorCode {
        self.code
    }

    /// Returns the step that failed.
    pub fn step(&self) -> AuthStep {
        self.step
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true for configuration errors.
    pub fn is_config(&self) -> bool {
        self.code == CredentialErrorCode::Config
    }

    /// Returns true for authorization errors.
    pub fn is_auth(&self) -> bool {
        self.code == CredentialErrorCode::Auth
    }

    /// Returns true for storage errors.
    pub fn is_storage(&self) -> bool {
        self.code == CredentialErrorCode::Storage
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.step, self.code, self.message)
    }
}

/// A specialized Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_code_and_step() {
        let err = CredentialError::config("missing client_id");
        assert!(err.is_config());
        assert_eq!(err.step(), AuthStep::LoadCredentials);

        let err = CredentialError::token_exchange("invalid_grant");
        assert!(err.is_auth());
        assert_eq!(err.step(), AuthStep::TokenExchange);

        let err = CredentialError::storage(AuthStep::Persistence, "disk full");
        assert!(err.is_storage());
        assert_eq!(err.step(), AuthStep::Persistence);
    }

    #[test]
    fn display_names_the_failed_step() {
        let err = CredentialError::token_exchange("invalid_grant: Bad Request");
        assert_eq!(
            err.to_string(),
            "[token exchange] auth_error: invalid_grant: Bad Request"
        );

        let err = CredentialError::config("no such file");
        assert_eq!(err.to_string(), "[config load] config_error: no such file");
    }

    #[test]
    fn four_failure_kinds_are_distinguishable() {
        let messages = [
            CredentialError::config("x").to_string(),
            CredentialError::authorization("x").to_string(),
            CredentialError::token_exchange("x").to_string(),
            CredentialError::storage(AuthStep::Persistence, "x").to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("permission denied");
        let err = CredentialError::storage(AuthStep::LoadToken, "unreadable").with_source(io_err);
        assert!(err.source().is_some());
    }
}
