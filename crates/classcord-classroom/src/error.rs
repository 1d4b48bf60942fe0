//! Error types for Classroom API calls.

use std::fmt;

use classcord_auth::CredentialError;
use thiserror::Error;

/// The category of a Classroom error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassroomErrorCode {
    /// The access token was rejected or could not be refreshed.
    AuthenticationFailed,
    /// The token owner lacks permission (or a scope) for this call.
    AuthorizationFailed,
    /// Connection failed, timed out, or the body could not be read.
    NetworkError,
    /// Google asked us to slow down.
    RateLimited,
    /// Google answered with a 5xx or another unexpected status.
    ServerError,
    /// The response body did not match the expected schema.
    InvalidResponse,
    /// The course does not exist or is not visible to the token owner.
    NotFound,
    /// The client could not be constructed.
    ConfigurationError,
    /// A refreshed token could not be written to disk.
    StorageError,
}

impl ClassroomErrorCode {
    /// Returns a machine-friendly name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::ConfigurationError => "configuration_error",
            Self::StorageError => "storage_error",
        }
    }
}

impl fmt::Display for ClassroomErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised by the Classroom client.
#[derive(Debug, Error)]
pub struct ClassroomError {
    code: ClassroomErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ClassroomError {
    /// Creates a new error.
    pub fn new(code: ClassroomErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ClassroomErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ClassroomErrorCode::AuthorizationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ClassroomErrorCode::NetworkError, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ClassroomErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ClassroomErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ClassroomErrorCode::InvalidResponse, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ClassroomErrorCode::NotFound, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ClassroomErrorCode::ConfigurationError, message)
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
    pub fn code(&self) -> ClassroomErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ClassroomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<CredentialError> for ClassroomError {
    fn from(err: CredentialError) -> Self {
        let code = if err.is_storage() {
            ClassroomErrorCode::StorageError
        } else {
            ClassroomErrorCode::AuthenticationFailed
        };
        Self::new(code, err.to_string()).with_source(err)
    }
}

/// A specialized Result type for Classroom operations.
pub type ClassroomResult<T> = Result<T, ClassroomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = ClassroomError::not_found("course 42");
        assert_eq!(err.to_string(), "not_found: course 42");
    }

    #[test]
    fn credential_error_becomes_authentication_failure() {
        use std::error::Error;
        let err: ClassroomError = CredentialError::refresh("invalid_grant").into();
        assert_eq!(err.code(), ClassroomErrorCode::AuthenticationFailed);
        assert!(err.message().contains("token refresh"));
        assert!(err.source().is_some());
    }

    #[test]
    fn credential_storage_error_is_not_an_auth_failure() {
        use classcord_auth::AuthStep;
        let err: ClassroomError =
            CredentialError::storage(AuthStep::Persistence, "failed to write token.json").into();
        assert_eq!(err.code(), ClassroomErrorCode::StorageError);
        assert!(err.to_string().starts_with("storage_error: "));
    }
}
