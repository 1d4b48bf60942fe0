//! Client error types.

use classcord_auth::CredentialError;
use classcord_classroom::ClassroomError;
use classcord_core::SinkError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Credential or token lifecycle failure.
    #[error("{0}")]
    Credentials(#[from] CredentialError),

    /// Classroom API failure.
    #[error("classroom error: {0}")]
    Classroom(#[from] ClassroomError),

    /// Notification delivery failure.
    #[error("delivery failed: {0}")]
    Sink(#[from] SinkError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
