//! Notification sink abstraction.
//!
//! A [`NotificationSink`] delivers rendered text somewhere outside the
//! process: a chat channel, a terminal, a test buffer. Sinks know nothing
//! about Classroom or OAuth; they only receive strings.

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use thiserror::Error;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The category of a sink error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkErrorCode {
    /// The sink rejected our credentials (bad bot token, missing permission).
    Unauthorized,
    /// The sink asked us to slow down.
    RateLimited,
    /// Transport-level failure.
    NetworkError,
    /// The remote API answered with an unexpected error.
    ApiError,
    /// The sink is misconfigured.
    ConfigurationError,
    /// Local I/O failure.
    IoError,
}

impl SinkErrorCode {
    /// Returns a machine-friendly name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate_limited",
            Self::NetworkError => "network_error",
            Self::ApiError => "api_error",
            Self::ConfigurationError => "configuration_error",
            Self::IoError => "io_error",
        }
    }
}

impl fmt::Display for SinkErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while delivering a notification.
#[derive(Debug, Error)]
pub struct SinkError {
    code: SinkErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SinkError {
    /// Creates a new sink error.
    pub fn new(code: SinkErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(SinkErrorCode::Unauthorized, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SinkErrorCode::RateLimited, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SinkErrorCode::NetworkError, message)
    }

    /// Creates an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(SinkErrorCode::ApiError, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SinkErrorCode::ConfigurationError, message)
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
    pub fn code(&self) -> SinkErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        Self::new(SinkErrorCode::IoError, err.to_string()).with_source(err)
    }
}

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for rendered notifications.
pub trait NotificationSink: Send + Sync {
    /// Returns a short name for logs (e.g. "discord", "stdout").
    fn name(&self) -> &str;

    /// Delivers one message.
    fn send_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, SinkResult<()>>;
}

/// A sink that prints each message to stdout, separated by a blank line.
///
/// Used for dry runs.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, SinkResult<()>> {
        Box::pin(async move {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{}", text)?;
            writeln!(out)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
    }

    impl NotificationSink for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn send_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, SinkResult<()>> {
            Box::pin(async move {
                self.sent.lock().unwrap().push(text.to_string());
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn sink_is_object_safe() {
        let recorder = Recorder::default();
        {
            let sink: &dyn NotificationSink = &recorder;
            sink.send_text("hello").await.unwrap();
            assert_eq!(sink.name(), "recorder");
        }
        assert_eq!(*recorder.sent.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn stdout_sink_succeeds() {
        StdoutSink.send_text("dry run").await.unwrap();
    }

    #[test]
    fn error_display() {
        let err = SinkError::rate_limited("slow down");
        assert_eq!(err.code(), SinkErrorCode::RateLimited);
        assert_eq!(err.to_string(), "rate_limited: slow down");
    }

    #[test]
    fn io_error_converts() {
        use std::error::Error;
        let err: SinkError = std::io::Error::other("broken pipe").into();
        assert_eq!(err.code(), SinkErrorCode::IoError);
        assert!(err.source().is_some());
    }
}
