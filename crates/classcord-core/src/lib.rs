//! Core types: courses, announcements, formatting, sinks, tracing

pub mod format;
pub mod model;
pub mod sink;
pub mod tracing;

pub use format::{ellipsis, format_announcement, format_course_line, DISCORD_MESSAGE_LIMIT};
pub use model::{Announcement, Course};
pub use sink::{BoxFuture, NotificationSink, SinkError, SinkErrorCode, SinkResult, StdoutSink};
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
