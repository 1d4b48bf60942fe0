//! Google Classroom API client.
//!
//! [`ClassroomClient`] wraps an [`AuthorizedClient`](classcord_auth::AuthorizedClient)
//! and exposes the two calls this tool needs:
//!
//! - [`ClassroomClient::list_courses`] - `GET /v1/courses`
//! - [`ClassroomClient::list_announcements`] - `GET /v1/courses/{id}/announcements`
//!
//! Both follow `nextPageToken` until the requested limit is reached. HTTP
//! failures are mapped onto [`ClassroomErrorCode`] and returned as-is; there
//! is no retry.

mod client;
pub mod error;

pub use client::{ClassroomClient, ClassroomConfig};
pub use error::{ClassroomError, ClassroomErrorCode, ClassroomResult};
