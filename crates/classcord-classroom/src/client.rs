//! HTTP client for the Classroom v1 REST API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use classcord_auth::AuthorizedClient;
use classcord_core::{Announcement, Course};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ClassroomError, ClassroomResult};

/// Base URL for the Classroom API.
const CLASSROOM_API_BASE: &str = "https://classroom.googleapis.com";

/// Default number of items requested per page.
const DEFAULT_PAGE_SIZE: usize = 10;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for [`ClassroomClient`].
#[derive(Debug, Clone)]
pub struct ClassroomConfig {
    /// API root, without the `/v1` suffix.
    pub base_url: String,
    /// Items requested per page.
    pub page_size: usize,
    /// Timeout applied to every request.
    pub timeout: Duration,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            base_url: CLASSROOM_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClassroomConfig {
    /// Builder method to set the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder method to set the page size. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Read-only Classroom client.
///
/// The wrapped [`AuthorizedClient`] sits behind an async mutex so a refresh
/// triggered by one call is seen by the next.
#[derive(Debug)]
pub struct ClassroomClient {
    http_client: reqwest::Client,
    config: ClassroomConfig,
    auth: Mutex<AuthorizedClient>,
}

impl ClassroomClient {
    /// Creates a client that authenticates with `auth`.
    pub fn new(auth: AuthorizedClient, config: ClassroomConfig) -> ClassroomResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("classcord/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ClassroomError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            config,
            auth: Mutex::new(auth),
        })
    }

    /// Returns the client settings.
    pub fn config(&self) -> &ClassroomConfig {
        &self.config
    }

    /// Lists courses visible to the token owner.
    ///
    /// Stops once `limit` courses have been collected, or when Classroom
    /// reports no further pages.
    pub async fn list_courses(&self, limit: Option<usize>) -> ClassroomResult<Vec<Course>> {
        let url = format!("{}/v1/courses", self.config.base_url.trim_end_matches('/'));
        let items: Vec<ApiCourse> = self.collect(&url, limit, "courses").await?;

        let courses: Vec<Course> = items.into_iter().filter_map(ApiCourse::into_course).collect();
        debug!("fetched {} courses", courses.len());
        Ok(courses)
    }

    /// Lists announcements of one course, newest first as Classroom returns them.
    pub async fn list_announcements(
        &self,
        course_id: &str,
        limit: Option<usize>,
    ) -> ClassroomResult<Vec<Announcement>> {
        let url = format!(
            "{}/v1/courses/{}/announcements",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(course_id)
        );
        let context = format!("course {}", course_id);
        let items: Vec<ApiAnnouncement> = self.collect(&url, limit, &context).await?;

        let announcements: Vec<Announcement> = items
            .into_iter()
            .filter_map(|a| a.into_announcement(course_id))
            .collect();
        debug!(
            "fetched {} announcements from course {}",
            announcements.len(),
            course_id
        );
        Ok(announcements)
    }

    /// Follows `nextPageToken` until `limit` items are collected or pages run out.
    async fn collect<T>(&self, url: &str, limit: Option<usize>, context: &str) -> ClassroomResult<Vec<T>>
    where
        ListPage<T>: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let wanted = match limit {
                Some(max) => max.saturating_sub(items.len()).min(self.config.page_size),
                None => self.config.page_size,
            };
            if wanted == 0 {
                break;
            }

            let page: ListPage<T> = self
                .get_page(url, wanted, page_token.as_deref(), context)
                .await?;
            items.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        if let Some(max) = limit {
            items.truncate(max);
        }
        Ok(items)
    }

    /// Fetches a single page.
    async fn get_page<T>(
        &self,
        url: &str,
        page_size: usize,
        page_token: Option<&str>,
        context: &str,
    ) -> ClassroomResult<ListPage<T>>
    where
        ListPage<T>: DeserializeOwned,
    {
        let bearer = self.auth.lock().await.access_token().await?;

        let mut request = self
            .http_client
            .get(url)
            .bearer_auth(bearer)
            .query(&[("pageSize", page_size.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(|e| {
            let err = if e.is_timeout() {
                ClassroomError::network("request timeout")
            } else if e.is_connect() {
                ClassroomError::network(format!("connection failed: {}", e))
            } else {
                ClassroomError::network(format!("request failed: {}", e))
            };
            err.with_source(e)
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClassroomError::authentication(
                "access token expired or invalid",
            ));
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassroomError::authorization(format!(
                "access denied to {}: {}",
                context,
                api_message(&body)
            )));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClassroomError::not_found(format!("{} not found", context)));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ClassroomError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassroomError::server(format!(
                "API error ({}): {}",
                status,
                api_message(&body)
            )));
        }

        let body = response.text().await.map_err(|e| {
            ClassroomError::network(format!("failed to read response: {}", e)).with_source(e)
        })?;

        serde_json::from_str(&body).map_err(|e| {
            ClassroomError::invalid_response(format!("failed to parse response: {}", e))
                .with_source(e)
        })
    }
}

/// Extracts `error.message` from a Google error body, or returns the body.
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }

    serde_json::from_str::<Envelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// One page of a list response. The item key differs per endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
struct ListPage<T> {
    #[serde(default, alias = "courses", alias = "announcements")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCourse {
    id: Option<String>,
    name: Option<String>,
    section: Option<String>,
    course_state: Option<String>,
    alternate_link: Option<String>,
}

impl ApiCourse {
    fn into_course(self) -> Option<Course> {
        let Some(id) = self.id else {
            warn!("skipping course without an id");
            return None;
        };
        Some(Course {
            id,
            name: self.name.unwrap_or_default(),
            section: self.section.filter(|s| !s.is_empty()),
            state: self.course_state,
            link: self.alternate_link,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAnnouncement {
    id: Option<String>,
    text: Option<String>,
    alternate_link: Option<String>,
    creation_time: Option<DateTime<Utc>>,
}

impl ApiAnnouncement {
    fn into_announcement(self, course_id: &str) -> Option<Announcement> {
        let Some(id) = self.id else {
            warn!("skipping announcement without an id in course {}", course_id);
            return None;
        };
        Some(Announcement {
            course_id: course_id.to_string(),
            id,
            text: self.text.unwrap_or_default(),
            link: self.alternate_link,
            created_at: self.creation_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ClassroomConfig::default();
        assert_eq!(config.base_url, "https://classroom.googleapis.com");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn zero_page_size_is_clamped() {
        assert_eq!(ClassroomConfig::default().with_page_size(0).page_size, 1);
    }

    #[test]
    fn parse_courses_page() {
        let json = r#"{
            "courses": [
                {"id": "1", "name": "Math", "section": "P2", "courseState": "ACTIVE",
                 "alternateLink": "https://classroom.google.com/c/1"},
                {"name": "No id"}
            ],
            "nextPageToken": "abc"
        }"#;
        let page: ListPage<ApiCourse> = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));

        let courses: Vec<Course> = page.items.into_iter().filter_map(ApiCourse::into_course).collect();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].name, "Math");
        assert_eq!(courses[0].section.as_deref(), Some("P2"));
        assert_eq!(courses[0].state.as_deref(), Some("ACTIVE"));
    }

    #[test]
    fn parse_empty_page() {
        // Classroom omits the list key entirely when there are no items.
        let page: ListPage<ApiAnnouncement> = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn parse_announcement() {
        let json = r#"{"announcements": [{
            "courseId": "1", "id": "a1", "text": "Quiz Friday",
            "creationTime": "2024-03-01T09:30:00.123Z"
        }]}"#;
        let page: ListPage<ApiAnnouncement> = serde_json::from_str(json).unwrap();
        let announcement = page
            .items
            .into_iter()
            .next()
            .and_then(|a| a.into_announcement("1"))
            .unwrap();
        assert_eq!(announcement.text, "Quiz Friday");
        assert_eq!(
            announcement.created_at.unwrap().to_rfc3339(),
            "2024-03-01T09:30:00.123+00:00"
        );
    }

    #[test]
    fn api_message_extracts_google_error() {
        let body = r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(api_message(body), "The caller does not have permission");
        assert_eq!(api_message("plain text\n"), "plain text");
    }
}
