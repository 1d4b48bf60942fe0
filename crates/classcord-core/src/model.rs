//! Classroom domain types shared between the API client and the sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Google Classroom course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Course identifier assigned by Classroom.
    pub id: String,
    /// Display name of the course.
    pub name: String,
    /// Section label, e.g. "Period 2".
    pub section: Option<String>,
    /// Lifecycle state as reported by Classroom (`ACTIVE`, `ARCHIVED`, ...).
    pub state: Option<String>,
    /// Link to the course in the Classroom web UI.
    pub link: Option<String>,
}

impl Course {
    /// Creates a course with only an ID and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            section: None,
            state: None,
            link: None,
        }
    }

    /// Builder method to set the section.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Builder method to set the web link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// An announcement posted to a course stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// The course this announcement belongs to.
    pub course_id: String,
    /// Announcement identifier.
    pub id: String,
    /// Body text.
    pub text: String,
    /// Link to the announcement in the Classroom web UI.
    pub link: Option<String>,
    /// When the announcement was created.
    pub created_at: Option<DateTime<Utc>>,
}

impl Announcement {
    /// Creates an announcement with the required fields.
    pub fn new(
        course_id: impl Into<String>,
        id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            id: id.into(),
            text: text.into(),
            link: None,
            created_at: None,
        }
    }

    /// Builder method to set the web link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
