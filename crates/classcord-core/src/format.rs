//! Text rendering for courses and announcements.

use std::borrow::Cow;

use crate::model::{Announcement, Course};

/// Maximum length of a single Discord message, in characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Truncates a string to `max_len` characters, ending with `...` when cut.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}

/// Renders the one-line listing form of a course: `name (id)`.
///
/// The section is not shown.
pub fn format_course_line(course: &Course) -> String {
    format!("{} ({})", course.name, course.id)
}

/// Renders an announcement as a chat message.
///
/// The course name is a bold header and the link, when known, is the last
/// line. Only the body is shortened to fit `max_len`, unless the header and
/// link alone are too long: then the link is dropped and the header cut.
pub fn format_announcement(course: &Course, announcement: &Announcement, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }

    let header = format!("**{}**", course.name);
    let header_len = header.chars().count();
    let mut footer = announcement.link.as_deref().unwrap_or_default();
    if header_len + footer.chars().count() + 2 > max_len {
        footer = "";
    }

    // Newlines between header, body and footer.
    let separators = if footer.is_empty() { 1 } else { 2 };
    let header = ellipsis(&header, max_len - separators.min(max_len));
    let reserved = header.chars().count() + footer.chars().count() + separators;
    let body_len = max_len.saturating_sub(reserved);

    let text = announcement.text.trim();
    let body = ellipsis(text, body_len);

    if footer.is_empty() {
        format!("{}\n{}", header, body)
    } else {
        format!("{}\n{}\n{}", header, body, footer)
    }
}
