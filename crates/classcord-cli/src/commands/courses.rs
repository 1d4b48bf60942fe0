//! Listing commands.

use std::io::{self, Write};

use classcord_core::{Announcement, Course, format_course_line};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Lists courses, first `limit` (default: one page).
pub async fn courses(config: &ClientConfig, limit: Option<usize>) -> ClientResult<()> {
    let client = super::classroom_client(config).await?;
    let limit = limit.unwrap_or(config.classroom.page_size);
    let courses = client.list_courses(Some(limit)).await?;

    print_courses(&mut io::stdout().lock(), &courses)?;
    Ok(())
}

/// Lists the announcements of one course.
pub async fn announcements(
    config: &ClientConfig,
    course_id: &str,
    limit: Option<usize>,
) -> ClientResult<()> {
    let client = super::classroom_client(config).await?;
    let limit = limit.unwrap_or(config.classroom.page_size);
    let announcements = client.list_announcements(course_id, Some(limit)).await?;

    print_announcements(&mut io::stdout().lock(), course_id, &announcements)?;
    Ok(())
}

/// Writes the course listing.
pub fn print_courses(out: &mut impl Write, courses: &[Course]) -> io::Result<()> {
    if courses.is_empty() {
        return writeln!(out, "No courses found.");
    }

    writeln!(out, "Courses:")?;
    for course in courses {
        writeln!(out, "{}", format_course_line(course))?;
    }
    Ok(())
}

/// Writes the announcement listing, one block per announcement.
pub fn print_announcements(
    out: &mut impl Write,
    course_id: &str,
    announcements: &[Announcement],
) -> io::Result<()> {
    if announcements.is_empty() {
        return writeln!(out, "No announcements found in course {}.", course_id);
    }

    for (i, announcement) in announcements.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        match announcement.created_at {
            Some(created) => writeln!(
                out,
                "[{}] {}",
                created.format("%Y-%m-%d %H:%M"),
                announcement.id
            )?,
            None => writeln!(out, "[{}]", announcement.id)?,
        }
        writeln!(out, "{}", announcement.text.trim())?;
        if let Some(ref link) = announcement.link {
            writeln!(out, "{}", link)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn courses_listing() {
        let courses = vec![
            Course::new("123", "Biology"),
            Course::new("456", "History").with_section("Period 2"),
        ];
        let out = render(|buf| print_courses(buf, &courses));
        assert_eq!(out, "Courses:\nBiology (123)\nHistory (456)\n");
    }

    #[test]
    fn no_courses() {
        let out = render(|buf| print_courses(buf, &[]));
        assert_eq!(out, "No courses found.\n");
    }

    #[test]
    fn announcements_listing() {
        let announcements = vec![
            Announcement::new("1", "a1", "  Quiz Friday \n").with_link("https://classroom.google.com/a1"),
            Announcement::new("1", "a2", "Welcome"),
        ];
        let out = render(|buf| print_announcements(buf, "1", &announcements));
        assert_eq!(
            out,
            "[a1]\nQuiz Friday\nhttps://classroom.google.com/a1\n\n[a2]\nWelcome\n"
        );
    }

    #[test]
    fn no_announcements() {
        let out = render(|buf| print_announcements(buf, "9", &[]));
        assert_eq!(out, "No announcements found in course 9.\n");
    }
}
