//! Classroom client against a mock API server.

use std::time::Duration;

use classcord_auth::{
    AuthorizedClient, ClientCredentials, OAuthClient, OAuthEndpoints, TokenRecord, TokenStore,
};
use classcord_classroom::{ClassroomClient, ClassroomConfig, ClassroomErrorCode};
use mockito::{Matcher, Server};

fn authorized(server_url: &str, dir: &tempfile::TempDir, expires_in: i64) -> AuthorizedClient {
    let oauth = OAuthClient::new(
        ClientCredentials::new("c1", "s1", "urn:ietf:wg:oauth:2.0:oob"),
        OAuthEndpoints::new(
            "https://accounts.example.com/auth",
            format!("{}/token", server_url),
        ),
        Duration::from_secs(5),
    )
    .unwrap();
    let token = TokenRecord::new("a1", "r1", expires_in, "s", "Bearer");
    AuthorizedClient::new(token, oauth, TokenStore::new(dir.path().join("token.json")))
}

fn client(server: &Server, dir: &tempfile::TempDir, page_size: usize) -> ClassroomClient {
    let config = ClassroomConfig::default()
        .with_base_url(server.url())
        .with_page_size(page_size)
        .with_timeout(Duration::from_secs(5));
    ClassroomClient::new(authorized(&server.url(), dir, 3600), config).unwrap()
}

#[tokio::test]
async fn lists_courses_across_pages() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/v1/courses")
        .match_query(Matcher::Regex("^pageSize=2$".into()))
        .match_header("authorization", "Bearer a1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"courses":[{"id":"1","name":"Math"},{"id":"2","name":"Physics","section":"B"}],
                "nextPageToken":"p2"}"#,
        )
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/v1/courses")
        .match_query(Matcher::Regex("pageToken=p2".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"courses":[{"id":"3","name":"Art"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let courses = client(&server, &dir, 2).list_courses(None).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let names: Vec<&str> = courses.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Math", "Physics", "Art"]);
    assert_eq!(courses[1].section.as_deref(), Some("B"));
}

#[tokio::test]
async fn limit_stops_paging() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/v1/courses")
        .match_query(Matcher::UrlEncoded("pageSize".into(), "1".into()))
        .with_status(200)
        .with_body(r#"{"courses":[{"id":"1","name":"Math"}],"nextPageToken":"p2"}"#)
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let courses = client(&server, &dir, 10).list_courses(Some(1)).await.unwrap();

    first.assert_async().await;
    assert_eq!(courses.len(), 1);
}

#[tokio::test]
async fn empty_course_list() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/courses")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let courses = client(&server, &dir, 10).list_courses(None).await.unwrap();
    assert!(courses.is_empty());
}

#[tokio::test]
async fn lists_announcements() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/courses/42/announcements")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"announcements":[
                {"courseId":"42","id":"a1","text":"Quiz Friday",
                 "alternateLink":"https://classroom.google.com/c/42/p/a1",
                 "creationTime":"2024-03-01T09:30:00Z"}
            ]}"#,
        )
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let announcements = client(&server, &dir, 10)
        .list_announcements("42", None)
        .await
        .unwrap();

    assert_eq!(announcements.len(), 1);
    assert_eq!(announcements[0].course_id, "42");
    assert_eq!(announcements[0].text, "Quiz Friday");
    assert!(announcements[0].created_at.is_some());
}

#[tokio::test]
async fn expired_token_is_refreshed_before_the_call() {
    let mut server = Server::new_async().await;
    let refresh = server
        .mock("POST", "/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"a2","expires_in":3599,"scope":"s","token_type":"Bearer"}"#)
        .expect(1)
        .create_async()
        .await;
    let courses = server
        .mock("GET", "/v1/courses")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer a2")
        .with_status(200)
        .with_body(r#"{"courses":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = ClassroomConfig::default().with_base_url(server.url());
    let client = ClassroomClient::new(authorized(&server.url(), &dir, -60), config).unwrap();
    client.list_courses(None).await.unwrap();

    refresh.assert_async().await;
    courses.assert_async().await;
    // The refreshed record was written back.
    assert!(dir.path().join("token.json").exists());
}

#[tokio::test]
async fn maps_http_failures() {
    let cases = [
        (401, ClassroomErrorCode::AuthenticationFailed),
        (403, ClassroomErrorCode::AuthorizationFailed),
        (404, ClassroomErrorCode::NotFound),
        (429, ClassroomErrorCode::RateLimited),
        (500, ClassroomErrorCode::ServerError),
    ];

    for (status, expected) in cases {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/courses/42/announcements")
            .match_query(Matcher::Any)
            .with_status(status)
            .with_body(r#"{"error":{"code":0,"message":"nope"}}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = client(&server, &dir, 10)
            .list_announcements("42", None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), expected, "status {}", status);
        // Failures are not retried.
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/courses")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = client(&server, &dir, 10).list_courses(None).await.unwrap_err();
    assert_eq!(err.code(), ClassroomErrorCode::InvalidResponse);
}
