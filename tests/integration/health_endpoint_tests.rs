//! Integration tests for the health endpoint and HTML views.

use super::test_helpers::spawn_server;

#[tokio::test]
async fn health_returns_ok() {
    let server = spawn_server().await;

    let resp = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .expect("HTTP GET /health");

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn html_views_are_served() {
    let server = spawn_server().await;

    for (path, heading) in [
        ("/", "<h1>Issues</h1>"),
        ("/calendar", "<h1>Calendar</h1>"),
        ("/issue/new", "<h1>New issue</h1>"),
        ("/issue/3/edit", "<h1>Edit issue</h1>"),
        ("/users/new", "<h1>Users</h1>"),
        ("/chat", "<h1>Assistant</h1>"),
    ] {
        let resp = server
            .client
            .get(server.url(path))
            .send()
            .await
            .expect("GET view");
        assert_eq!(resp.status(), 200, "path {path}");
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert!(content_type.starts_with("text/html"), "path {path}");
        assert!(resp.text().await.expect("body").contains(heading), "path {path}");
    }
}

#[tokio::test]
async fn edit_view_embeds_issue_id() {
    let server = spawn_server().await;
    let body = server
        .client
        .get(server.url("/issue/42/edit"))
        .send()
        .await
        .expect("GET edit")
        .text()
        .await
        .expect("body");
    assert!(body.contains("const issueId = 42;"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let server = spawn_server().await;
    let resp = server
        .client
        .get(server.url("/health"))
        .header("Origin", "http://elsewhere.example")
        .send()
        .await
        .expect("GET /health");
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
