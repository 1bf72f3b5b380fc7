//! E2E tests for health check, static assets and metrics

mod common;

use common::TestServer;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::without_github().await;

    let response = server.client.get(server.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_static_stylesheet_is_served() {
    let server = TestServer::without_github().await;

    let response = server
        .client
        .get(server.url("/static/style.css"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/css"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    octogate::metrics::init_metrics();
    let server = TestServer::without_github().await;

    let response = server.client.get(server.url("/metrics")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("octogate_sessions_active"));
}

#[tokio::test]
async fn test_callback_without_provider_is_json_error() {
    let server = TestServer::without_github().await;

    let response = server
        .client
        .get(server.url("/github/callback?code=x&state=y"))
        .send()
        .await
        .unwrap();

    // No provider registered: misconfiguration wins over missing state.
    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_404_for_unknown_routes() {
    let server = TestServer::without_github().await;

    let response = server
        .client
        .get(server.url("/unknown/route/here"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}
