use std::time::Duration;

use httpmock::prelude::*;
use mirage_lib::{
    FirecrawlClient, GeminiClient, GenerationRequest, MirageError, Scraper, TextModel,
};
use reqwest::StatusCode;
use serde_json::json;

const TIMEOUT: Duration = Duration::from_secs(5);

fn firecrawl(server: &MockServer) -> FirecrawlClient {
    FirecrawlClient::with_base_url_and_timeout("fc-test", server.base_url(), TIMEOUT)
        .expect("firecrawl client")
}

fn gemini(server: &MockServer) -> GeminiClient {
    GeminiClient::with_base_url_and_timeout("gk-test", server.base_url(), TIMEOUT)
        .expect("gemini client")
        .with_model("test-model")
}

#[tokio::test]
async fn firecrawl_sends_bearer_auth_and_formats() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/scrape")
                .header("authorization", "Bearer fc-test")
                .json_body_partial(r#"{"url": "https://example.com/", "onlyMainContent": false}"#)
                .body_contains("\"screenshot\"");
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "markdown": "# Example",
                    "html": "<h1>Example</h1>",
                    "screenshot": "https://cdn.firecrawl.dev/shot.png",
                    "metadata": {"title": "Example Domain", "sourceURL": "https://example.com/", "statusCode": 200}
                }
            }));
        })
        .await;

    let page = firecrawl(&server)
        .scrape("example.com", true)
        .await
        .expect("page");

    mock.assert_async().await;
    assert_eq!(page.url, "https://example.com/");
    assert_eq!(page.title.as_deref(), Some("Example Domain"));
    assert_eq!(page.screenshot.as_deref(), Some("https://cdn.firecrawl.dev/shot.png"));
}

#[tokio::test]
async fn firecrawl_rate_limit_is_fetch_error_with_hint() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/scrape");
            then.status(429)
                .header("retry-after", "30")
                .json_body(json!({"success": false, "error": "Rate limit exceeded"}));
        })
        .await;

    let err = firecrawl(&server)
        .scrape("https://example.com", false)
        .await
        .unwrap_err();

    match err {
        MirageError::Fetch { status, message } => {
            assert_eq!(status, Some(StatusCode::TOO_MANY_REQUESTS));
            assert!(message.contains("Rate limit exceeded"), "{message}");
            assert!(message.contains("30"), "{message}");
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn firecrawl_unauthorized_payload_points_at_key() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/scrape");
            then.status(401)
                .json_body(json!({"success": false, "error": "Unauthorized: Invalid token"}));
        })
        .await;

    let err = firecrawl(&server)
        .scrape("https://example.com", false)
        .await
        .unwrap_err();
    let payload = err.to_payload();

    assert!(payload.message.contains("Invalid token"));
    assert!(payload
        .remediation
        .unwrap_or_default()
        .contains("FIRECRAWL_API_KEY"));
}

#[tokio::test]
async fn firecrawl_blocked_target_is_not_a_credentials_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/scrape");
            then.status(200).json_body(json!({
                "success": true,
                "data": {
                    "markdown": "Access denied",
                    "metadata": {"sourceURL": "https://example.com/", "statusCode": 403, "error": "Forbidden"}
                }
            }));
        })
        .await;

    let err = firecrawl(&server)
        .scrape("https://example.com", false)
        .await
        .unwrap_err();

    assert!(
        matches!(err, MirageError::TargetPage { status, .. } if status == StatusCode::FORBIDDEN),
        "{err:?}"
    );
    let remediation = err.to_payload().remediation.unwrap_or_default();
    assert!(!remediation.contains("FIRECRAWL_API_KEY"), "{remediation}");
}

#[tokio::test]
async fn firecrawl_rejects_invalid_url_without_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/scrape");
            then.status(200);
        })
        .await;

    let err = firecrawl(&server)
        .scrape("ftp://example.com/brand.pdf", false)
        .await
        .unwrap_err();

    assert!(matches!(err, MirageError::Validation(_)));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn gemini_sends_key_header_and_json_mode() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/test-model:generateContent")
                .header("x-goog-api-key", "gk-test")
                .json_body_partial(
                    r#"{"generationConfig": {"responseMimeType": "application/json"}}"#,
                );
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "{\"colors\": {}}"}]},
                    "finishReason": "STOP"
                }]
            }));
        })
        .await;

    let text = gemini(&server)
        .generate(&GenerationRequest::json("extract").with_system("designer"))
        .await
        .expect("completion");

    mock.assert_async().await;
    assert_eq!(text, "{\"colors\": {}}");
}

#[tokio::test]
async fn gemini_error_status_is_model_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/test-model:generateContent");
            then.status(403).json_body(json!({
                "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
            }));
        })
        .await;

    let err = gemini(&server)
        .generate(&GenerationRequest::text("hello"))
        .await
        .unwrap_err();

    match &err {
        MirageError::Model { status, message } => {
            assert_eq!(*status, Some(StatusCode::FORBIDDEN));
            assert!(message.contains("API key not valid"), "{message}");
        }
        other => panic!("expected model error, got {other:?}"),
    }
    assert!(matches!(
        err.into_generation(),
        MirageError::Generation(ref m) if m.contains("403")
    ));
}
