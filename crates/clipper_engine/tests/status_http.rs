use std::time::Duration;

use clipper_core::{JobId, JobStatus};
use clipper_engine::{ClientSettings, FailureKind, HttpStatusSource, StatusSource};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer) -> HttpStatusSource {
    HttpStatusSource::new(&ClientSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(300),
        ..ClientSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn parses_status_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "progress": 42,
            "step": "Cortando destaques (1/3)",
            "highlights": ["h1.mp4"]
        })))
        .mount(&server)
        .await;

    let status = source(&server)
        .fetch_status(&JobId::new("job-1"))
        .await
        .expect("status ok");

    assert_eq!(
        status,
        JobStatus::new("Cortando destaques (1/3)")
            .with_progress(42)
            .with_highlights(["h1.mp4"])
    );
}

#[tokio::test]
async fn missing_fields_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let status = source(&server)
        .fetch_status(&JobId::new("job-1"))
        .await
        .expect("status ok");

    assert_eq!(status, JobStatus::default());
}

#[tokio::test]
async fn http_error_is_reported_with_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = source(&server)
        .fetch_status(&JobId::new("job-1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert_eq!(err.attempts, 1);
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = source(&server)
        .fetch_status(&JobId::new("job-1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::MalformedResponse);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"step": "late"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = source(&server)
        .fetch_status(&JobId::new("job-1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
}
