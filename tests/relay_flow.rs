//! End-to-end tests: caller → relay → mock upstream.

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

mod common;

use common::{client, file_form, relay_config, MockUpstream, TestRelay};

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[tokio::test]
async fn health_check_needs_no_configuration() {
    // Unreachable upstream, no credential, token required: still healthy.
    let mut config = relay_config("http://127.0.0.1:9/file");
    config.upstream.api_key = None;
    config.security.proxy_token = Some("s3cret".into());
    let relay = TestRelay::start(config).await;

    let res = client().get(relay.url("/")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "🟢 Vapi upload proxy running");
}

#[tokio::test]
async fn upload_is_relayed_byte_for_byte() {
    let upstream = MockUpstream::start(201, r#"{"id":"f_123"}"#).await;
    let relay = TestRelay::start(relay_config(&upstream.url())).await;

    let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
    let res = client()
        .post(relay.url("/upload"))
        .multipart(file_form(payload.clone(), "report.final.PDF", "application/pdf"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), r#"{"id":"f_123"}"#);

    let received = upstream.received();
    assert_eq!(received.len(), 1);
    let request = &received[0];

    assert_eq!(request.authorization.as_deref(), Some("Bearer test-key"));
    assert!(request
        .content_type
        .as_deref()
        .unwrap()
        .starts_with("multipart/form-data; boundary="));
    assert_eq!(request.part("purpose").unwrap().bytes, b"assistant");

    let file = request.part("file").unwrap();
    assert_eq!(file.bytes, payload);
    assert_eq!(file.content_type.as_deref(), Some("application/pdf"));

    let name = file.file_name.as_deref().unwrap();
    assert!(name.starts_with("upload_"), "unexpected name {name}");
    assert!(name.ends_with(".PDF"), "unexpected name {name}");
    assert!(is_safe_name(name), "unexpected name {name}");
}

#[tokio::test]
async fn upstream_status_and_raw_body_pass_through() {
    let upstream = MockUpstream::start(502, "<html>bad gateway</html>").await;
    let relay = TestRelay::start(relay_config(&upstream.url())).await;

    let res = client()
        .post(relay.url("/upload"))
        .multipart(file_form(b"hello".to_vec(), "hello.txt", "text/plain"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.text().await.unwrap(), "<html>bad gateway</html>");
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn missing_file_is_rejected_without_upstream_call() {
    let upstream = MockUpstream::start(201, "{}").await;
    let relay = TestRelay::start(relay_config(&upstream.url())).await;

    let form = reqwest::multipart::Form::new().text("note", "no file here");
    let res = client()
        .post(relay.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "file is required" }));
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn file_field_without_filename_is_not_a_file() {
    let upstream = MockUpstream::start(201, "{}").await;
    let relay = TestRelay::start(relay_config(&upstream.url())).await;

    let form = reqwest::multipart::Form::new().text("file", "just text");
    let res = client()
        .post(relay.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn token_is_not_required_when_unset() {
    let upstream = MockUpstream::start(200, r#"{"ok":true}"#).await;
    let relay = TestRelay::start(relay_config(&upstream.url())).await;

    let res = client()
        .post(relay.url("/upload"))
        .multipart(file_form(b"data".to_vec(), "a.bin", "application/octet-stream"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn configured_token_is_enforced_before_processing() {
    let upstream = MockUpstream::start(201, r#"{"id":"f_1"}"#).await;
    let mut config = relay_config(&upstream.url());
    config.security.proxy_token = Some("s3cret".into());
    let relay = TestRelay::start(config).await;
    let client = client();

    for token in [None, Some("wrong"), Some("S3CRET")] {
        let mut req = client
            .post(relay.url("/upload"))
            .multipart(file_form(b"data".to_vec(), "a.txt", "text/plain"));
        if let Some(token) = token {
            req = req.header("X-Proxy-Token", token);
        }
        let res = req.send().await.unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "token {token:?}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "message": "Unauthorized" }));
    }
    assert_eq!(upstream.calls(), 0);

    let res = client
        .post(relay.url("/upload"))
        .header("X-Proxy-Token", "s3cret")
        .multipart(file_form(b"data".to_vec(), "a.txt", "text/plain"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let upstream = MockUpstream::start(201, "{}").await;
    let mut config = relay_config(&upstream.url());
    config.security.max_upload_bytes = 1024;
    let relay = TestRelay::start(config).await;

    // Within the body budget, over the file limit: the handler rejects it.
    let res = client()
        .post(relay.url("/upload"))
        .multipart(file_form(vec![7u8; 2048], "big.bin", "application/octet-stream"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "message": "file exceeds maximum upload size of 1024 bytes" })
    );
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn oversized_body_is_rejected_before_handler() {
    let upstream = MockUpstream::start(201, "{}").await;
    let mut config = relay_config(&upstream.url());
    config.security.max_upload_bytes = 1024;
    let relay = TestRelay::start(config).await;

    let res = client()
        .post(relay.url("/upload"))
        .multipart(file_form(vec![7u8; 256 * 1024], "huge.bin", "application/octet-stream"))
        .send()
        .await;

    // The relay may answer 413 and close before the whole body is sent.
    if let Ok(res) = res {
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(res.headers()["content-type"], "application/json");
        let body: Value = res.json().await.unwrap();
        assert_eq!(
            body,
            json!({ "message": "file exceeds maximum upload size of 1024 bytes" })
        );
    }
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn upload_exactly_at_limit_is_accepted() {
    let upstream = MockUpstream::start(201, "{}").await;
    let mut config = relay_config(&upstream.url());
    config.security.max_upload_bytes = 1024;
    let relay = TestRelay::start(config).await;

    let res = client()
        .post(relay.url("/upload"))
        .multipart(file_form(vec![1u8; 1024], "edge.bin", "application/octet-stream"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(upstream.received()[0].part("file").unwrap().bytes.len(), 1024);
}

#[tokio::test]
async fn purpose_and_credential_are_optional() {
    let upstream = MockUpstream::start(401, r#"{"message":"Invalid Key"}"#).await;
    let mut config = relay_config(&upstream.url());
    config.upstream.api_key = None;
    config.upstream.purpose = None;
    let relay = TestRelay::start(config).await;

    let res = client()
        .post(relay.url("/upload"))
        .multipart(file_form(b"x".to_vec(), "noext", "text/plain"))
        .send()
        .await
        .unwrap();

    // Missing credential is the upstream's call, not a local failure.
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.text().await.unwrap(), r#"{"message":"Invalid Key"}"#);

    let request = &upstream.received()[0];
    assert!(request.authorization.is_none());
    assert!(request.part("purpose").is_none());
    assert!(request
        .part("file")
        .unwrap()
        .file_name
        .as_deref()
        .unwrap()
        .ends_with(".bin"));
}

#[tokio::test]
async fn slow_upstream_times_out_with_504() {
    let upstream =
        MockUpstream::start_with_delay(201, "{}", Duration::from_secs(3)).await;
    let mut config = relay_config(&upstream.url());
    config.upstream.timeout_secs = 1;
    let relay = TestRelay::start(config).await;

    let res = client()
        .post(relay.url("/upload"))
        .multipart(file_form(b"slow".to_vec(), "slow.txt", "text/plain"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "upstream request timed out" }));
}

#[tokio::test]
async fn upstream_timeout_wins_over_request_backstop() {
    let upstream =
        MockUpstream::start_with_delay(201, "{}", Duration::from_secs(4)).await;
    let mut config = relay_config(&upstream.url());
    config.upstream.timeout_secs = 1;
    config.timeouts.request_secs = 2;
    let relay = TestRelay::start(config).await;

    let res = client()
        .post(relay.url("/upload"))
        .multipart(file_form(b"slow".to_vec(), "slow.txt", "text/plain"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(res.headers()["content-type"], "application/json");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "upstream request timed out" }));
}

#[tokio::test]
async fn unreachable_upstream_is_500() {
    // Grab a free port, then close it so nothing is listening.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let relay = TestRelay::start(relay_config(&format!("http://{}/file", addr))).await;

    let res = client()
        .post(relay.url("/upload"))
        .multipart(file_form(b"lost".to_vec(), "lost.txt", "text/plain"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "upstream request failed" }));
}

#[tokio::test]
async fn concurrent_uploads_are_independent() {
    let upstream = MockUpstream::start(201, r#"{"id":"f"}"#).await;
    let relay = TestRelay::start(relay_config(&upstream.url())).await;
    let client = client();

    let tasks: Vec<_> = (0..8u8)
        .map(|i| {
            let client = client.clone();
            let url = relay.url("/upload");
            tokio::spawn(async move {
                client
                    .post(url)
                    .multipart(file_form(vec![i; 100], &format!("f{i}.dat"), "application/octet-stream"))
                    .send()
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::CREATED);
    }

    let mut firsts: Vec<u8> = upstream
        .received()
        .iter()
        .map(|r| r.part("file").unwrap().bytes[0])
        .collect();
    firsts.sort_unstable();
    assert_eq!(firsts, (0..8u8).collect::<Vec<_>>());
}
