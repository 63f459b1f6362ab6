//! End-to-end probe runs against a wiremock server.

use std::net::TcpListener;
use std::time::{Duration, Instant};

use getman_probe::config::input_payload;
use getman_probe::http::headers::parse_header_lines;
use getman_probe::report::{OutputFormat, Reporter};
use getman_probe::{CancelToken, ErrorKind, ProbeConfig, ProbeError, ProbeOutcome, run_probe};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STREAM_PATH: &str = "/api/chat/stream";

fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body.to_string())
}

fn config_for(server: &MockServer) -> ProbeConfig {
    ProbeConfig::new(
        format!("{}{STREAM_PATH}", server.uri()),
        input_payload("Planning a trip to Tokyo"),
    )
    .with_timeout(Duration::from_secs(5))
}

async fn probe(config: &ProbeConfig) -> (Result<ProbeOutcome, ProbeError>, Vec<String>) {
    let mut lines = Vec::new();
    let result = run_probe(config, &mut lines, &mut CancelToken::never()).await;
    (result, lines)
}

#[tokio::test]
async fn prints_non_empty_lines_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(sse_response("data: hello\n\ndata: world\n\n"))
        .expect(1)
        .mount(&server)
        .await;

    let (result, lines) = probe(&config_for(&server)).await;

    assert_eq!(lines, vec!["data: hello", "data: world"]);
    match result.unwrap() {
        ProbeOutcome::Streamed { status, lines, bytes, .. } => {
            assert_eq!(status, 200);
            assert_eq!(lines, 2);
            assert_eq!(bytes, 26);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn preserves_order_of_many_lines() {
    let expected: Vec<String> = (0..200).map(|i| format!("data: {{\"seq\":{i}}}")).collect();
    let mut body = String::new();
    for (i, line) in expected.iter().enumerate() {
        body.push_str(line);
        // Empty lines in varying positions must not show up.
        body.push_str(if i % 3 == 0 { "\n\n" } else { "\n" });
    }
    body.insert(0, '\n');

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sse_response(&body))
        .mount(&server)
        .await;

    let (result, lines) = probe(&config_for(&server)).await;

    assert!(result.unwrap().is_success());
    assert_eq!(lines, expected);
}

#[tokio::test]
async fn sends_payload_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"input": "Planning a trip to Tokyo"})))
        .respond_with(sse_response("data: ok\n"))
        .expect(1)
        .mount(&server)
        .await;

    let (result, lines) = probe(&config_for(&server)).await;
    assert!(result.unwrap().is_success());
    assert_eq!(lines, vec!["data: ok"]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: Value = requests[0].body_json().unwrap();
    assert_eq!(sent, json!({"input": "Planning a trip to Tokyo"}));
}

#[tokio::test]
async fn forwards_extra_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer secret"))
        .and(header("accept", "text/event-stream"))
        .respond_with(sse_response("data: authed\n"))
        .expect(1)
        .mount(&server)
        .await;

    let headers = parse_header_lines(["Authorization: Bearer secret", "Accept: text/event-stream"]).unwrap();
    let (result, lines) = probe(&config_for(&server).with_headers(headers)).await;

    assert!(result.unwrap().is_success());
    assert_eq!(lines, vec!["data: authed"]);
}

#[tokio::test]
async fn non_200_returns_body_without_streaming() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let (result, lines) = probe(&config_for(&server)).await;

    assert!(lines.is_empty());
    assert_eq!(
        result.unwrap(),
        ProbeOutcome::HttpStatus {
            status: 404,
            body: "not found".to_string(),
        }
    );
}

#[tokio::test]
async fn non_200_is_reported_with_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let mut reporter = Reporter::new(Vec::new(), Vec::new(), OutputFormat::Text, false);
    let outcome = run_probe(&config, &mut reporter, &mut CancelToken::never())
        .await
        .unwrap();
    reporter.outcome(&outcome).unwrap();

    let (out, err) = reporter.into_inner();
    assert_eq!(String::from_utf8(out).unwrap(), "Error: HTTP 404\nnot found\n");
    assert!(err.is_empty());
}

#[tokio::test]
async fn header_timeout_fires_when_server_stalls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sse_response("data: late\n").set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let config = config_for(&server).with_timeout(Duration::from_secs(1));
    let started = Instant::now();
    let (result, lines) = probe(&config).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(lines.is_empty());
    let err = result.unwrap_err();
    assert!(matches!(err, ProbeError::Timeout(limit) if limit == Duration::from_secs(1)));
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn max_duration_bounds_a_stalled_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sse_response("data: late\n").set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let config = config_for(&server)
        .with_timeout(Duration::from_secs(30))
        .with_max_duration(Duration::from_millis(300));
    let (result, _) = probe(&config).await;

    assert!(matches!(result, Err(ProbeError::DeadlineExceeded(_))));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ProbeConfig::new(format!("http://127.0.0.1:{port}{STREAM_PATH}"), input_payload("x"))
        .with_timeout(Duration::from_secs(2));

    let (result, lines) = probe(&config).await;

    assert!(lines.is_empty());
    let err = result.unwrap_err();
    assert!(matches!(err, ProbeError::Connect(_)), "unexpected error: {err:?}");
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn invalid_utf8_line_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_bytes(b"data: ok\n\xff\xfe\n".to_vec()),
        )
        .mount(&server)
        .await;

    let (result, lines) = probe(&config_for(&server)).await;

    assert_eq!(lines, vec!["data: ok"]);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn invalid_url_fails_before_sending() {
    let config = ProbeConfig::new("localhost:8081/api/chat/stream", input_payload("x"));
    let (result, _) = probe(&config).await;
    assert_eq!(result.unwrap_err().kind(), ErrorKind::Config);
}
