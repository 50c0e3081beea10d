//! Integration tests for the HTTP snapshot source against a local server.
//!
//! The server is a single-request HTTP/1.1 responder on a random port; it
//! records the request body so the query encoding can be checked.

mod common;

use common::*;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tw_core::error::SyncError;
use tw_core::snapshot::{HttpSnapshotSource, SnapshotSource};
use tw_protocol::task_models::{SnapshotQuery, TaskState, Viewer};

/// Serve one request with `status` and `body`; resolves to the request body.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/tasks", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });

    (url, handle)
}

/// Read headers and a `Content-Length` body; returns the body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending a full request");
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf).to_string();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        let body_start = header_end + 4;
        if buf.len() >= body_start + content_length {
            return String::from_utf8_lossy(&buf[body_start..body_start + content_length])
                .to_string();
        }
    }
}

fn query() -> SnapshotQuery {
    SnapshotQuery::for_viewer(INSTANCE, &Viewer::new(VIEWER), false)
}

#[tokio::test]
async fn test_fetch_posts_query_and_decodes_tasks() {
    let body = serde_json::json!([
        { "id": "t2", "assignee": VIEWER, "created": "2024-01-01T00:00:02Z" },
        { "id": "t1", "assignee": VIEWER, "created": 1_704_067_201_000_i64, "state": "COMPLETED" }
    ])
    .to_string();
    let (url, server) = serve_once("200 OK", body).await;

    let source = HttpSnapshotSource::new(&url, Duration::from_secs(5)).unwrap();
    let tasks = source.fetch(&query()).await.unwrap();

    assert_eq!(task_ids(&tasks), vec!["t2", "t1"]);
    assert_eq!(tasks[1].state, TaskState::Completed);
    assert!(tasks[1].created < tasks[0].created);

    let request: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert_eq!(
        request,
        serde_json::json!({
            "processInstanceId": INSTANCE,
            "assignee": VIEWER,
            "includeHistory": false
        })
    );
}

#[tokio::test]
async fn test_undecodable_record_does_not_drop_batch() {
    let body = serde_json::json!([
        { "id": "t1", "assignee": VIEWER, "created": "2024-01-01T00:00:00Z" },
        { "id": "t2", "assignee": VIEWER, "created": "2013-01-23T13:42:42.000+0200" },
        { "id": "t3", "assignee": VIEWER, "created": { "unexpected": true } }
    ])
    .to_string();
    let (url, server) = serve_once("200 OK", body).await;

    let source = HttpSnapshotSource::new(&url, Duration::from_secs(5)).unwrap();
    let tasks = source.fetch(&query()).await.unwrap();

    assert_eq!(task_ids(&tasks), vec!["t1", "t2"]);
    assert_eq!(tasks[1].created.to_rfc3339(), "2013-01-23T11:42:42+00:00");
    server.await.unwrap();
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (url, server) = serve_once("503 Service Unavailable", "{}".to_string()).await;

    let source = HttpSnapshotSource::new(&url, Duration::from_secs(5)).unwrap();
    let result = source.fetch(&query()).await;

    assert!(matches!(result, Err(SyncError::Status { status: 503, .. })));
    server.await.unwrap();
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let (url, server) = serve_once("200 OK", r#"{"not":"a list"}"#.to_string()).await;

    let source = HttpSnapshotSource::new(&url, Duration::from_secs(5)).unwrap();
    let result = source.fetch(&query()).await;

    assert!(matches!(result, Err(SyncError::Decode { .. })));
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_source_is_an_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/tasks", listener.local_addr().unwrap());
    drop(listener);

    let source = HttpSnapshotSource::new(&url, Duration::from_secs(5)).unwrap();
    let result = source.fetch(&query()).await;

    assert!(matches!(result, Err(SyncError::Http(_))));
}
