//! Behavioral tests for the Supabase client against a local stub listener.
//!
//! Run with: cargo test --test client_test

use reqwest::Method;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use tankdiag::config::Config;
use tankdiag::error::ApiError;
use tankdiag::supabase::client::content_range_total;
use tankdiag::supabase::{Prefer, SupabaseClient, TableQuery};

fn client_for(addr: std::net::SocketAddr, timeout_seconds: u64) -> SupabaseClient {
    let config = Config {
        supabase_url: format!("http://{addr}"),
        supabase_key: "test-key".to_string(),
        http_timeout_seconds: timeout_seconds,
    };
    SupabaseClient::new(&config)
}

/// True once `data` holds a complete request head plus any declared body.
fn request_complete(data: &[u8]) -> bool {
    let Some(header_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    data.len() >= header_end + 4 + content_length
}

/// Answer one connection with a canned HTTP response and hand back the raw
/// request bytes the client sent.
async fn stub(response: &'static str) -> (SupabaseClient, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut data = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        data.extend_from_slice(&buf[..n]);
                        if request_complete(&data) {
                            break;
                        }
                    }
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&data).to_string());
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (client_for(addr, 5), rx)
}

#[tokio::test]
async fn success_response_decodes_body() {
    let (client, _request) = stub(
        "HTTP/1.1 200 OK\r\n\
         content-type: application/json\r\n\
         content-length: 17\r\n\
         connection: close\r\n\
         \r\n\
         [{\"id\":\"tank-1\"}]",
    )
    .await;

    let response = client
        .request(Method::GET, "/rest/v1/devices", None, None)
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.body[0]["id"], "tank-1");
}

#[tokio::test]
async fn auth_headers_and_path_are_sent() {
    let (client, request) = stub(
        "HTTP/1.1 200 OK\r\n\
         content-type: application/json\r\n\
         content-length: 2\r\n\
         connection: close\r\n\
         \r\n\
         []",
    )
    .await;

    let path = TableQuery::new()
        .filter_eq("id", "device_main_tank_001")
        .to_path("devices");
    client.request(Method::GET, &path, None, None).await.unwrap();

    let sent = request.await.unwrap();
    assert!(sent.starts_with("GET /rest/v1/devices?id=eq.device_main_tank_001 HTTP/1.1\r\n"));
    assert!(sent.contains("apikey: test-key\r\n"));
    assert!(sent.contains("authorization: Bearer test-key\r\n"));
}

#[tokio::test]
async fn error_status_and_body_are_preserved() {
    let (client, _request) = stub(
        "HTTP/1.1 404 Not Found\r\n\
         content-type: application/json\r\n\
         content-length: 37\r\n\
         connection: close\r\n\
         \r\n\
         {\"message\":\"relation does not exist\"}",
    )
    .await;

    let err = client
        .request(Method::GET, "/rest/v1/missing", None, None)
        .await
        .unwrap_err();

    match err {
        ApiError::Http { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(body, "{\"message\":\"relation does not exist\"}");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn conflict_is_detectable() {
    let (client, _request) = stub(
        "HTTP/1.1 409 Conflict\r\n\
         content-length: 19\r\n\
         connection: close\r\n\
         \r\n\
         duplicate key value",
    )
    .await;

    let err = client
        .request(
            Method::POST,
            "/rest/v1/devices",
            Some(&serde_json::json!({"id": "x"})),
            None,
        )
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn no_content_is_empty_success() {
    let (client, _request) = stub(
        "HTTP/1.1 204 No Content\r\n\
         connection: close\r\n\
         \r\n",
    )
    .await;

    // delete_device funnels through the same 204 path.
    client.delete_device("test_simple_001").await.unwrap();
}

#[tokio::test]
async fn count_total_is_read_from_content_range() {
    let (client, request) = stub(
        "HTTP/1.1 200 OK\r\n\
         content-type: application/json\r\n\
         content-range: 0-24/3573\r\n\
         content-length: 2\r\n\
         connection: close\r\n\
         \r\n\
         []",
    )
    .await;

    let total = client.count_rows("devices").await.unwrap();
    assert_eq!(total, Some(3573));

    let sent = request.await.unwrap();
    assert!(sent.starts_with("GET /rest/v1/devices?select=count HTTP/1.1\r\n"));
    assert!(sent.contains("prefer: count=exact\r\n"));
}

#[tokio::test]
async fn representation_preference_is_sent() {
    let (client, request) = stub(
        "HTTP/1.1 201 Created\r\n\
         content-type: application/json\r\n\
         content-length: 2\r\n\
         connection: close\r\n\
         \r\n\
         []",
    )
    .await;

    client
        .request(
            Method::POST,
            "/rest/v1/devices",
            Some(&serde_json::json!({"id": "x"})),
            Some(Prefer::Representation),
        )
        .await
        .unwrap();

    let sent = request.await.unwrap();
    assert!(sent.contains("prefer: return=representation\r\n"));
    assert!(sent.contains("content-type: application/json"));
    assert!(sent.ends_with("{\"id\":\"x\"}"));
}

#[tokio::test]
async fn undecodable_success_body_is_a_decode_error() {
    let (client, _request) = stub(
        "HTTP/1.1 200 OK\r\n\
         content-type: application/json\r\n\
         content-length: 8\r\n\
         connection: close\r\n\
         \r\n\
         not json",
    )
    .await;

    let err = client
        .request(Method::GET, "/rest/v1/devices", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn timeout_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept and hold the connection without ever answering.
    tokio::spawn(async move {
        if let Ok((socket, _)) = listener.accept().await {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            drop(socket);
        }
    });

    let client = client_for(addr, 1);
    let err = client
        .request(Method::GET, "/rest/v1/devices", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
    assert!(err.status().is_none());
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, 1);
    let err = client
        .request(Method::GET, "/rest/v1/devices", None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn content_range_parsing() {
    assert_eq!(content_range_total("0-2/3"), Some(3));
    assert_eq!(content_range_total("*/0"), Some(0));
    assert_eq!(content_range_total("0-24/*"), None);
}
