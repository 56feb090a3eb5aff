//! One-shot loopback HTTP server for client tests.

#![allow(dead_code)]

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use bugtrack_client::SupabaseClient;
use bugtrack_client::config::{ClientOptions, SupabaseConfig};

pub const ANON_KEY: &str = "anon-key";

pub const ROW: &str = r#"{
    "id": "b1",
    "title": "Crash on save",
    "description": "Stack trace attached",
    "status": "open",
    "priority": "high",
    "created_at": "2024-03-01T10:00:00.123456+00:00",
    "updated_at": "2024-03-01T10:00:00.123456+00:00",
    "assigned_to": null,
    "reporter": "user-7"
}"#;

/// Serve exactly one request with `status` and `body`, returning the base
/// URL and a handle resolving to the raw request text.
pub async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let raw = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;
        raw
    });
    (format!("http://{addr}"), handle)
}

pub fn client_for(base_url: &str) -> SupabaseClient {
    SupabaseClient::new(
        SupabaseConfig::new(base_url, ANON_KEY),
        ClientOptions { schema: "public".into(), timeout_seconds: 5 },
    )
    .unwrap()
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_head_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            if buf.len() >= end + 4 + content_length(&head) {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}
