//! One-shot HTTP stub for exercising the client against canned responses.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

pub struct StubServer {
    pub base_url: String,
    /// Raw request text, one entry per accepted connection.
    pub requests: mpsc::UnboundedReceiver<String>,
    pub hits: Arc<AtomicUsize>,
}

impl StubServer {
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serves the given responses, one connection each, in order. An empty
/// response string closes the connection without answering, which the
/// client sees as a transport failure.
pub async fn serve(responses: Vec<String>) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in_task = hits.clone();

    tokio::spawn(async move {
        for response in responses {
            let Ok((mut sock, _)) = listener.accept().await else {
                return;
            };
            hits_in_task.fetch_add(1, Ordering::SeqCst);
            let request = read_request(&mut sock).await;
            let _ = tx.send(request);
            if !response.is_empty() {
                let _ = sock.write_all(response.as_bytes()).await;
            }
            let _ = sock.shutdown().await;
        }
    });

    StubServer {
        base_url: format!("http://{}", addr),
        requests: rx,
        hits,
    }
}

pub fn canned(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

pub fn canned_json(body: &str) -> String {
    canned("200 OK", "application/json", body)
}

/// Reads headers plus a Content-Length body. Enough HTTP for a stub.
async fn read_request(sock: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match sock.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(end) = headers_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            if buf.len() >= end + 4 + content_length(&headers) {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(headers: &str) -> usize {
    headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}
