//! In-process stand-in for the detection service

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.into(),
            delay: None,
        }
    }

    /// Hold the reply back, keeping the request in flight
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

type Routes = Arc<Mutex<HashMap<String, MockResponse>>>;
type Requests = Arc<Mutex<Vec<RecordedRequest>>>;

/// Minimal HTTP/1.1 server answering canned responses per path.
///
/// Unknown paths get a 404. Every request is recorded before its response is
/// delayed, so in-flight requests are visible to tests.
pub struct MockDetectionServer {
    addr: SocketAddr,
    routes: Routes,
    requests: Requests,
    task: JoinHandle<()>,
}

impl MockDetectionServer {
    pub async fn start() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
        let requests: Requests = Arc::new(Mutex::new(Vec::new()));

        let task = tokio::spawn({
            let routes = routes.clone();
            let requests = requests.clone();
            async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    let routes = routes.clone();
                    let requests = requests.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, routes, requests).await {
                            tracing::debug!("[MOCK] connection error: {}", e);
                        }
                    });
                }
            }
        });

        Ok(Self {
            addr,
            routes,
            requests,
            task,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn respond(&self, path: &str, response: MockResponse) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert(path.to_string(), response);
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

impl Drop for MockDetectionServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    routes: Routes,
    requests: Requests,
) -> io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    if let Ok(mut requests) = requests.lock() {
        requests.push(RecordedRequest {
            method,
            path: path.clone(),
            body,
        });
    }

    let response = routes
        .lock()
        .ok()
        .and_then(|routes| routes.get(&path).cloned())
        .unwrap_or_else(|| MockResponse::text(404, "Not Found"));

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let reason = if (200..300).contains(&response.status) {
        "OK"
    } else {
        "Error"
    };
    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason,
        response.content_type,
        response.body.len(),
        response.body
    );
    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await
}
