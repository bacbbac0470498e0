//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use rest_pipeline::customization::{BootstrapHooks, HandlerHooks, HostingHooks, LoggingHook, WebcallHooks};
use rest_pipeline::logging::LogEntry;
use rest_pipeline::{LogLevel, LogType};

/// Owned copy of a log entry.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedEntry {
    pub session_name: String,
    pub log_type: LogType,
    pub log_level: LogLevel,
    pub category: String,
    pub subcategory: String,
    pub description: String,
}

/// Customization that records every log entry; clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingCustomization {
    entries: Arc<Mutex<Vec<RecordedEntry>>>,
}

#[allow(dead_code)]
impl RecordingCustomization {
    pub fn entries(&self) -> Vec<RecordedEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn of_type(&self, log_type: LogType) -> Vec<RecordedEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.log_type == log_type)
            .collect()
    }
}

impl LoggingHook for RecordingCustomization {
    fn log(&self, entry: &LogEntry<'_>) {
        self.entries.lock().unwrap().push(RecordedEntry {
            session_name: entry.session_name.to_string(),
            log_type: entry.log_type,
            log_level: entry.log_level,
            category: entry.category.to_string(),
            subcategory: entry.subcategory.to_string(),
            description: entry.description.to_string(),
        });
    }
}

impl BootstrapHooks for RecordingCustomization {}
impl HostingHooks for RecordingCustomization {}
impl HandlerHooks for RecordingCustomization {}
impl WebcallHooks for RecordingCustomization {}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the raw request (head and body) and returns status and body.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let (status, body) = f(request).await;
                        let reason = StatusCode::from_u16(status)
                            .ok()
                            .and_then(|s| s.canonical_reason())
                            .unwrap_or("Unknown");
                        let response = format!(
                            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len(),
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => read,
        };
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(head_end) = find_head_end(&buffer) {
            let head = String::from_utf8_lossy(&buffer[..head_end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn find_head_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}
