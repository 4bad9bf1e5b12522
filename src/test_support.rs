//! Test doubles for the two network seams.

use crate::error::{AppError, AppResult};
use crate::github::{ChangeSet, CompareRequest, CompareSource, FileChange, FileStatus};
use crate::llm::LlmClient;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

pub fn file(name: &str, patch: Option<&str>) -> FileChange {
    FileChange {
        filename: name.to_string(),
        additions: 3,
        deletions: 1,
        changes: 4,
        status: FileStatus::Modified,
        patch: patch.map(str::to_string),
    }
}

/// Records every change log it receives and replies with a canned result.
pub struct FakeLlm {
    reply: Result<String, (u16, String)>,
    seen: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        FakeLlm {
            reply: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        FakeLlm {
            reply: Err((status, body.to_string())),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl LlmClient for FakeLlm {
    fn generate_pr_description(&self, change_log: &str) -> AppResult<String> {
        self.seen.lock().unwrap().push(change_log.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, body)) => Err(AppError::Generation {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

/// Returns a fixed change set, or a fetch error, and counts requests.
pub struct FakeSource {
    reply: Result<ChangeSet, (u16, String)>,
    seen: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn returning(files: Vec<FileChange>) -> Self {
        FakeSource {
            reply: Ok(ChangeSet {
                files,
                ..ChangeSet::default()
            }),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        FakeSource {
            reply: Err((status, body.to_string())),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn ranges(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl CompareSource for FakeSource {
    fn compare(&self, request: &CompareRequest) -> AppResult<ChangeSet> {
        self.seen.lock().unwrap().push(request.range());
        match &self.reply {
            Ok(set) => Ok(set.clone()),
            Err((status, body)) => Err(AppError::Fetch {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

pub fn request() -> CompareRequest {
    CompareRequest {
        owner: "octo".to_string(),
        repo: "widgets".to_string(),
        base: "main".to_string(),
        head: "feature".to_string(),
    }
}

/// A one-shot HTTP server on 127.0.0.1 that replies with a canned response
/// and hands back the raw request it received.
pub struct CannedServer {
    pub base_url: String,
    handle: JoinHandle<String>,
}

impl CannedServer {
    pub fn start(status: &str, content_type: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });

        CannedServer { base_url, handle }
    }

    /// Wait for the single exchange and return the request as text.
    pub fn request(self) -> String {
        self.handle.join().unwrap()
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Split a captured request into its head (lowercased) and body.
pub fn split_request(request: &str) -> (String, &str) {
    match request.split_once("\r\n\r\n") {
        Some((head, body)) => (head.to_lowercase(), body),
        None => (request.to_lowercase(), ""),
    }
}
