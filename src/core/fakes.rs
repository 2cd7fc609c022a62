// src/core/fakes.rs
//! In-memory stand-ins for the external services, shared by unit and route tests

use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::core::compiler_client::LatexCompiler;
use crate::core::database::{LatexSource, RpcPayload};
use crate::core::error::ServiceError;
use crate::core::pipeline::PDF_SIGNATURE;
use crate::core::snippet::{Snippet, SnippetHost};

/// Ordered record of outbound calls made across all fakes
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: &str) {
        self.0.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| *c == call).count()
    }
}

/// snippet id -> (raw url, content)
pub type SnippetStore = Arc<Mutex<HashMap<String, (String, String)>>>;

pub struct FakeSnippetHost {
    log: CallLog,
    store: SnippetStore,
    credentials: bool,
    create_fails: bool,
    delete_fails: bool,
    check_statuses: Mutex<VecDeque<u16>>,
    next_id: AtomicUsize,
}

impl FakeSnippetHost {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            store: SnippetStore::default(),
            credentials: true,
            create_fails: false,
            delete_fails: false,
            check_statuses: Mutex::new(VecDeque::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    pub fn without_credentials(mut self) -> Self {
        self.credentials = false;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.create_fails = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.delete_fails = true;
        self
    }

    /// Statuses returned by successive checks; 200 once exhausted
    pub fn check_statuses(self, statuses: &[u16]) -> Self {
        *self.check_statuses.lock().unwrap() = statuses.iter().copied().collect();
        self
    }

    pub fn store(&self) -> SnippetStore {
        Arc::clone(&self.store)
    }

    pub fn stored_ids(&self) -> Vec<String> {
        self.store.lock().unwrap().keys().cloned().collect()
    }
}

#[rocket::async_trait]
impl SnippetHost for FakeSnippetHost {
    fn ensure_credentials(&self) -> Result<(), ServiceError> {
        if self.credentials {
            Ok(())
        } else {
            Err(ServiceError::Configuration(
                "GITHUB_TOKEN not configured".to_string(),
            ))
        }
    }

    async fn create(&self, content: &str) -> Result<Snippet, ServiceError> {
        self.log.record("create");
        if self.create_fails {
            return Err(ServiceError::Upstream(
                "Error creating Gist: 422 Unprocessable Entity".to_string(),
            ));
        }

        let id = format!("snippet-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let raw_url = format!("https://snippets.test/{}/raw", id);
        self.store
            .lock()
            .unwrap()
            .insert(id.clone(), (raw_url.clone(), content.to_string()));

        Ok(Snippet { id, raw_url })
    }

    async fn check_available(&self, _snippet: &Snippet) -> Result<u16, ServiceError> {
        self.log.record("check");
        Ok(self.check_statuses.lock().unwrap().pop_front().unwrap_or(200))
    }

    async fn delete(&self, snippet_id: &str) -> Result<(), ServiceError> {
        self.log.record("delete");
        if self.delete_fails {
            return Err(ServiceError::Upstream("Gist deletion returned status 500".to_string()));
        }
        self.store.lock().unwrap().remove(snippet_id);
        Ok(())
    }
}

/// Compiler that "renders" the fetched source as `%PDF-1.5\n<source>`
pub struct FakeCompiler {
    log: CallLog,
    store: SnippetStore,
    fail_status: Option<u16>,
    raw_body: Option<Vec<u8>>,
}

impl FakeCompiler {
    pub fn new(log: CallLog, store: SnippetStore) -> Self {
        Self {
            log,
            store,
            fail_status: None,
            raw_body: None,
        }
    }

    pub fn failing_with(mut self, status: u16) -> Self {
        self.fail_status = Some(status);
        self
    }

    pub fn returning_raw(mut self, body: &[u8]) -> Self {
        self.raw_body = Some(body.to_vec());
        self
    }
}

#[rocket::async_trait]
impl LatexCompiler for FakeCompiler {
    async fn compile_url(&self, source_url: &str) -> Result<Vec<u8>, ServiceError> {
        self.log.record("compile");
        tokio::task::yield_now().await;

        if let Some(status) = self.fail_status {
            return Err(ServiceError::Compilation {
                status,
                body: "! LaTeX error: Undefined control sequence.".to_string(),
            });
        }
        if let Some(body) = &self.raw_body {
            return Ok(body.clone());
        }

        let source = self
            .store
            .lock()
            .unwrap()
            .values()
            .find(|(raw_url, _)| raw_url == source_url)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| ServiceError::Upstream(format!("{} not found", source_url)))?;

        let mut pdf = PDF_SIGNATURE.to_vec();
        pdf.extend_from_slice(b"1.5\n");
        pdf.extend_from_slice(source.as_bytes());
        Ok(pdf)
    }
}

/// RPC returning queued results in order; the last one repeats
pub struct FakeLatexSource {
    results: Mutex<VecDeque<Result<Value, String>>>,
    calls: AtomicUsize,
}

impl FakeLatexSource {
    pub fn returning(value: Value) -> Self {
        Self::sequence(vec![Ok(value)])
    }

    pub fn failing(message: &str) -> Self {
        Self::sequence(vec![Err(message.to_string())])
    }

    pub fn sequence(results: Vec<Result<Value, String>>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[rocket::async_trait]
impl LatexSource for FakeLatexSource {
    fn rpc_name(&self) -> &str {
        "get_latex"
    }

    async fn fetch_latex(&self) -> Result<RpcPayload, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut results = self.results.lock().unwrap();
            if results.len() > 1 {
                results.pop_front()
            } else {
                results.front().cloned()
            }
        };

        match next {
            Some(Ok(value)) => Ok(RpcPayload(value)),
            Some(Err(message)) => Err(ServiceError::Upstream(message)),
            None => Ok(RpcPayload(Value::Null)),
        }
    }
}

/// Loopback HTTP server answering every request from a fixed routing function.
///
/// Each request is recorded as `"<METHOD> <path>"` (query string included).
pub struct CannedServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

type Route = dyn Fn(&str, &str) -> (u16, String) + Send + Sync;

impl CannedServer {
    pub async fn start<F>(route: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let route: Arc<Route> = Arc::new(route);

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(answer(stream, Arc::clone(&route), Arc::clone(&seen)));
            }
        });

        Self { url, requests }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_starting_with(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }
}

async fn answer(mut stream: TcpStream, route: Arc<Route>, seen: Arc<Mutex<Vec<String>>>) {
    let Some((method, path)) = read_request_line(&mut stream).await else {
        return;
    };
    seen.lock().unwrap().push(format!("{} {}", method, path));

    let (status, body) = route(&method, &path);
    let response = format!(
        "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Reads the whole request (head and sized body) and returns method and target
async fn read_request_line(stream: &mut TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut parts = head.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();
    Some((method, target))
}
