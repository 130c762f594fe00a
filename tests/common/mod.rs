//! Shared fixtures: a scripted HTTP transport and a log capture.

#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use aitable_mcp::{
    ClientConfig, HttpMethod, HttpRequest, HttpResponse, HttpTransport, Result, TableClient,
};
use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

pub const BASE_URL: &str = "http://mock.test";

type Responder = Box<dyn Fn(&HttpRequest) -> (u16, String) + Send + Sync>;

struct Route {
    method: HttpMethod,
    path: String,
    responder: Responder,
}

/// Transport that answers from registered routes and records every request.
///
/// Requests with no matching route get a 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `method path` by calling `responder`.
    pub fn on<F>(&self, method: HttpMethod, path: &str, responder: F)
    where
        F: Fn(&HttpRequest) -> (u16, JsonValue) + Send + Sync + 'static,
    {
        self.routes.lock().unwrap().push(Route {
            method,
            path: path.to_string(),
            responder: Box::new(move |req| {
                let (status, body) = responder(req);
                (status, body.to_string())
            }),
        });
    }

    /// Answer `method path` with a fixed JSON body.
    pub fn on_json(&self, method: HttpMethod, path: &str, status: u16, body: JsonValue) {
        self.on(method, path, move |_| (status, body.clone()));
    }

    /// Answer `method path` with a fixed raw body.
    pub fn on_raw(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        let body = body.to_string();
        self.routes.lock().unwrap().push(Route {
            method,
            path: path.to_string(),
            responder: Box::new(move |_| (status, body.clone())),
        });
    }

    /// Every request seen so far.
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Requests for `method path`.
    pub fn calls_to(&self, method: HttpMethod, path: &str) -> Vec<HttpRequest> {
        self.calls()
            .into_iter()
            .filter(|r| r.method == method && path_of(r) == path)
            .collect()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|r| path_of(r).starts_with(prefix))
            .count()
    }
}

/// Path part of a mocked request URL.
pub fn path_of(request: &HttpRequest) -> &str {
    request
        .url
        .strip_prefix(BASE_URL)
        .unwrap_or(request.url.as_str())
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(request.clone());

        let routes = self.routes.lock().unwrap();
        let path = path_of(&request);
        let (status, body) = match routes
            .iter()
            .find(|r| r.method == request.method && r.path == path)
        {
            Some(route) => (route.responder)(&request),
            None => (404, json!({ "error": "NOT_FOUND" }).to_string()),
        };
        Ok(HttpResponse { status, body })
    }
}

/// A client wired to `mock`.
pub fn client(mock: &Arc<MockTransport>) -> TableClient {
    let config = ClientConfig::new("test-key", Some(BASE_URL.to_string())).unwrap();
    TableClient::with_transport(config, mock.clone())
}

/// Successful fallback-dialect envelope.
pub fn envelope(data: JsonValue) -> JsonValue {
    json!({ "success": true, "code": 200, "message": "SUCCESS", "data": data })
}

/// Tool arguments from a JSON literal.
pub fn args(value: JsonValue) -> serde_json::Map<String, JsonValue> {
    match value {
        JsonValue::Object(m) => m,
        _ => serde_json::Map::new(),
    }
}

/// Captures formatted tracing output for the current thread.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// Route events on this thread here until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}
