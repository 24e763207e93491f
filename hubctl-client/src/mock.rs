//! Scripted in-memory transport for tests
//!
//! Responses are registered per method and path. When several responses are
//! queued for the same route they are served in order and the last one keeps
//! being served. Unscripted requests get a 599 so they stand out in
//! assertions.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::transport::{Method, RawResponse, Transport};

/// Status returned for requests nobody scripted
pub const UNSCRIPTED_STATUS: u16 = 599;

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    /// Body decoded as JSON
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<RawResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for a route
    pub fn on(&self, method: Method, path: &str, response: RawResponse) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    /// Queue a JSON response for a route
    pub fn on_json(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        let body = serde_json::to_vec(&body).unwrap();
        self.on(method, path, RawResponse::new(status, body));
    }

    /// Queue a plain text response for a route
    pub fn on_text(&self, method: Method, path: &str, status: u16, body: &str) {
        self.on(method, path, RawResponse::new(status, body.as_bytes()));
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Paths of the requests received with the given method
    pub fn paths(&self, method: Method) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .map(|r| r.path)
            .collect()
    }

    fn respond(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> RawResponse {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            body,
        });

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&(method, path.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => RawResponse::new(
                UNSCRIPTED_STATUS,
                format!("unscripted {} {}", method, path).into_bytes(),
            ),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        Ok(self.respond(Method::Get, path, None))
    }

    async fn post(&self, path: &str, body: Option<Vec<u8>>) -> Result<RawResponse> {
        Ok(self.respond(Method::Post, path, body))
    }

    async fn patch(&self, path: &str, body: Vec<u8>) -> Result<RawResponse> {
        Ok(self.respond(Method::Patch, path, Some(body)))
    }

    async fn delete(&self, path: &str) -> Result<RawResponse> {
        Ok(self.respond(Method::Delete, path, None))
    }
}
