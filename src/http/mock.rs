//! Mock HTTP client for testing

use super::{HttpClient, HttpResponse};
use crate::error::MergeError;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A request captured by `MockHttpClient`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Look up a recorded header value by (case-insensitive) name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// In-memory `HttpClient` keyed by exact URL
///
/// Unknown URLs answer `404`. URLs registered with `with_failure` produce a
/// transport error instead of a response.
///
/// # Example
/// ```
/// use clashgraft::http::{HttpClient, MockHttpClient};
///
/// let client = MockHttpClient::new()
///     .with_response("https://example.com/a.yaml", 200, "proxies: []");
///
/// let response = client.get("https://example.com/a.yaml", &[]).unwrap();
/// assert_eq!(response.body, "proxies: []");
/// assert_eq!(client.requests().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockHttpClient {
    state: Arc<RwLock<MockHttpState>>,
}

#[derive(Default)]
struct MockHttpState {
    responses: HashMap<String, HttpResponse>,
    failures: HashMap<String, String>,
    requests: Vec<RecordedRequest>,
}

impl MockHttpClient {
    /// Create an empty mock client
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned response for a URL (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_response<S: Into<String>>(self, url: &str, status: u16, body: S) -> Self {
        if let Ok(mut state) = self.state.write() {
            state
                .responses
                .insert(url.to_owned(), HttpResponse::new(status, body));
        }
        self
    }

    /// Register a transport failure for a URL (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_failure(self, url: &str, message: &str) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.failures.insert(url.to_owned(), message.to_owned());
        }
        self
    }

    /// All requests issued so far, in order
    #[must_use]
    #[inline]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .read()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }
}

impl HttpClient for MockHttpClient {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut state = self
            .state
            .write()
            .map_err(|e| MergeError::network(e.to_string()))?;

        state.requests.push(RecordedRequest {
            url: url.to_owned(),
            headers: headers
                .iter()
                .map(|&(name, value)| (name.to_owned(), value.to_owned()))
                .collect(),
        });

        if let Some(message) = state.failures.get(url) {
            return Err(MergeError::network(message.clone()).into());
        }

        Ok(state
            .responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, "Not Found")))
    }
}
