//! Real HTTP client backed by `reqwest::blocking`

use super::{HttpClient, HttpResponse};
use crate::error::MergeError;
use anyhow::Result;
use std::time::Duration;

/// User agent sent with every request; the GitHub API rejects anonymous agents
const USER_AGENT: &str = concat!("clashgraft/", env!("CARGO_PKG_VERSION"));

/// Production implementation of `HttpClient`
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Build a client with the given request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TLS backend cannot be initialised
    #[inline]
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| MergeError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        for &(name, value) in headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .map_err(|e| MergeError::network(e.without_url().to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| MergeError::network(e.without_url().to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
