//! HTTP abstraction for remote repository and direct-URL fetches
//!
//! Mirrors the `System` split: a trait used by the content sources, a
//! production client and an in-memory mock for tests.

use anyhow::Result;

pub mod mock;
pub mod real;

pub use mock::MockHttpClient;
pub use real::ReqwestClient;

/// Minimal response surface the merge pipeline needs
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body decoded as UTF-8 text
    pub body: String,
}

impl HttpResponse {
    /// Create a response from status and body
    #[must_use]
    #[inline]
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    #[must_use]
    #[inline]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Blocking HTTP GET client
pub trait HttpClient: Send + Sync {
    /// Issue a GET request with the given extra headers
    ///
    /// # Errors
    ///
    /// Returns `MergeError::Network` when the request cannot be completed.
    /// Non-2xx responses are NOT errors at this layer.
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;
}
