//! Byte-level request transport.
//!
//! DESIGN
//! ======
//! The wrapper in `http` owns every policy decision (headers, status
//! handling, 401 reaction); a `Transport` only sends one request and hands
//! back status + body. That keeps the interceptors testable against a
//! scripted transport while production uses `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
pub use reqwest::Method;
use uuid::Uuid;

use crate::config::Timeouts;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,
}

/// A fully prepared request, after the outbound interceptor ran.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Resource path relative to the base URL, e.g. `/shelters/2`.
    pub path: String,
    /// Absolute URL.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub request_id: Uuid,
}

impl ApiRequest {
    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: any status, body bytes as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

// =============================================================================
// REQWEST
// =============================================================================

/// Production transport. Keeps a cookie store so server-set cookies ride along
/// with later requests, the native equivalent of browser credential inclusion.
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(timeouts: Timeouts) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

fn request_error(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() { TransportError::Timeout } else { TransportError::Request(error.to_string()) }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut builder = self.http.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| request_error(&e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| request_error(&e))?;
        Ok(ApiResponse { status, body: body.to_vec() })
    }
}
