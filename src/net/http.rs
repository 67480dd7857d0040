//! Authenticated HTTP wrapper: the single path every backend call takes.
//!
//! ARCHITECTURE
//! ============
//! Outbound: read the current token from the installed [`TokenProvider`]
//! (falling back to persisted storage when none is installed) and attach it as
//! `Authorization: Bearer <token>`.
//!
//! Inbound: 2xx passes through untouched. Any other status becomes an
//! [`ApiError`]. A 401 additionally removes the persisted token and, unless
//! the request was the verify call, forces navigation to the application
//! root. The error always propagates so callers still observe the failure.
//!
//! DESIGN
//! ======
//! The wrapper never names the session store. The token arrives through the
//! provider seam, injected at construction; `set_token_provider` stays
//! available for late binding and simply replaces the previous provider.
//! Requests already in flight keep the token they were sent with; if it went
//! stale the backend answers 401 and the normal failure path runs.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use super::api;
use super::error::ApiError;
use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use super::types::decode_json;
use crate::navigation::{Navigator, ROOT_PATH};
use crate::storage::{TOKEN_KEY, TokenStorage};

/// Zero-argument accessor for the live bearer token.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

pub struct HttpClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn TokenStorage>,
    navigator: Arc<dyn Navigator>,
    token_provider: RwLock<Option<Arc<dyn TokenProvider>>>,
}

impl HttpClient {
    /// `base_url` is used as given; [`crate::config::ClientConfig`] already
    /// normalizes it.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            storage,
            navigator,
            token_provider: RwLock::new(None),
        }
    }

    /// Install the token provider at construction time.
    #[must_use]
    pub fn with_token_provider(self, provider: Arc<dyn TokenProvider>) -> Self {
        self.set_token_provider(provider);
        self
    }

    /// Replace the token provider. Idempotent; requests already sent are
    /// unaffected.
    pub fn set_token_provider(&self, provider: Arc<dyn TokenProvider>) {
        let mut slot = self.token_provider.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(provider);
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn current_token(&self) -> Option<String> {
        let provider = self
            .token_provider
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        let token = match provider {
            Some(provider) => provider.token(),
            None => self.storage.get(TOKEN_KEY),
        };
        token.filter(|t| !t.trim().is_empty())
    }

    // =========================================================================
    // SEND
    // =========================================================================

    /// Send one request through both interceptors.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when no response arrives,
    /// [`ApiError::Unauthorized`] for 401, and [`ApiError::Status`] for every
    /// other non-2xx status.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse, ApiError> {
        let request = self.prepare(method, path, body);
        let request_id = request.request_id;
        let method = request.method.clone();
        debug!(%method, %path, %request_id, authorized = request.header("authorization").is_some(), "http: request");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, %path, %request_id, error = %e, "http: no response");
                return Err(ApiError::Transport(e));
            }
        };

        if response.is_success() {
            debug!(%method, %path, %request_id, status = response.status, "http: response");
            return Ok(response);
        }
        Err(self.reject(path, request_id, &response))
    }

    fn prepare(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> ApiRequest {
        let request_id = Uuid::new_v4();
        let mut headers = vec![
            ("Accept".to_owned(), "application/json".to_owned()),
            ("X-Request-Id".to_owned(), request_id.to_string()),
        ];
        if let Some(token) = self.current_token() {
            headers.push(("Authorization".to_owned(), format!("Bearer {token}")));
        }
        ApiRequest {
            method,
            path: path.to_owned(),
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
            request_id,
        }
    }

    fn reject(&self, path: &str, request_id: Uuid, response: &ApiResponse) -> ApiError {
        let status = response.status;
        let message = error_message(response);
        warn!(%path, %request_id, status, %message, "http: error status");

        if status != 401 {
            return ApiError::Status { status, message };
        }

        self.storage.remove(TOKEN_KEY);
        if api::is_verify_path(path) {
            debug!(%path, "http: 401 from verify; token cleared, staying put");
        } else {
            self.navigator.navigate(ROOT_PATH);
        }
        ApiError::Unauthorized { message }
    }

    // =========================================================================
    // CONVENIENCE
    // =========================================================================

    /// # Errors
    ///
    /// See [`HttpClient::send`].
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(Method::GET, path, None).await
    }

    /// # Errors
    ///
    /// See [`HttpClient::send`]; also fails if `body` cannot be serialized.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, path, Some(encode(body)?)).await
    }

    /// POST without a body.
    ///
    /// # Errors
    ///
    /// See [`HttpClient::send`].
    pub async fn post_empty(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, path, None).await
    }

    /// # Errors
    ///
    /// See [`HttpClient::send`]; also fails if `body` cannot be serialized.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError> {
        self.send(Method::PUT, path, Some(encode(body)?)).await
    }

    /// # Errors
    ///
    /// See [`HttpClient::send`].
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.send(Method::DELETE, path, None).await
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

/// Best human-readable reason from an error response body.
fn error_message(response: &ApiResponse) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    if let Ok(body) = serde_json::from_slice::<ErrorBody>(&response.body) {
        if let Some(message) = body.message.or(body.error).filter(|m| !m.trim().is_empty()) {
            return message;
        }
    }
    let text = String::from_utf8_lossy(&response.body);
    let text = text.trim();
    if !text.is_empty() && text.len() <= 200 && !text.starts_with(['{', '[', '<']) {
        return text.to_owned();
    }
    format!("Request failed with status code {}", response.status)
}

impl ApiResponse {
    /// Accept only `expected`; any other 2xx is an operation failure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UnexpectedStatus`] on mismatch.
    pub fn expect_status(self, expected: u16) -> Result<Self, ApiError> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(ApiError::UnexpectedStatus { status: self.status, expected })
        }
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        decode_json(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
