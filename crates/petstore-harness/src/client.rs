// crates/petstore-harness/src/client.rs
// ============================================================================
// Module: Harness HTTP Client
// Description: JSON HTTP client returning HTTP errors as data.
// Purpose: Separate transport failures from non-2xx responses, with transcripts.
// Dependencies: reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! [`HarnessClient`] issues GET/POST/PUT/DELETE requests with JSON bodies,
//! headers, and query parameters. Any HTTP response, whatever its status, is
//! returned as an [`HttpResponse`]; only failures to obtain a response
//! (timeouts, DNS, refused or reset connections, unreadable bodies) become a
//! [`TransportError`]. Every exchange is appended to a transcript shared by
//! clones of the client.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::HarnessConfig;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// User agent sent with every request.
const USER_AGENT: &str = concat!("petstore-contract/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// HTTP methods used by the pet-store API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
    /// PUT request.
    Put,
    /// DELETE request.
    Delete,
}

impl HttpMethod {
    /// Returns the method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Maps to the reqwest method.
    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional body, headers, and query parameters for a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// JSON request body.
    pub body: Option<Value>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

// ============================================================================
// SECTION: Response Types
// ============================================================================

/// Non-2xx response returned as data.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("http status {status}")]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// Parsed response body (`null` when empty).
    pub body: Value,
}

/// Normalized HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpResponse {
    /// 2xx response.
    Success {
        /// HTTP status code.
        status: u16,
        /// Parsed response body (`null` when empty).
        data: Value,
    },
    /// Any other status.
    Error(HttpError),
}

impl HttpResponse {
    /// Builds a response from a status code and parsed body.
    #[must_use]
    pub fn from_parts(status: u16, body: Value) -> Self {
        if (200..300).contains(&status) {
            Self::Success {
                status,
                data: body,
            }
        } else {
            Self::Error(HttpError {
                status,
                body,
            })
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Success {
                status, ..
            } => *status,
            Self::Error(error) => error.status,
        }
    }

    /// Returns the response body, for either variant.
    #[must_use]
    pub const fn body(&self) -> &Value {
        match self {
            Self::Success {
                data, ..
            } => data,
            Self::Error(error) => &error.body,
        }
    }

    /// Returns true for 2xx responses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the error payload for non-2xx responses.
    #[must_use]
    pub const fn error(&self) -> Option<&HttpError> {
        match self {
            Self::Success {
                ..
            } => None,
            Self::Error(error) => Some(error),
        }
    }
}

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// Transport failure classification.
///
/// # Invariants
/// - Variants are stable for report labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// The request exceeded its timeout.
    Timeout,
    /// DNS resolution or connection establishment failed.
    Connect,
    /// The request failed to send or the connection dropped.
    Request,
    /// The response body could not be read.
    Body,
    /// The target URL could not be built.
    InvalidUrl,
}

impl TransportErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::InvalidUrl => "invalid_url",
        }
    }
}

/// Failure to obtain an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{} error on {method} {url}: {message}", .kind.as_str())]
pub struct TransportError {
    /// Failure classification.
    pub kind: TransportErrorKind,
    /// Request method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Underlying error text.
    pub message: String,
}

impl TransportError {
    /// Classifies a reqwest error.
    fn from_reqwest(method: HttpMethod, url: &Url, error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else if error.is_body() || error.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Request
        };
        Self {
            kind,
            method,
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// One recorded HTTP exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    /// Monotonic sequence number, starting at 1.
    pub sequence: u64,
    /// Request method.
    pub method: HttpMethod,
    /// Full request URL including query.
    pub url: String,
    /// Request body, if any.
    pub request: Option<Value>,
    /// Response status, when a response arrived.
    pub status: Option<u16>,
    /// Response body, when a response arrived.
    pub response: Option<Value>,
    /// Transport error text, when no response arrived.
    pub error: Option<String>,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// JSON HTTP client bound to a base URL.
#[derive(Clone)]
pub struct HarnessClient {
    /// Root URL onto which request paths are joined.
    base_url: Url,
    /// Underlying HTTP client.
    client: Client,
    /// Timeout applied per request.
    timeout: Duration,
    /// Shared transcript of exchanges.
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
    /// Shared sequence counter for transcript entries.
    sequence: Arc<AtomicU64>,
}

impl HarnessClient {
    /// Creates a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ClientSetup`] when the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, HarnessError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| HarnessError::ClientSetup(err.to_string()))?;
        Ok(Self {
            base_url,
            client,
            timeout,
            transcript: Arc::new(Mutex::new(Vec::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Creates a client from harness configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::ClientSetup`] when the HTTP client cannot be built.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, HarnessError> {
        Self::new(config.base_url.clone(), config.timeout)
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns a snapshot of the transcript entries.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Joins raw path segments onto the base URL, percent-encoding each one.
    ///
    /// # Errors
    ///
    /// Returns a message when the base URL cannot carry path segments.
    pub fn url_for_segments<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url, String> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| format!("base url {} cannot carry a path", self.base_url))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        Ok(url)
    }

    /// Resolves a target that is either an absolute URL or a `/`-separated
    /// path relative to the base URL.
    ///
    /// # Errors
    ///
    /// Returns a message when the target cannot be turned into a URL.
    pub fn resolve(&self, target: &str) -> Result<Url, String> {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Url::parse(target).map_err(|err| format!("invalid url {target}: {err}"));
        }
        let segments: Vec<&str> = target.split('/').filter(|part| !part.is_empty()).collect();
        self.url_for_segments(&segments)
    }

    /// Issues a request against a path or absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was obtained. Non-2xx
    /// responses are returned as [`HttpResponse::Error`].
    pub async fn request(
        &self,
        method: HttpMethod,
        target: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(target).map_err(|message| TransportError {
            kind: TransportErrorKind::InvalidUrl,
            method,
            url: target.to_string(),
            message,
        })?;
        self.send(method, url, &options).await
    }

    /// Issues a request against a fully resolved URL.
    ///
    /// Query parameters in `options` are appended to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was obtained.
    pub async fn send(
        &self,
        method: HttpMethod,
        mut url: Url,
        options: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        if !options.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &options.query {
                pairs.append_pair(name, value);
            }
        }
        let mut builder = self.client.request(method.to_reqwest(), url.clone()).timeout(self.timeout);
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let outcome = match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                response.bytes().await.map(|bytes| HttpResponse::from_parts(status, parse_body(&bytes)))
            }
            Err(err) => Err(err),
        };
        match outcome {
            Ok(response) => {
                self.record(TranscriptEntry {
                    sequence: 0,
                    method,
                    url: url.to_string(),
                    request: options.body.clone(),
                    status: Some(response.status()),
                    response: Some(response.body().clone()),
                    error: None,
                });
                Ok(response)
            }
            Err(err) => {
                let error = TransportError::from_reqwest(method, &url, &err);
                self.record(TranscriptEntry {
                    sequence: 0,
                    method,
                    url: url.to_string(),
                    request: options.body.clone(),
                    status: None,
                    response: None,
                    error: Some(error.to_string()),
                });
                Err(error)
            }
        }
    }

    /// Appends an entry with the next sequence number.
    fn record(&self, mut entry: TranscriptEntry) {
        entry.sequence = self.sequence.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        if let Ok(mut entries) = self.transcript.lock() {
            entries.push(entry);
        }
    }
}

/// Parses a response body as JSON, falling back to a string for other text.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only assertions inside Result-returning tests."
    )]

    use serde_json::json;

    use super::*;

    fn client(base: &str) -> Result<HarnessClient, String> {
        let url = Url::parse(base).map_err(|err| err.to_string())?;
        HarnessClient::new(url, Duration::from_secs(1)).map_err(|err| err.to_string())
    }

    #[test]
    fn segments_are_joined_and_encoded() -> Result<(), String> {
        let client = client("https://petstore.example/v2")?;
        let url = client.url_for_segments(&["user", "random user"])?;
        assert_eq!(url.as_str(), "https://petstore.example/v2/user/random%20user");
        Ok(())
    }

    #[test]
    fn trailing_slash_on_base_is_not_doubled() -> Result<(), String> {
        let client = client("https://petstore.example/v2/")?;
        let url = client.resolve("/pet/findByStatus")?;
        assert_eq!(url.as_str(), "https://petstore.example/v2/pet/findByStatus");
        Ok(())
    }

    #[test]
    fn absolute_targets_bypass_base() -> Result<(), String> {
        let client = client("https://petstore.example/v2")?;
        let url = client.resolve("http://other.example/pet/1")?;
        assert_eq!(url.host_str(), Some("other.example"));
        Ok(())
    }

    #[test]
    fn responses_split_on_2xx() {
        let ok = HttpResponse::from_parts(200, json!({"id": 1}));
        assert!(ok.is_success());
        assert!(ok.error().is_none());
        let missing = HttpResponse::from_parts(404, json!({"message": "Pet not found"}));
        assert!(!missing.is_success());
        assert_eq!(missing.status(), 404);
        assert_eq!(missing.body()["message"], "Pet not found");
    }

    #[test]
    fn bodies_fall_back_to_text_or_null() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"  \n"), Value::Null);
        assert_eq!(parse_body(b"{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_body(b"<html>oops</html>"), json!("<html>oops</html>"));
    }

    #[tokio::test]
    async fn unparseable_target_is_a_transport_error() -> Result<(), String> {
        let client = client("https://petstore.example/v2")?;
        let result = client.request(HttpMethod::Get, "http://[::1", RequestOptions::default()).await;
        let Err(error) = result else {
            return Err("expected invalid url".to_string());
        };
        assert_eq!(error.kind, TransportErrorKind::InvalidUrl);
        assert!(client.transcript().is_empty());
        Ok(())
    }
}
