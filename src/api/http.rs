//! HTTP transport
//!
//! The dispatcher only sees the [`Transport`] trait: a descriptor goes in,
//! a decoded body or a failure comes out. [`ReqwestTransport`] is the
//! production implementation; tests substitute their own.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::Error;
use crate::resource::{HttpMethod, RequestDescriptor};

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const USER_AGENT: &str = concat!("mainflux-sdk/", env!("CARGO_PKG_VERSION"));

/// Why a request did not produce a decoded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The remote answered with a non-2xx status
    Status { status: u16, body: String },
    /// No response at all (DNS, connect, TLS, timeout, reset)
    Unreachable(String),
    /// A 2xx body that is not JSON
    Decode(String),
}

/// Executes request descriptors
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. A successful empty body decodes to `Value::Null`.
    async fn execute(&self, request: &RequestDescriptor) -> Result<Value, TransportFailure>;
}

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let char_count = body.chars().count();
    let truncated = if char_count > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the default client settings
    pub fn new() -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::HttpClient)?;

        Ok(Self { client })
    }

}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &RequestDescriptor) -> Result<Value, TransportFailure> {
        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("No response from {}: {}", request.url, e);
            TransportFailure::Unreachable(e.to_string())
        })?;

        let status = response.status();

        if !status.is_success() {
            // The status stands even if the body is cut short
            let body = response.text().await.unwrap_or_default();
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(TransportFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportFailure::Unreachable(e.to_string()))?;

        // Handle empty response
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| TransportFailure::Decode(e.to_string()))
    }
}
