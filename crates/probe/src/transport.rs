//! HTTP transport seam for the prober.
//!
//! The prober only needs "POST this JSON with these headers, tell me the
//! status code", so the seam is exactly that. Tests substitute a counting
//! mock; production uses [`HttpTransport`] over `reqwest`.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Bound on each probe request. A probe that exceeds this surfaces as
/// unreachable; there is no cancellation or retry.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

/// A fully assembled probe request.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// Target endpoint URL.
    pub url: String,
    /// Header name/value pairs, auth included.
    pub headers: Vec<(&'static str, String)>,
    /// JSON request body.
    pub body: serde_json::Value,
}

/// The request could not complete at all.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Underlying HTTP client failure (connect error, timeout).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-HTTP transport failure.
    #[error("{0}")]
    Unreachable(String),
}

/// Seam between the prober and the network.
pub trait Transport: Send + Sync {
    /// POST the request and return the response status code.
    fn post(
        &self,
        request: ProbeRequest,
    ) -> impl Future<Output = Result<u16, TransportError>> + Send;
}

impl<T: Transport> Transport for &T {
    fn post(
        &self,
        request: ProbeRequest,
    ) -> impl Future<Output = Result<u16, TransportError>> + Send {
        (**self).post(request)
    }
}

/// `reqwest`-backed transport with a bounded request timeout.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .expect("default http client");
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    async fn post(&self, request: ProbeRequest) -> Result<u16, TransportError> {
        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        let response = builder.send().await?;
        Ok(response.status().as_u16())
    }
}
