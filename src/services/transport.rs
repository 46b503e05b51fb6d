//! HTTP transport used to reach the gateway API.
//!
//! Request builders only produce a method, URL, headers and body. A
//! [`Transport`] delivers them and hands back the raw response; the default
//! implementation is [`HttpTransport`], backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::HeaderMap;

use crate::error::TransportError;

/// Raw response as returned by the transport, before any decoding.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Sends one HTTP request and returns whatever came back.
///
/// Implementations must not treat HTTP error statuses as failures; only
/// errors where no response was received should surface as `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError>;
}

/// `reqwest`-backed transport.
///
/// # Timeout
///
/// One client-wide timeout (default 30 seconds). There are no retries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError> {
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Request to {} failed: {}", url, e);
            TransportError::from(e)
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
