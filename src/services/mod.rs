//! Request builders and the plumbing they share.
//!
//! Each builder validates its input, assembles a JSON payload and posts it
//! to its endpoint through a [`Transport`](transport::Transport).

pub mod purchase_request;
pub mod tokenization_request;
pub mod transport;

use std::fmt;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::error::GatewayError;
use transport::{RawResponse, Transport};

pub const LIVE_ENDPOINT: &str = "https://api.seamlesschex.com/v1/";
pub const TEST_ENDPOINT: &str = "https://sandbox.seamlesschex.com/v1/";

/// Credentials and mode every request is sent with.
#[derive(Clone, Default)]
pub struct ApiContext {
    api_key: String,
    test_mode: bool,
}

impl ApiContext {
    pub fn new(api_key: impl Into<String>, test_mode: bool) -> Self {
        Self {
            api_key: api_key.into(),
            test_mode,
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    /// Sandbox base URL in test mode, live base URL otherwise.
    pub fn base_endpoint(&self) -> &'static str {
        if self.test_mode {
            TEST_ENDPOINT
        } else {
            LIVE_ENDPOINT
        }
    }

    /// Full endpoint for an API path such as `check/create`.
    pub fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        Url::parse(self.base_endpoint())
            .and_then(|base| base.join(path))
            .map_err(|e| GatewayError::InvalidRequest(format!("Invalid endpoint {path:?}: {e}")))
    }

    /// Headers sent on every request.
    ///
    /// - `Authorization: Bearer <api key>`
    /// - `Content-Type: application/json`
    pub fn headers(&self) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| GatewayError::InvalidApiKey)?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiContext")
            .field("api_key", &"[REDACTED]")
            .field("test_mode", &self.test_mode)
            .finish()
    }
}

/// POST a JSON payload to `path` and return the raw response.
///
/// # Process
///
/// 1. Resolve the endpoint for the current mode
/// 2. Build auth headers
/// 3. Serialize the payload
/// 4. Hand everything to the transport
///
/// Every step before the transport call is local, so invalid input never
/// reaches the network.
pub(crate) async fn post_json<T, P>(
    context: &ApiContext,
    transport: &T,
    path: &str,
    payload: &P,
) -> Result<RawResponse, GatewayError>
where
    T: Transport + ?Sized,
    P: Serialize,
{
    // Everything that can fail locally happens before the transport is used
    let url = context.endpoint(path)?;
    let headers = context.headers()?;
    let body = serde_json::to_vec(payload)?;

    let span = tracing::info_span!(
        "gateway_request",
        request_id = %Uuid::new_v4(),
        endpoint = %url,
        test_mode = context.test_mode()
    );

    async move {
        tracing::debug!(bytes = body.len(), "Sending request");
        let response = transport
            .request(Method::POST, url.as_str(), headers, Some(body))
            .await?;
        // Error statuses are returned as-is for the response parsers
        tracing::info!(status = response.status, "Gateway responded");
        Ok::<_, GatewayError>(response)
    }
    .instrument(span)
    .await
}
