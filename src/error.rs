//! Error types for the gateway client.
//!
//! This module defines every error the client can return and how each one
//! is classified (machine code, retryability).

use crate::gateway::Operation;

/// Failure reported by a [`Transport`](crate::services::transport::Transport).
///
/// The client never interprets HTTP status codes, so this only covers
/// failures where no response came back at all.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying HTTP client failed (connection refused, timeout, TLS...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other transport failure, described by a message.
    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

/// Client-wide error type.
///
/// # Error Categories
///
/// - **Input Errors**: invalid bank account or missing request parameters.
///   Always raised before any network call and never retryable.
/// - **Transport Errors**: the request could not be delivered.
/// - **Response Errors**: the gateway answered with a body that is not a JSON object.
/// - **Unsupported Operations**: declared gateway operations with no implementation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Bank account is missing a required field or has a malformed number.
    ///
    /// The String names the offending field.
    #[error("{0}")]
    InvalidBankAccount(String),

    /// A request-level parameter (amount, memo, store, card...) is missing or invalid.
    #[error("{0}")]
    InvalidRequest(String),

    /// API key cannot be sent as an `Authorization` header value.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body could not be decoded into a JSON object.
    #[error("Malformed response (HTTP {status}): {reason}")]
    MalformedResponse { status: u16, reason: String },

    /// The operation is declared by the gateway but not implemented.
    #[error("The {0} operation is not implemented by this gateway")]
    NotImplemented(Operation),

    /// Request payload could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GatewayError {
    /// Stable machine-readable code for this error.
    ///
    /// # Code Mapping
    ///
    /// - `InvalidBankAccount` → `invalid_bank_account`
    /// - `InvalidRequest` → `invalid_request`
    /// - `InvalidApiKey` → `invalid_api_key`
    /// - `Transport` → `transport_error`
    /// - `MalformedResponse` → `malformed_response`
    /// - `NotImplemented` → `not_implemented`
    /// - `Serialization` → `serialization_error`
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::InvalidBankAccount(_) => "invalid_bank_account",
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::InvalidApiKey => "invalid_api_key",
            GatewayError::Transport(_) => "transport_error",
            GatewayError::MalformedResponse { .. } => "malformed_response",
            GatewayError::NotImplemented(_) => "not_implemented",
            GatewayError::Serialization(_) => "serialization_error",
        }
    }

    /// Only transport failures may succeed on a second attempt; every other
    /// kind needs the caller to change its input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

/// Build the "parameter is required" error for a request-level parameter.
pub(crate) fn missing_parameter(name: &str) -> GatewayError {
    GatewayError::InvalidRequest(format!("The {name} parameter is required"))
}
