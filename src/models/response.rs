//! Gateway response parsers.
//!
//! This module defines:
//! - `Response`: the decoded JSON body shared by every operation
//! - `CreateCheckResponse`: result of a check creation
//! - `TokenizationResponse`: result of a bank account tokenization
//!
//! Bodies are decoded into a weakly-typed JSON object. Accessors project
//! single fields out of it and return `None` when a field (or its parent
//! object) is missing or `null`.

use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::services::transport::RawResponse;

/// Look up `key`, treating `null` as absent.
fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

/// Look up `key` and require it to be a JSON object.
fn object_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    field(object, key).and_then(Value::as_object)
}

/// Render a scalar as text. Strings are returned as-is, numbers and
/// booleans in their JSON form. Arrays and objects have no scalar form.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A decoded gateway response.
///
/// Immutable once built. Success is computed from the body on every call,
/// never stored separately.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    data: Map<String, Value>,
}

impl Response {
    /// Decode a raw transport response.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` when the body is not valid JSON or is
    /// valid JSON but not an object. HTTP error statuses are not errors:
    /// their bodies are parsed like any other.
    pub fn from_raw(raw: RawResponse) -> Result<Self, GatewayError> {
        let value: Value =
            serde_json::from_slice(&raw.body).map_err(|e| GatewayError::MalformedResponse {
                status: raw.status,
                reason: e.to_string(),
            })?;

        let data = match value {
            Value::Object(data) => data,
            other => {
                return Err(GatewayError::MalformedResponse {
                    status: raw.status,
                    reason: format!("expected a JSON object, got {}", json_kind(&other)),
                });
            }
        };

        Ok(Self {
            status: raw.status,
            headers: raw.headers,
            data,
        })
    }

    /// The body has a `success` key. Its value is not inspected, so
    /// `"success": false` still counts; only `null` does not.
    pub fn is_successful(&self) -> bool {
        field(&self.data, "success").is_some()
    }

    /// Top-level `message` field, when the gateway sends one.
    pub fn message(&self) -> Option<String> {
        field(&self.data, "message").and_then(scalar_text)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Result of `POST check/create`.
///
/// # JSON Example
///
/// ```json
/// {
///   "success": true,
///   "check": { "check_id": "abc123", "status": "in_process" }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CreateCheckResponse {
    inner: Response,
}

impl CreateCheckResponse {
    pub const IN_PROCESS: &'static str = "in_process";

    pub fn from_raw(raw: RawResponse) -> Result<Self, GatewayError> {
        Response::from_raw(raw).map(Self::from)
    }

    pub fn check(&self) -> Option<&Map<String, Value>> {
        object_field(&self.inner.data, "check")
    }

    /// The created check's id.
    pub fn transaction_reference(&self) -> Option<String> {
        self.check()
            .and_then(|check| field(check, "check_id"))
            .and_then(scalar_text)
    }

    pub fn status(&self) -> Option<&str> {
        self.check()
            .and_then(|check| field(check, "status"))
            .and_then(Value::as_str)
    }

    /// Successful only when the body has `success`, a check object, and the
    /// check status is `in_process`.
    pub fn is_successful(&self) -> bool {
        self.inner.is_successful() && self.status() == Some(Self::IN_PROCESS)
    }

    pub fn message(&self) -> Option<String> {
        self.inner.message()
    }

    pub fn data(&self) -> &Map<String, Value> {
        self.inner.data()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn status_code(&self) -> u16 {
        self.inner.status_code()
    }
}

impl From<Response> for CreateCheckResponse {
    fn from(inner: Response) -> Self {
        Self { inner }
    }
}

/// Result of `POST account/tokenization`.
///
/// # JSON Example
///
/// ```json
/// {
///   "success": true,
///   "tokenization": {
///     "token": "tok_1",
///     "bank": "Example Bank",
///     "routing": "999900001",
///     "last4": "0016",
///     "name": "Example Customer"
///   }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TokenizationResponse {
    inner: Response,
}

impl TokenizationResponse {
    pub fn from_raw(raw: RawResponse) -> Result<Self, GatewayError> {
        Response::from_raw(raw).map(Self::from)
    }

    pub fn tokenization(&self) -> Option<&Map<String, Value>> {
        object_field(&self.inner.data, "tokenization")
    }

    fn tokenization_field(&self, key: &str) -> Option<String> {
        self.tokenization()
            .and_then(|tokenization| field(tokenization, key))
            .and_then(scalar_text)
    }

    /// The token is the reference for this transaction.
    pub fn transaction_reference(&self) -> Option<String> {
        self.token()
    }

    pub fn token(&self) -> Option<String> {
        self.tokenization_field("token")
    }

    pub fn bank(&self) -> Option<String> {
        self.tokenization_field("bank")
    }

    pub fn routing(&self) -> Option<String> {
        self.tokenization_field("routing")
    }

    pub fn last4(&self) -> Option<String> {
        self.tokenization_field("last4")
    }

    pub fn name(&self) -> Option<String> {
        self.tokenization_field("name")
    }

    pub fn is_successful(&self) -> bool {
        self.inner.is_successful()
    }

    pub fn message(&self) -> Option<String> {
        self.inner.message()
    }

    pub fn data(&self) -> &Map<String, Value> {
        self.inner.data()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn status_code(&self) -> u16 {
        self.inner.status_code()
    }
}

impl From<Response> for TokenizationResponse {
    fn from(inner: Response) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn success_is_key_presence_only() {
        let ok = Response::from_raw(raw(200, r#"{"success":true}"#)).unwrap();
        assert!(ok.is_successful());

        let falsy = Response::from_raw(raw(200, r#"{"success":false}"#)).unwrap();
        assert!(falsy.is_successful());

        let null = Response::from_raw(raw(200, r#"{"success":null}"#)).unwrap();
        assert!(!null.is_successful());

        let missing = Response::from_raw(raw(200, r#"{"error":"nope"}"#)).unwrap();
        assert!(!missing.is_successful());
    }

    #[test]
    fn malformed_bodies_are_errors() {
        let err = Response::from_raw(raw(502, "<html>Bad Gateway</html>")).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse { status: 502, .. }));

        let err = Response::from_raw(raw(200, "")).unwrap_err();
        assert_eq!(err.code(), "malformed_response");

        let err = Response::from_raw(raw(200, "[1,2]")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed response (HTTP 200): expected a JSON object, got an array"
        );
    }

    #[test]
    fn error_statuses_still_parse() {
        let response =
            Response::from_raw(raw(401, r#"{"message":"Unauthenticated."}"#)).unwrap();
        assert_eq!(response.status_code(), 401);
        assert_eq!(response.message().as_deref(), Some("Unauthenticated."));
        assert!(!response.is_successful());
    }

    #[test]
    fn in_process_check_is_successful() {
        let response = CreateCheckResponse::from_raw(raw(
            200,
            r#"{"success":true,"check":{"check_id":"abc123","status":"in_process"}}"#,
        ))
        .unwrap();

        assert!(response.is_successful());
        assert_eq!(response.transaction_reference().as_deref(), Some("abc123"));
        assert_eq!(response.status(), Some("in_process"));
    }

    #[test]
    fn declined_check_is_not_successful() {
        let response = CreateCheckResponse::from_raw(raw(
            200,
            r#"{"success":true,"check":{"check_id":"abc123","status":"declined"}}"#,
        ))
        .unwrap();

        assert!(!response.is_successful());
        assert_eq!(response.transaction_reference().as_deref(), Some("abc123"));
    }

    #[test]
    fn check_without_success_key_or_check_object_fails() {
        let response = CreateCheckResponse::from_raw(raw(
            200,
            r#"{"check":{"check_id":"abc123","status":"in_process"}}"#,
        ))
        .unwrap();
        assert!(!response.is_successful());

        let response = CreateCheckResponse::from_raw(raw(200, r#"{"success":true}"#)).unwrap();
        assert!(!response.is_successful());
        assert!(response.check().is_none());
        assert!(response.transaction_reference().is_none());
    }

    #[test]
    fn numeric_check_id_is_rendered_as_text() {
        let response = CreateCheckResponse::from_raw(raw(
            200,
            r#"{"success":true,"check":{"check_id":4711,"status":"in_process"}}"#,
        ))
        .unwrap();
        assert_eq!(response.transaction_reference().as_deref(), Some("4711"));
    }

    #[test]
    fn tokenization_projections() {
        let response = TokenizationResponse::from_raw(raw(
            200,
            r#"{"success":true,"tokenization":{"token":"tok_1","last4":"0016"}}"#,
        ))
        .unwrap();

        assert!(response.is_successful());
        assert_eq!(response.token().as_deref(), Some("tok_1"));
        assert_eq!(response.transaction_reference().as_deref(), Some("tok_1"));
        assert_eq!(response.last4().as_deref(), Some("0016"));
        assert!(response.bank().is_none());
        assert!(response.routing().is_none());
        assert!(response.name().is_none());
    }

    #[test]
    fn empty_tokenization_body_has_nothing() {
        let response = TokenizationResponse::from_raw(raw(200, "{}")).unwrap();

        assert!(!response.is_successful());
        assert!(response.tokenization().is_none());
        assert!(response.token().is_none());
        assert!(response.bank().is_none());
        assert!(response.routing().is_none());
        assert!(response.last4().is_none());
        assert!(response.name().is_none());
        assert!(response.transaction_reference().is_none());
    }
}
