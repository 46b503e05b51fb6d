use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::HeaderMap;
use seamlesschex::{BankAccount, RawResponse, Transport, TransportError};

/// One request as seen by the transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Transport that records every request and answers with a canned response.
pub struct MockTransport {
    status: u16,
    body: String,
    fail: bool,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::responding(0, "")
        }
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError> {
        let body = body
            .map(|b| serde_json::from_slice(&b).unwrap())
            .unwrap_or(serde_json::Value::Null);
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        });

        if self.fail {
            return Err(TransportError::Unavailable("connection refused".to_string()));
        }

        Ok(RawResponse {
            status: self.status,
            headers: HeaderMap::new(),
            body: self.body.clone().into_bytes(),
        })
    }
}

pub fn bank_account() -> BankAccount {
    let mut account = BankAccount::new();
    account
        .set_first_name("Example")
        .set_last_name("Customer")
        .set_number("1111000016")
        .set_routing("999900001")
        .set_email("customer@example.com")
        .set_phone("000-000-0000")
        .set_address1("1 Scrubby Creek Road")
        .set_city("Scrubby Creek")
        .set_postcode("4999")
        .set_state("QLD")
        .set_country("AU");
    account
}
