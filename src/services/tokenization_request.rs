//! Bank account tokenization (`POST account/tokenization`).
//!
//! Exchanges raw account and routing numbers for a reusable token. The
//! token is bound to the `store` it was issued for; pass the same store to
//! later token-based check creations.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GatewayError, missing_parameter};
use crate::models::bank_account::BankAccount;
use crate::models::response::TokenizationResponse;
use crate::services::transport::Transport;
use crate::services::{ApiContext, post_json};

/// Options for a tokenization.
///
/// `email` and `phone` are request-level values; they are not read from the
/// bank account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenizationOptions<'a> {
    #[serde(skip)]
    pub card: Option<&'a BankAccount>,

    pub store: Option<String>,

    pub email: Option<String>,

    pub phone: Option<String>,
}

impl<'a> TokenizationOptions<'a> {
    pub fn new(card: &'a BankAccount) -> Self {
        Self {
            card: Some(card),
            ..Self::default()
        }
    }

    pub fn card(mut self, card: &'a BankAccount) -> Self {
        self.card = Some(card);
        self
    }

    pub fn store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// JSON body of `POST account/tokenization`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenizationPayload {
    pub first_name: String,
    pub last_name: String,
    pub bank_account: String,
    pub bank_routing: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

/// A tokenization, ready to be validated and sent.
#[derive(Debug, Clone)]
pub struct TokenizationRequest<'a> {
    context: ApiContext,
    options: TokenizationOptions<'a>,
}

impl<'a> TokenizationRequest<'a> {
    pub const PATH: &'static str = "account/tokenization";

    pub fn new(context: ApiContext, options: TokenizationOptions<'a>) -> Self {
        Self { context, options }
    }

    pub fn options(&self) -> &TokenizationOptions<'a> {
        &self.options
    }

    pub fn endpoint(&self) -> Result<Url, GatewayError> {
        self.context.endpoint(Self::PATH)
    }

    /// Validate the options and build the request body.
    ///
    /// `store` is checked first, then the account's tokenization rules
    /// (names and numbers; email is not required).
    pub fn data(&self) -> Result<TokenizationPayload, GatewayError> {
        let options = &self.options;

        // Store first, then the account itself
        let store = options
            .store
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing_parameter("store"))?;
        let card = options.card.ok_or_else(|| missing_parameter("card"))?;
        card.validate_token_request()?;

        Ok(TokenizationPayload {
            first_name: card.first_name().unwrap_or_default().to_string(),
            last_name: card.last_name().unwrap_or_default().to_string(),
            bank_account: card.bank_account().unwrap_or_default().to_string(),
            bank_routing: card.bank_routing().unwrap_or_default().to_string(),
            email: options.email.clone(),
            phone: options.phone.clone(),
            store: Some(store.to_string()),
        })
    }

    pub async fn send<T>(&self, transport: &T) -> Result<TokenizationResponse, GatewayError>
    where
        T: Transport + ?Sized,
    {
        // Validate before anything is sent
        let payload = self.data()?;
        let masked = self.options.card.map(|card| card.number_masked('X'));
        tracing::debug!(
            account = masked.as_deref(),
            store = payload.store.as_deref(),
            "Tokenizing bank account"
        );

        let raw = post_json(&self.context, transport, Self::PATH, &payload).await?;
        let response = TokenizationResponse::from_raw(raw).inspect_err(|e| {
            tracing::warn!("Could not decode tokenization response: {}", e);
        })?;

        let last4 = response.last4();
        tracing::info!(
            successful = response.is_successful(),
            last4 = last4.as_deref(),
            "Tokenization completed"
        );
        Ok(response)
    }
}
