//! Gateway façade.
//!
//! The [`Gateway`] holds credentials plus request defaults and builds the
//! request object for each operation. Only check creation (`purchase`, with
//! `authorize` as an alias) and tokenization (`createToken`) are supported;
//! every other declared operation fails with `NotImplemented`.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::models::response::{CreateCheckResponse, TokenizationResponse};
use crate::services::ApiContext;
use crate::services::purchase_request::{PurchaseOptions, PurchaseRequest};
use crate::services::tokenization_request::{TokenizationOptions, TokenizationRequest};
use crate::services::transport::Transport;

/// Every operation a gateway can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Purchase,
    Authorize,
    CreateToken,
    Capture,
    Void,
    Refund,
    CompleteAuthorize,
    CompletePurchase,
    FetchTransaction,
    CreateCard,
    UpdateCard,
    DeleteCard,
    AcceptNotification,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::Purchase,
        Operation::Authorize,
        Operation::CreateToken,
        Operation::Capture,
        Operation::Void,
        Operation::Refund,
        Operation::CompleteAuthorize,
        Operation::CompletePurchase,
        Operation::FetchTransaction,
        Operation::CreateCard,
        Operation::UpdateCard,
        Operation::DeleteCard,
        Operation::AcceptNotification,
    ];

    /// camelCase name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Purchase => "purchase",
            Operation::Authorize => "authorize",
            Operation::CreateToken => "createToken",
            Operation::Capture => "capture",
            Operation::Void => "void",
            Operation::Refund => "refund",
            Operation::CompleteAuthorize => "completeAuthorize",
            Operation::CompletePurchase => "completePurchase",
            Operation::FetchTransaction => "fetchTransaction",
            Operation::CreateCard => "createCard",
            Operation::UpdateCard => "updateCard",
            Operation::DeleteCard => "deleteCard",
            Operation::AcceptNotification => "acceptNotification",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            Operation::Purchase | Operation::Authorize | Operation::CreateToken
        )
    }

    /// Fail with `NotImplemented` unless this gateway supports the operation.
    pub fn ensure_supported(self) -> Result<Self, GatewayError> {
        if self.is_supported() {
            Ok(self)
        } else {
            tracing::warn!(operation = %self, "Unsupported gateway operation requested");
            Err(GatewayError::NotImplemented(self))
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the camelCase name (`createToken`) or its snake_case form (`create_token`).
impl FromStr for Operation {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.chars().filter(|c| *c != '_').collect();
        Operation::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| GatewayError::InvalidRequest(format!("Unknown operation: {s}")))
    }
}

/// Gateway-level settings.
///
/// `store`, `token` and `memo` act as defaults: a request that leaves one of
/// them unset inherits the gateway's value.
#[derive(Debug, Clone, Default)]
pub struct GatewayParameters {
    pub context: ApiContext,
    pub store: Option<String>,
    pub token: Option<String>,
    pub memo: Option<String>,
}

impl GatewayParameters {
    pub fn new(api_key: impl Into<String>, test_mode: bool) -> Self {
        Self {
            context: ApiContext::new(api_key, test_mode),
            ..Self::default()
        }
    }
}

/// Options for [`Gateway::request`], one variant per supported request kind.
#[derive(Debug, Clone)]
pub enum OperationOptions<'a> {
    Purchase(PurchaseOptions<'a>),
    Tokenization(TokenizationOptions<'a>),
}

/// A request built by [`Gateway::request`].
#[derive(Debug, Clone)]
pub enum GatewayRequest<'a> {
    Purchase(PurchaseRequest<'a>),
    Tokenization(TokenizationRequest<'a>),
}

impl GatewayRequest<'_> {
    /// Validated request body as JSON.
    pub fn data(&self) -> Result<Value, GatewayError> {
        let value = match self {
            GatewayRequest::Purchase(request) => serde_json::to_value(request.data()?)?,
            GatewayRequest::Tokenization(request) => serde_json::to_value(request.data()?)?,
        };
        Ok(value)
    }

    pub async fn send<T>(&self, transport: &T) -> Result<GatewayResponse, GatewayError>
    where
        T: Transport + ?Sized,
    {
        match self {
            GatewayRequest::Purchase(request) => {
                request.send(transport).await.map(GatewayResponse::CreateCheck)
            }
            GatewayRequest::Tokenization(request) => {
                request.send(transport).await.map(GatewayResponse::Tokenization)
            }
        }
    }
}

/// Response matching a [`GatewayRequest`].
#[derive(Debug, Clone)]
pub enum GatewayResponse {
    CreateCheck(CreateCheckResponse),
    Tokenization(TokenizationResponse),
}

impl GatewayResponse {
    pub fn is_successful(&self) -> bool {
        match self {
            GatewayResponse::CreateCheck(response) => response.is_successful(),
            GatewayResponse::Tokenization(response) => response.is_successful(),
        }
    }

    pub fn transaction_reference(&self) -> Option<String> {
        match self {
            GatewayResponse::CreateCheck(response) => response.transaction_reference(),
            GatewayResponse::Tokenization(response) => response.transaction_reference(),
        }
    }

    pub fn message(&self) -> Option<String> {
        match self {
            GatewayResponse::CreateCheck(response) => response.message(),
            GatewayResponse::Tokenization(response) => response.message(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            GatewayResponse::CreateCheck(response) => response.status_code(),
            GatewayResponse::Tokenization(response) => response.status_code(),
        }
    }

    pub fn data(&self) -> &Map<String, Value> {
        match self {
            GatewayResponse::CreateCheck(response) => response.data(),
            GatewayResponse::Tokenization(response) => response.data(),
        }
    }
}

/// Seamlesschex gateway.
#[derive(Debug, Clone, Default)]
pub struct Gateway {
    parameters: GatewayParameters,
}

impl Gateway {
    pub const NAME: &'static str = "Seamlesschex";

    pub fn new(parameters: GatewayParameters) -> Self {
        Self { parameters }
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    pub fn parameters(&self) -> &GatewayParameters {
        &self.parameters
    }

    pub fn api_key(&self) -> &str {
        self.parameters.context.api_key()
    }

    pub fn test_mode(&self) -> bool {
        self.parameters.context.test_mode()
    }

    pub fn store(&self) -> Option<&str> {
        self.parameters.store.as_deref()
    }

    pub fn set_store(&mut self, store: impl Into<String>) -> &mut Self {
        self.parameters.store = Some(store.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.parameters.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.parameters.token = Some(token.into());
        self
    }

    pub fn memo(&self) -> Option<&str> {
        self.parameters.memo.as_deref()
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) -> &mut Self {
        self.parameters.memo = Some(memo.into());
        self
    }

    /// Build a check creation, filling unset `store`, `token` and `memo`
    /// from the gateway defaults.
    pub fn purchase<'a>(&self, mut options: PurchaseOptions<'a>) -> PurchaseRequest<'a> {
        options.store = options.store.or_else(|| self.parameters.store.clone());
        options.token = options.token.or_else(|| self.parameters.token.clone());
        options.memo = options.memo.or_else(|| self.parameters.memo.clone());
        PurchaseRequest::new(self.parameters.context.clone(), options)
    }

    /// Same operation as [`Gateway::purchase`]; this gateway does not
    /// distinguish authorization from purchase.
    pub fn authorize<'a>(&self, options: PurchaseOptions<'a>) -> PurchaseRequest<'a> {
        self.purchase(options)
    }

    /// Build a tokenization, filling an unset `store` from the gateway default.
    pub fn create_token<'a>(&self, mut options: TokenizationOptions<'a>) -> TokenizationRequest<'a> {
        options.store = options.store.or_else(|| self.parameters.store.clone());
        TokenizationRequest::new(self.parameters.context.clone(), options)
    }

    /// Build the request for `operation`.
    ///
    /// # Errors
    ///
    /// - `NotImplemented`: the operation is declared but not supported
    /// - `InvalidRequest`: the options do not fit the operation
    pub fn request<'a>(
        &self,
        operation: Operation,
        options: OperationOptions<'a>,
    ) -> Result<GatewayRequest<'a>, GatewayError> {
        match (operation.ensure_supported()?, options) {
            (Operation::Purchase, OperationOptions::Purchase(options)) => {
                Ok(GatewayRequest::Purchase(self.purchase(options)))
            }
            (Operation::Authorize, OperationOptions::Purchase(options)) => {
                Ok(GatewayRequest::Purchase(self.authorize(options)))
            }
            (Operation::CreateToken, OperationOptions::Tokenization(options)) => {
                Ok(GatewayRequest::Tokenization(self.create_token(options)))
            }
            (op, _) => Err(GatewayError::InvalidRequest(format!(
                "Options do not match the {op} operation"
            ))),
        }
    }
}
