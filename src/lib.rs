//! Seamlesschex gateway client.
//!
//! Builds and validates check-creation and bank-account tokenization
//! requests for the Seamlesschex API, sends them through a [`Transport`],
//! and parses the JSON responses.
//!
//! # Example
//!
//! ```no_run
//! use seamlesschex::{BankAccount, Gateway, GatewayParameters, HttpTransport, PurchaseOptions};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Gateway::new(GatewayParameters::new("MyApiKey", true));
//!
//! let mut bank = BankAccount::new();
//! bank.set_first_name("Example")
//!     .set_last_name("Customer")
//!     .set_number("1111000016")
//!     .set_routing("999900001")
//!     .set_email("customer@example.com");
//!
//! let options = PurchaseOptions::new(&bank)
//!     .amount("10.00".parse()?)
//!     .memo("This is a test transaction.");
//!
//! let response = gateway.purchase(options).send(&HttpTransport::new()?).await?;
//! if response.is_successful() {
//!     println!("Check created: {:?}", response.transaction_reference());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{GatewayError, TransportError};
pub use gateway::{
    Gateway, GatewayParameters, GatewayRequest, GatewayResponse, Operation, OperationOptions,
};
pub use models::amount::Amount;
pub use models::bank_account::BankAccount;
pub use models::response::{CreateCheckResponse, Response, TokenizationResponse};
pub use services::ApiContext;
pub use services::purchase_request::{CreateCheckPayload, PurchaseOptions, PurchaseRequest};
pub use services::tokenization_request::{
    TokenizationOptions, TokenizationPayload, TokenizationRequest,
};
pub use services::transport::{HttpTransport, RawResponse, Transport};
