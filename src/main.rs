//! Seamlesschex CLI - runs one gateway operation from the command line.
//!
//! # Usage
//!
//! ```text
//! seamlesschex <operation> [options.json | -]
//! ```
//!
//! The options document is read from the given file, or from stdin when the
//! path is `-` or missing. It holds the request options plus a `card` object
//! describing the bank account:
//!
//! ```json
//! {
//!   "amount": "10.00",
//!   "memo": "This is a test transaction.",
//!   "card": {
//!     "first_name": "Example",
//!     "last_name": "Customer",
//!     "number": "1111000016",
//!     "routing": "999900001",
//!     "email": "customer@example.com"
//!   }
//! }
//! ```
//!
//! # Flow
//!
//! 1. Parse the operation and reject unsupported ones
//! 2. Load configuration from environment variables
//! 3. Read and decode the options document
//! 4. Build, validate and send the request
//! 5. Print a JSON summary of the response to stdout (logs go to stderr)

use std::io::Read;

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use seamlesschex::{
    BankAccount, Config, Gateway, GatewayParameters, GatewayResponse, HttpTransport, Operation,
    OperationOptions, PurchaseOptions, TokenizationOptions,
};

const USAGE: &str = "usage: seamlesschex <operation> [options.json | -]";

/// Options document: request options with the bank account alongside.
#[derive(Deserialize)]
struct OptionsDocument<O> {
    #[serde(default)]
    card: Option<BankAccount>,

    #[serde(flatten)]
    options: O,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let operation: Operation = args.next().context(USAGE)?.parse()?;
    operation.ensure_supported()?;

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(test_mode = config.test_mode, "Configuration loaded");

    let gateway = Gateway::new(GatewayParameters::from(&config));
    let transport = HttpTransport::with_timeout(config.timeout())?;

    let document = read_document(args.next().as_deref())?;

    let response = match operation {
        Operation::CreateToken => {
            let OptionsDocument { card, mut options } =
                serde_json::from_str::<OptionsDocument<TokenizationOptions>>(&document)
                    .context("Invalid tokenization options")?;
            options.card = card.as_ref();
            gateway
                .request(operation, OperationOptions::Tokenization(options))?
                .send(&transport)
                .await?
        }
        _ => {
            let OptionsDocument { card, mut options } =
                serde_json::from_str::<OptionsDocument<PurchaseOptions>>(&document)
                    .context("Invalid purchase options")?;
            options.card = card.as_ref();
            gateway
                .request(operation, OperationOptions::Purchase(options))?
                .send(&transport)
                .await?
        }
    };

    print_summary(operation, &response)?;
    Ok(())
}

/// Read the options document from a file, or stdin for `-` / no path.
fn read_document(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        None | Some("-") => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read options from stdin")?;
            Ok(buffer)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options from {path}")),
    }
}

fn print_summary(operation: Operation, response: &GatewayResponse) -> anyhow::Result<()> {
    let summary = json!({
        "operation": operation.name(),
        "successful": response.is_successful(),
        "transaction_reference": response.transaction_reference(),
        "message": response.message(),
        "status_code": response.status_code(),
        "data": response.data(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
