//! Check creation (`POST check/create`).
//!
//! A check is paid either from a bank account (account + routing number) or
//! from a token previously issued by the tokenization endpoint. A non-empty
//! token always wins: the bank account is then neither validated nor sent.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};
use url::Url;

use crate::error::{GatewayError, missing_parameter};
use crate::models::amount::Amount;
use crate::models::bank_account::BankAccount;
use crate::models::response::CreateCheckResponse;
use crate::services::transport::Transport;
use crate::services::{ApiContext, post_json};

/// Options for a check creation.
///
/// # JSON Example
///
/// ```json
/// {
///   "amount": "10.00",
///   "memo": "This is a test transaction.",
///   "store": "store.com",
///   "verify_before_save": true,
///   "fund_confirmation": false
/// }
/// ```
///
/// The bank account is not part of the JSON form; attach it with
/// [`PurchaseOptions::card`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PurchaseOptions<'a> {
    /// Bank account to debit (borrowed from the caller)
    #[serde(skip)]
    pub card: Option<&'a BankAccount>,

    pub amount: Option<Amount>,

    /// Description printed on the check
    pub memo: Option<String>,

    /// Token from a previous tokenization; replaces the bank account
    pub token: Option<String>,

    /// Store the token was issued for
    pub store: Option<String>,

    /// Check number
    pub number: Option<String>,

    pub authorization_date: Option<NaiveDate>,

    pub label: Option<String>,

    #[serde(deserialize_with = "flag")]
    pub recurring: Option<bool>,

    pub recurring_cycle: Option<String>,

    #[serde(alias = "recurring_state_date")]
    pub recurring_start_date: Option<NaiveDate>,

    pub recurring_installments: Option<u32>,

    #[serde(deserialize_with = "flag")]
    pub verify_before_save: Option<bool>,

    #[serde(deserialize_with = "flag")]
    pub fund_confirmation: Option<bool>,
}

/// Deserialize a yes/no option given either as a boolean or as `0` / `1`.
fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u64),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(value)) => Ok(Some(value)),
        Some(Flag::Int(0)) => Ok(Some(false)),
        Some(Flag::Int(1)) => Ok(Some(true)),
        Some(Flag::Int(other)) => Err(de::Error::custom(format!(
            "expected a boolean or 0/1, got {other}"
        ))),
    }
}

impl<'a> PurchaseOptions<'a> {
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

    pub fn amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }
}

/// JSON body of `POST check/create`.
///
/// `amount`, `memo`, `email` and `name` are always sent (`email` as `null`
/// when the account has none); everything else only when set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateCheckPayload {
    pub amount: Amount,
    pub memo: String,
    pub email: Option<String>,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_routing: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "flag")]
    pub recurring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_cycle: Option<String>,
    /// The API spells this key `recurring_state_date`.
    #[serde(rename = "recurring_state_date", skip_serializing_if = "Option::is_none")]
    pub recurring_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_installments: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "flag")]
    pub verify_before_save: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(deserialize_with = "flag")]
    pub fund_confirmation: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn owned(value: Option<&str>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

/// A check creation, ready to be validated and sent.
#[derive(Debug, Clone)]
pub struct PurchaseRequest<'a> {
    context: ApiContext,
    options: PurchaseOptions<'a>,
}

impl<'a> PurchaseRequest<'a> {
    pub const PATH: &'static str = "check/create";

    pub fn new(context: ApiContext, options: PurchaseOptions<'a>) -> Self {
        Self { context, options }
    }

    pub fn options(&self) -> &PurchaseOptions<'a> {
        &self.options
    }

    pub fn endpoint(&self) -> Result<Url, GatewayError> {
        self.context.endpoint(Self::PATH)
    }

    /// Validate the options and build the request body.
    ///
    /// # Process
    ///
    /// 1. Require `amount` and `memo`, reject negative amounts
    /// 2. Token path: require `store`, send `token` + `store`
    /// 3. Bank path: fully validate the account, send account + routing numbers
    /// 4. Copy optional check settings and the account's contact details
    ///
    /// # Errors
    ///
    /// - `InvalidRequest`: a required parameter is missing
    /// - `InvalidBankAccount`: bank path only, the account failed validation
    pub fn data(&self) -> Result<CreateCheckPayload, GatewayError> {
        let options = &self.options;

        // Required parameters, in reporting order
        let amount = options.amount.ok_or_else(|| missing_parameter("amount"))?;
        let memo = non_empty(options.memo.as_deref()).ok_or_else(|| missing_parameter("memo"))?;
        if amount.is_negative() {
            return Err(GatewayError::InvalidRequest(
                "A negative amount is not allowed.".to_string(),
            ));
        }
        let card = options.card.ok_or_else(|| missing_parameter("card"))?;

        // Base payload, with the optional check fields passed through
        let mut payload = CreateCheckPayload {
            amount,
            memo: memo.to_string(),
            email: card.email().map(str::to_string),
            name: card.name(),
            token: None,
            store: None,
            bank_account: None,
            bank_routing: None,
            number: options.number.clone(),
            authorization_date: options.authorization_date,
            label: options.label.clone(),
            recurring: options.recurring,
            recurring_cycle: options.recurring_cycle.clone(),
            recurring_start_date: options.recurring_start_date,
            recurring_installments: options.recurring_installments,
            verify_before_save: options.verify_before_save,
            fund_confirmation: options.fund_confirmation,
            phone: owned(card.phone()),
            city: owned(card.city()),
            state: owned(card.state()),
            zip: owned(card.zip()),
            address: None,
        };

        // Pay with a stored token, or with the validated bank account
        match non_empty(options.token.as_deref()) {
            Some(token) => {
                let store =
                    non_empty(options.store.as_deref()).ok_or_else(|| missing_parameter("store"))?;
                tracing::debug!(store, "Paying check with a stored token");
                payload.token = Some(token.to_string());
                payload.store = Some(store.to_string());
            }
            None => {
                card.validate()?;
                tracing::debug!(
                    account = %card.number_masked('X'),
                    "Paying check from bank account"
                );
                payload.bank_account = owned(card.bank_account());
                payload.bank_routing = owned(card.bank_routing());
            }
        }

        // Address lines are joined into one field
        if let Some(address1) = non_empty(card.address1()) {
            payload.address = Some(match non_empty(card.address2()) {
                Some(address2) => format!("{address1} {address2}"),
                None => address1.to_string(),
            });
        }

        Ok(payload)
    }

    /// Validate, send, and parse the response.
    ///
    /// Validation errors are returned before the transport is touched.
    pub async fn send<T>(&self, transport: &T) -> Result<CreateCheckResponse, GatewayError>
    where
        T: Transport + ?Sized,
    {
        // Validate before anything is sent
        let payload = self.data()?;
        let raw = post_json(&self.context, transport, Self::PATH, &payload).await?;
        let response = CreateCheckResponse::from_raw(raw).inspect_err(|e| {
            tracing::warn!("Could not decode check creation response: {}", e);
        })?;

        let check_id = response.transaction_reference();
        tracing::info!(
            successful = response.is_successful(),
            check_id = check_id.as_deref(),
            status = response.status(),
            "Check creation completed"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account() -> BankAccount {
        let mut account = BankAccount::new();
        account
            .set_first_name("Example")
            .set_last_name("Customer")
            .set_number("1111000016")
            .set_routing("999900001")
            .set_email("customer@example.com");
        account
    }

    fn request(options: PurchaseOptions<'_>) -> PurchaseRequest<'_> {
        PurchaseRequest::new(ApiContext::new("key", true), options)
    }

    fn ten_dollars() -> Amount {
        "10.00".parse().unwrap()
    }

    #[test]
    fn bank_account_payload() {
        let card = account();
        let options = PurchaseOptions::new(&card).amount(ten_dollars()).memo("test");

        let payload = serde_json::to_value(request(options).data().unwrap()).unwrap();

        assert_eq!(
            payload,
            json!({
                "amount": "10.00",
                "memo": "test",
                "email": "customer@example.com",
                "name": "Example Customer",
                "bank_account": "1111000016",
                "bank_routing": "999900001"
            })
        );
    }

    #[test]
    fn token_payload_skips_bank_account_validation() {
        let mut card = BankAccount::new();
        card.set_first_name("Example").set_last_name("Customer");

        let options = PurchaseOptions::new(&card)
            .amount(ten_dollars())
            .memo("test")
            .token("asfaifn9ausengv9awsn")
            .store("store.com");

        let payload = serde_json::to_value(request(options).data().unwrap()).unwrap();

        assert_eq!(
            payload,
            json!({
                "amount": "10.00",
                "memo": "test",
                "email": null,
                "name": "Example Customer",
                "token": "asfaifn9ausengv9awsn",
                "store": "store.com"
            })
        );
    }

    #[test]
    fn token_requires_store() {
        let card = account();
        let options = PurchaseOptions::new(&card)
            .amount(ten_dollars())
            .memo("test")
            .token("tok_1");

        let err = request(options).data().unwrap_err();
        assert_eq!(err.to_string(), "The store parameter is required");
    }

    #[test]
    fn empty_token_falls_back_to_bank_account() {
        let card = BankAccount::new();
        let options = PurchaseOptions::new(&card)
            .amount(ten_dollars())
            .memo("test")
            .token("");

        let err = request(options).data().unwrap_err();
        assert!(matches!(err, GatewayError::InvalidBankAccount(_)));
    }

    #[test]
    fn missing_amount_fails_first() {
        let card = BankAccount::new();
        let options = PurchaseOptions::new(&card);

        let err = request(options).data().unwrap_err();
        assert_eq!(err.to_string(), "The amount parameter is required");
    }

    #[test]
    fn missing_memo_fails() {
        let card = account();
        let options = PurchaseOptions::new(&card).amount(ten_dollars());

        let err = request(options).data().unwrap_err();
        assert_eq!(err.to_string(), "The memo parameter is required");
    }

    #[test]
    fn negative_amount_is_rejected() {
        let card = account();
        let options = PurchaseOptions::new(&card)
            .amount(Amount::from_cents(-100))
            .memo("test");

        let err = request(options).data().unwrap_err();
        assert_eq!(err.to_string(), "A negative amount is not allowed.");
    }

    #[test]
    fn missing_card_fails() {
        let options = PurchaseOptions::default().amount(ten_dollars()).memo("test");

        let err = request(options).data().unwrap_err();
        assert_eq!(err.to_string(), "The card parameter is required");
    }

    #[test]
    fn invalid_bank_account_fails_on_bank_path() {
        let mut card = account();
        card.set_email("");
        let options = PurchaseOptions::new(&card).amount(ten_dollars()).memo("test");

        let err = request(options).data().unwrap_err();
        assert_eq!(err.to_string(), "The email address is required");
    }

    #[test]
    fn optional_fields_and_address() {
        let mut card = account();
        card.set_phone("000-000-0000")
            .set_address1("1 Scrubby Creek Road")
            .set_address2("Unit 4")
            .set_city("Scrubby Creek")
            .set_state("QLD")
            .set_postcode("4999")
            .set_country("AU");

        let mut options = PurchaseOptions::new(&card).amount(ten_dollars()).memo("test");
        options.number = Some("1001".to_string());
        options.authorization_date = NaiveDate::from_ymd_opt(2026, 1, 15);
        options.label = Some("rent".to_string());
        options.recurring = Some(true);
        options.recurring_cycle = Some("month".to_string());
        options.recurring_start_date = NaiveDate::from_ymd_opt(2026, 2, 1);
        options.recurring_installments = Some(12);
        options.verify_before_save = Some(true);
        options.fund_confirmation = Some(false);

        let payload = serde_json::to_value(request(options).data().unwrap()).unwrap();

        assert_eq!(payload["number"], "1001");
        assert_eq!(payload["authorization_date"], "2026-01-15");
        assert_eq!(payload["label"], "rent");
        assert_eq!(payload["recurring"], true);
        assert_eq!(payload["recurring_cycle"], "month");
        assert_eq!(payload["recurring_state_date"], "2026-02-01");
        assert_eq!(payload["recurring_installments"], 12);
        assert_eq!(payload["verify_before_save"], true);
        assert_eq!(payload["fund_confirmation"], false);
        assert_eq!(payload["phone"], "000-000-0000");
        assert_eq!(payload["city"], "Scrubby Creek");
        assert_eq!(payload["state"], "QLD");
        assert_eq!(payload["zip"], "4999");
        assert_eq!(payload["address"], "1 Scrubby Creek Road Unit 4");
        assert!(payload.get("country").is_none());
    }

    #[test]
    fn address_without_second_line() {
        let mut card = account();
        card.set_address1("1 Scrubby Creek Road");
        let options = PurchaseOptions::new(&card).amount(ten_dollars()).memo("test");

        let payload = request(options).data().unwrap();
        assert_eq!(payload.address.as_deref(), Some("1 Scrubby Creek Road"));
    }

    #[test]
    fn second_address_line_alone_is_not_sent() {
        let mut card = account();
        card.set_address2("Unit 4");
        let options = PurchaseOptions::new(&card).amount(ten_dollars()).memo("test");

        assert!(request(options).data().unwrap().address.is_none());
    }

    #[test]
    fn options_deserialize_from_json() {
        let options: PurchaseOptions = serde_json::from_value(json!({
            "amount": "10.00",
            "memo": "test",
            "recurring_state_date": "2026-02-01",
            "verify_before_save": true
        }))
        .unwrap();

        assert_eq!(options.amount, Some(ten_dollars()));
        assert_eq!(options.recurring_start_date, NaiveDate::from_ymd_opt(2026, 2, 1));
        assert_eq!(options.verify_before_save, Some(true));
        assert!(options.card.is_none());
    }

    #[test]
    fn flags_accept_zero_and_one() {
        let options: PurchaseOptions = serde_json::from_value(json!({
            "recurring": false,
            "verify_before_save": 1,
            "fund_confirmation": 0
        }))
        .unwrap();
        assert_eq!(options.recurring, Some(false));
        assert_eq!(options.verify_before_save, Some(true));
        assert_eq!(options.fund_confirmation, Some(false));

        let err = serde_json::from_value::<PurchaseOptions>(json!({ "fund_confirmation": 2 }))
            .unwrap_err();
        assert!(err.to_string().contains("expected a boolean or 0/1, got 2"));
    }

    #[test]
    fn endpoint_is_check_create() {
        let card = account();
        let request = request(PurchaseOptions::new(&card));
        assert_eq!(
            request.endpoint().unwrap().as_str(),
            "https://sandbox.seamlesschex.com/v1/check/create"
        );
    }
}
