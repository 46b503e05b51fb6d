//! Bank account payment method.
//!
//! This module defines:
//! - `BankAccount`: the payer's account/routing numbers plus identity and address
//! - The two validation rule sets (check creation vs. tokenization)

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::GatewayError;

static ACCOUNT_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4,17}$").expect("Invalid account number regex"));

static ROUTING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{9}$").expect("Invalid routing number regex"));

/// A payer's bank account, used as the payment method for checks.
///
/// # JSON Example
///
/// ```json
/// {
///   "first_name": "Example",
///   "last_name": "Customer",
///   "number": "1111000016",
///   "routing": "999900001",
///   "email": "customer@example.com",
///   "address1": "1 Scrubby Creek Road",
///   "city": "Scrubby Creek",
///   "postcode": "4999",
///   "state": "QLD"
/// }
/// ```
///
/// # Validation
///
/// Nothing is checked at construction time. Call [`BankAccount::validate`] or
/// [`BankAccount::validate_token_request`] before using the account in a request.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BankAccount {
    /// Account number, digits only
    #[serde(alias = "bank_account", deserialize_with = "digits_only")]
    number: Option<String>,

    /// ABA routing number
    #[serde(alias = "routing")]
    bank_routing: Option<String>,

    #[serde(alias = "firstName", alias = "billingFirstName")]
    first_name: Option<String>,

    #[serde(alias = "lastName", alias = "billingLastName")]
    last_name: Option<String>,

    email: Option<String>,

    #[serde(alias = "billingPhone")]
    phone: Option<String>,

    #[serde(alias = "billingAddress1")]
    address1: Option<String>,

    #[serde(alias = "billingAddress2")]
    address2: Option<String>,

    #[serde(alias = "billingCity")]
    city: Option<String>,

    #[serde(alias = "billingState")]
    state: Option<String>,

    #[serde(alias = "zip", alias = "billingPostcode")]
    postcode: Option<String>,

    #[serde(alias = "billingCountry")]
    country: Option<String>,
}

/// Deserialize an account number from a string or an integer, stripping
/// every non-digit character.
fn digits_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Digits {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Digits>::deserialize(deserializer)?.map(|value| match value {
        Digits::Text(text) => strip_non_digits(&text),
        Digits::Number(number) => number.to_string(),
    }))
}

fn strip_non_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Treat empty strings the same as absent values.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl BankAccount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the account for a check payment.
    ///
    /// Required fields, checked in order: account number, routing number,
    /// first name, last name, email. The first missing one is reported.
    pub fn validate(&self) -> Result<(), GatewayError> {
        self.require(&[
            (&self.number, "bank account number"),
            (&self.bank_routing, "bank account routing number"),
            (&self.first_name, "first name"),
            (&self.last_name, "last name"),
            (&self.email, "email address"),
        ])?;
        self.validate_formats()
    }

    /// Validate the account for tokenization. Email is not required here.
    pub fn validate_token_request(&self) -> Result<(), GatewayError> {
        self.require(&[
            (&self.first_name, "first name"),
            (&self.last_name, "last name"),
            (&self.number, "bank account number"),
            (&self.bank_routing, "bank account routing number"),
        ])?;
        self.validate_formats()
    }

    fn require(&self, fields: &[(&Option<String>, &str)]) -> Result<(), GatewayError> {
        match fields.iter().find(|(value, _)| present(value).is_none()) {
            Some((_, label)) => {
                tracing::warn!(field = *label, "Bank account is missing a required field");
                Err(GatewayError::InvalidBankAccount(format!(
                    "The {label} is required"
                )))
            }
            None => Ok(()),
        }
    }

    fn validate_formats(&self) -> Result<(), GatewayError> {
        if let Some(number) = &self.number {
            if !ACCOUNT_NUMBER_RE.is_match(number) {
                return Err(GatewayError::InvalidBankAccount(
                    "Bank Account number should have 4 to 17 digits".to_string(),
                ));
            }
        }

        if let Some(routing) = &self.bank_routing {
            if !ROUTING_NUMBER_RE.is_match(routing) {
                return Err(GatewayError::InvalidBankAccount(
                    "Bank Account routing number should be 9 digits".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    /// Set the account number.
    ///
    /// Non-numeric characters are stripped, so "11-11 0000 16" is stored as "1111000016".
    pub fn set_number(&mut self, value: impl AsRef<str>) -> &mut Self {
        self.number = Some(strip_non_digits(value.as_ref()));
        self
    }

    pub fn bank_account(&self) -> Option<&str> {
        self.number()
    }

    pub fn set_bank_account(&mut self, value: impl AsRef<str>) -> &mut Self {
        self.set_number(value)
    }

    /// Last four characters of the account number, or `None` when it is empty.
    pub fn number_last_four(&self) -> Option<&str> {
        let number = present(&self.number)?;
        let start = number.len().saturating_sub(4);
        Some(&number[start..])
    }

    /// Account number with everything but the last four digits replaced by `mask`.
    ///
    /// Numbers of four digits or fewer have nothing to hide and are returned as stored.
    pub fn number_masked(&self, mask: char) -> String {
        let number = self.number.as_deref().unwrap_or_default();
        let hidden = number.len().saturating_sub(4);
        let mut masked: String = std::iter::repeat_n(mask, hidden).collect();
        masked.push_str(&number[hidden..]);
        masked
    }

    pub fn bank_routing(&self) -> Option<&str> {
        self.bank_routing.as_deref()
    }

    pub fn set_bank_routing(&mut self, value: impl Into<String>) -> &mut Self {
        self.bank_routing = Some(value.into());
        self
    }

    pub fn routing(&self) -> Option<&str> {
        self.bank_routing()
    }

    pub fn set_routing(&mut self, value: impl Into<String>) -> &mut Self {
        self.set_bank_routing(value)
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.first_name = Some(value.into());
        self
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.last_name = Some(value.into());
        self
    }

    /// Full name as sent to the gateway: first and last name joined by a space, trimmed.
    pub fn name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn set_email(&mut self, value: impl Into<String>) -> &mut Self {
        self.email = Some(value.into());
        self
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn set_phone(&mut self, value: impl Into<String>) -> &mut Self {
        self.phone = Some(value.into());
        self
    }

    pub fn address1(&self) -> Option<&str> {
        self.address1.as_deref()
    }

    pub fn set_address1(&mut self, value: impl Into<String>) -> &mut Self {
        self.address1 = Some(value.into());
        self
    }

    pub fn address2(&self) -> Option<&str> {
        self.address2.as_deref()
    }

    pub fn set_address2(&mut self, value: impl Into<String>) -> &mut Self {
        self.address2 = Some(value.into());
        self
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn set_city(&mut self, value: impl Into<String>) -> &mut Self {
        self.city = Some(value.into());
        self
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn set_state(&mut self, value: impl Into<String>) -> &mut Self {
        self.state = Some(value.into());
        self
    }

    pub fn postcode(&self) -> Option<&str> {
        self.postcode.as_deref()
    }

    pub fn set_postcode(&mut self, value: impl Into<String>) -> &mut Self {
        self.postcode = Some(value.into());
        self
    }

    pub fn zip(&self) -> Option<&str> {
        self.postcode()
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn set_country(&mut self, value: impl Into<String>) -> &mut Self {
        self.country = Some(value.into());
        self
    }
}

/// Prints the masked account number so logs never carry the raw value.
impl fmt::Debug for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankAccount")
            .field("number", &self.number.as_ref().map(|_| self.number_masked('*')))
            .field("bank_routing", &self.bank_routing)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("address1", &self.address1)
            .field("address2", &self.address2)
            .field("city", &self.city)
            .field("state", &self.state)
            .field("postcode", &self.postcode)
            .field("country", &self.country)
            .finish()
    }
}
