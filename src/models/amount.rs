//! Money amounts sent to the gateway.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GatewayError;

/// A USD amount stored as cents (not dollars).
///
/// # Storage
///
/// Amounts are held as `i64` cents to avoid floating-point precision issues
/// and rendered back as a two-decimal string:
/// - "10" and "10.00" are both stored as 1000 cents and sent as "10.00"
/// - "0.5" is stored as 50 cents and sent as "0.50"
///
/// Negative amounts can be represented; request builders reject them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount {
    cents: i64,
}

impl Amount {
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }
}

fn invalid_amount(value: &str) -> GatewayError {
    GatewayError::InvalidRequest(format!("Invalid amount: {value:?}"))
}

impl FromStr for Amount {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid_amount(s));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid_amount(s));
        }
        if fraction.len() > 2 {
            return Err(GatewayError::InvalidRequest(
                "Amount precision is too high for currency.".to_string(),
            ));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid_amount(s))?
        };
        let fraction: i64 = format!("{fraction:0<2}").parse().map_err(|_| invalid_amount(s))?;

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(|| invalid_amount(s))?;

        Ok(Self {
            cents: if negative { -cents } else { cents },
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts decimal strings ("10.00") and JSON numbers (10, 10.5).
impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal amount as a string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                v.to_string().parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                v.to_string().parse().map_err(E::custom)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
                let rounded = (v * 100.0).round();
                if !rounded.is_finite() || (v * 100.0 - rounded).abs() > 1e-6 {
                    return Err(E::custom("Amount precision is too high for currency."));
                }
                // `as` saturates, so out-of-range values must be caught first.
                if !(i64::MIN as f64..i64::MAX as f64).contains(&rounded) {
                    return Err(E::custom(format!("Invalid amount: {v}")));
                }
                Ok(Amount::from_cents(rounded as i64))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}
