//! Data models.
//!
//! Payment method, money amounts, and the parsed gateway responses.

pub mod amount;
pub mod bank_account;
pub mod response;
