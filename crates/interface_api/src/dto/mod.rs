//! Request and response bodies
//!
//! All bodies use camelCase keys. Required request fields are `Option`s
//! checked by `validator`, so a missing field is a 400 with a field list
//! rather than a deserialization failure. Monetary amounts are written as
//! JSON numbers.

pub mod users;
pub mod groups;
pub mod bills;
pub mod expenses;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use core_kernel::{Currency, Money};

use crate::error::ApiError;

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Builds a money value from a request amount and optional currency code
pub fn money_from_request(amount: Decimal, currency: Option<&str>, default: Currency) -> Result<Money, ApiError> {
    let currency = match currency {
        Some(code) => Currency::from_str(code).map_err(|e| ApiError::validation(e.to_string()))?,
        None => default,
    };
    Ok(Money::new(amount, currency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_from_request() {
        let money = money_from_request(dec!(9.99), None, Currency::EUR).unwrap();
        assert_eq!(money.currency(), Currency::EUR);

        let money = money_from_request(dec!(9.99), Some("gbp"), Currency::EUR).unwrap();
        assert_eq!(money.currency(), Currency::GBP);

        assert!(money_from_request(dec!(1), Some("ZZZ"), Currency::USD).is_err());
    }
}
