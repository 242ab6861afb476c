//! Domain Adapters
//!
//! This module provides adapter implementations for domain ports,
//! connecting domain interfaces to the PostgreSQL database layer.
//!
//! # Architecture
//!
//! Each domain port has a corresponding adapter that:
//! - Implements the port trait
//! - Translates between domain models and database row types
//! - Uses the repository layer for database operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresBillingAdapter;
//! use domain_billing::BillingPort;
//! use std::sync::Arc;
//!
//! let bills: Arc<dyn BillingPort> = Arc::new(PostgresBillingAdapter::new(pool));
//! let bill = bills.get_bill(bill_id).await?;
//! ```

pub mod users;
pub mod groups;
pub mod billing;
pub mod expenses;

pub use users::PostgresUserAdapter;
pub use groups::PostgresGroupAdapter;
pub use billing::PostgresBillingAdapter;
pub use expenses::PostgresExpenseAdapter;

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, Currency, HealthCheckResult, Money};

use crate::error::DatabaseError;

/// Runs `SELECT 1` against the pool and reports the latency
pub(crate) async fn check_pool(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}

/// Rebuilds a money value from its amount and currency columns
pub(crate) fn money_from_columns(amount: Decimal, currency: &str) -> Result<Money, DatabaseError> {
    let currency = Currency::from_str(currency)
        .map_err(|e| DatabaseError::CorruptRow(e.to_string()))?;
    Ok(Money::new(amount, currency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_from_columns() {
        let money = money_from_columns(dec!(12.50), "EUR").unwrap();
        assert_eq!(money.amount(), dec!(12.50));
        assert_eq!(money.currency(), Currency::EUR);
    }

    #[test]
    fn test_unknown_currency_is_corrupt_row() {
        let err = money_from_columns(dec!(1), "XXX").unwrap_err();
        assert!(matches!(err, DatabaseError::CorruptRow(_)));
    }
}
