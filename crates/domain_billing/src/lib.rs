//! Billing Domain - Bill Splitting and Settlement
//!
//! This crate divides group bills between members, records per-member
//! payments, settles bills, and keeps a personal expense ledger.
//!
//! # Bill Lifecycle
//!
//! 1. A participant of a group creates a bill for a total amount
//! 2. The total is split equally in minor units between the admin and every
//!    member; any remainder cents go to the first members in order
//! 3. Each member confirms their own payment (splits only move to paid)
//! 4. When the last unpaid split is paid the bill is settled, exactly once
//!
//! A personal bill has no group and no splits; its owner settles it directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::Bill;
//! use core_kernel::{Money, Currency};
//! use rust_decimal_macros::dec;
//!
//! let plan = Bill::split_equally(alice, &group, Money::new(dec!(100), Currency::USD), "Rent")?;
//!
//! // 100.00 between three participants: 33.34, 33.33, 33.33
//! assert_eq!(plan.remainder_minor, 1);
//! ```

pub mod bill;
pub mod expense;
pub mod ports;
pub mod service;
pub mod error;

pub use bill::{Bill, BillSplit, SplitPlan, PaymentReceipt, PaymentRejection, MAX_AMOUNT, MAX_DESCRIPTION_LEN};
pub use expense::{Expense, ExpenseUpdate, ExpenseQuery, ExpenseSort, SortOrder, Pagination, ExpensePage};
pub use ports::{BillingPort, ExpensePort};
pub use service::{BillingService, ExpenseService, PaymentConfirmation, GroupOverview};
pub use error::BillingError;
