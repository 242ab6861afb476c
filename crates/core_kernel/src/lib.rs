//! Core Kernel - Foundational types and utilities for the bill-splitting service
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic and minor-unit allocation
//! - Strongly-typed identifiers for users, groups, bills, splits, and expenses
//! - Port infrastructure shared by every domain adapter

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{UserId, GroupId, BillId, BillSplitId, ExpenseId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
