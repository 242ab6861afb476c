//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence for the bill-splitting
//! service: a connection pool, embedded migrations, row-level repositories
//! and one adapter per domain port.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories own the SQL and
//! speak in row types; adapters implement the domain ports on top of them
//! and translate `DatabaseError` into `PortError`.
//!
//! | Port | Adapter |
//! |------|---------|
//! | `UserPort` | [`PostgresUserAdapter`] |
//! | `GroupPort` | [`PostgresGroupAdapter`] |
//! | `BillingPort` | [`PostgresBillingAdapter`] |
//! | `ExpensePort` | [`PostgresExpenseAdapter`] |
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, run_migrations, PostgresBillingAdapter};
//!
//! let pool = create_pool_from_url("postgres://localhost/splitledger").await?;
//! run_migrations(&pool).await?;
//! let bills = PostgresBillingAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::{PostgresUserAdapter, PostgresGroupAdapter, PostgresBillingAdapter, PostgresExpenseAdapter};
