//! Repository implementations for domain entities
//!
//! Repositories encapsulate SQL and speak in row types; the adapters in
//! `crate::adapters` map rows to domain aggregates.
//!
//! Queries are built at runtime with `sqlx::query_as` over `FromRow`
//! structs, so the crate compiles without a live database. Multi-table
//! writes run inside one transaction.

pub mod users;
pub mod groups;
pub mod bills;
pub mod expenses;

pub use users::UserRepository;
pub use groups::GroupRepository;
pub use bills::BillRepository;
pub use expenses::ExpenseRepository;
