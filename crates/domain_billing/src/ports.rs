//! Billing Domain Ports
//!
//! `BillingPort` stores bills with their splits; `ExpensePort` stores the
//! personal ledger. Multi-row writes are single port calls so that each
//! adapter can run them in one transaction:
//!
//! - `insert_bill` writes the bill and every split, or nothing
//! - `record_payment` locks the bill, applies `Bill::record_payment`, and
//!   persists the split and the settlement together
//!
//! A rejected payment is reported as `PortError::NotFound` with entity
//! `BillSplit` (no split for the user) or `PortError::Conflict` (already
//! paid); see `From<PaymentRejection> for PortError`.

use async_trait::async_trait;

use core_kernel::{BillId, DomainPort, ExpenseId, GroupId, HealthCheckable, PortError, UserId};

use crate::bill::{Bill, PaymentReceipt};
use crate::expense::{Expense, ExpenseQuery};

/// The port trait for bill storage
#[async_trait]
pub trait BillingPort: DomainPort + HealthCheckable {
    /// Persists a bill and all of its splits atomically
    async fn insert_bill(&self, bill: &Bill) -> Result<Bill, PortError>;

    /// Retrieves a bill with its splits
    async fn get_bill(&self, id: BillId) -> Result<Bill, PortError>;

    /// Bills the user owns or holds a split on, newest first
    async fn list_bills_for_user(&self, user_id: UserId) -> Result<Vec<Bill>, PortError>;

    /// Bills of a group, newest first
    async fn list_bills_for_group(&self, group_id: GroupId) -> Result<Vec<Bill>, PortError>;

    /// Marks the user's split paid and settles the bill when nothing is left unpaid
    async fn record_payment(&self, bill_id: BillId, user_id: UserId) -> Result<PaymentReceipt, PortError>;

    /// Deletes a bill and its splits
    async fn delete_bill(&self, id: BillId) -> Result<(), PortError>;
}

/// The port trait for personal expense storage
#[async_trait]
pub trait ExpensePort: DomainPort + HealthCheckable {
    /// Persists a new expense
    async fn insert_expense(&self, expense: &Expense) -> Result<Expense, PortError>;

    /// Retrieves an expense
    async fn get_expense(&self, id: ExpenseId) -> Result<Expense, PortError>;

    /// Overwrites amount, description and `updated_at`
    async fn update_expense(&self, expense: &Expense) -> Result<Expense, PortError>;

    /// Deletes an expense
    async fn delete_expense(&self, id: ExpenseId) -> Result<(), PortError>;

    /// One page of the owner's expenses plus the owner's total count
    async fn list_expenses(
        &self,
        owner_id: UserId,
        query: &ExpenseQuery,
    ) -> Result<(Vec<Expense>, u64), PortError>;
}

/// Mock implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::HealthCheckResult;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of BillingPort
    ///
    /// The write lock plays the role of the row lock taken by the
    /// database adapter.
    #[derive(Debug, Default, Clone)]
    pub struct MockBillingPort {
        bills: Arc<RwLock<HashMap<BillId, Bill>>>,
    }

    impl MockBillingPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        fn newest_first(mut bills: Vec<Bill>) -> Vec<Bill> {
            bills.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
            bills
        }
    }

    impl DomainPort for MockBillingPort {}

    #[async_trait]
    impl HealthCheckable for MockBillingPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-billing-port")
        }
    }

    #[async_trait]
    impl BillingPort for MockBillingPort {
        async fn insert_bill(&self, bill: &Bill) -> Result<Bill, PortError> {
            let mut bills = self.bills.write().await;
            if bills.contains_key(&bill.id) {
                return Err(PortError::conflict(format!("bill {} already exists", bill.id)));
            }
            bills.insert(bill.id, bill.clone());
            Ok(bill.clone())
        }

        async fn get_bill(&self, id: BillId) -> Result<Bill, PortError> {
            self.bills
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Bill", id))
        }

        async fn list_bills_for_user(&self, user_id: UserId) -> Result<Vec<Bill>, PortError> {
            let bills = self.bills.read().await;
            Ok(Self::newest_first(
                bills.values().filter(|b| b.involves(user_id)).cloned().collect(),
            ))
        }

        async fn list_bills_for_group(&self, group_id: GroupId) -> Result<Vec<Bill>, PortError> {
            let bills = self.bills.read().await;
            Ok(Self::newest_first(
                bills
                    .values()
                    .filter(|b| b.group_id == Some(group_id))
                    .cloned()
                    .collect(),
            ))
        }

        async fn record_payment(&self, bill_id: BillId, user_id: UserId) -> Result<PaymentReceipt, PortError> {
            let mut bills = self.bills.write().await;
            let bill = bills
                .get_mut(&bill_id)
                .ok_or_else(|| PortError::not_found("Bill", bill_id))?;
            Ok(bill.record_payment(user_id)?)
        }

        async fn delete_bill(&self, id: BillId) -> Result<(), PortError> {
            self.bills
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Bill", id))
        }
    }

    /// In-memory mock implementation of ExpensePort
    #[derive(Debug, Default, Clone)]
    pub struct MockExpensePort {
        expenses: Arc<RwLock<HashMap<ExpenseId, Expense>>>,
    }

    impl MockExpensePort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockExpensePort {}

    #[async_trait]
    impl HealthCheckable for MockExpensePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-expense-port")
        }
    }

    #[async_trait]
    impl ExpensePort for MockExpensePort {
        async fn insert_expense(&self, expense: &Expense) -> Result<Expense, PortError> {
            self.expenses.write().await.insert(expense.id, expense.clone());
            Ok(expense.clone())
        }

        async fn get_expense(&self, id: ExpenseId) -> Result<Expense, PortError> {
            self.expenses
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Expense", id))
        }

        async fn update_expense(&self, expense: &Expense) -> Result<Expense, PortError> {
            let mut expenses = self.expenses.write().await;
            let stored = expenses
                .get_mut(&expense.id)
                .ok_or_else(|| PortError::not_found("Expense", expense.id))?;
            stored.amount = expense.amount;
            stored.description = expense.description.clone();
            stored.updated_at = expense.updated_at;
            Ok(stored.clone())
        }

        async fn delete_expense(&self, id: ExpenseId) -> Result<(), PortError> {
            self.expenses
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Expense", id))
        }

        async fn list_expenses(
            &self,
            owner_id: UserId,
            query: &ExpenseQuery,
        ) -> Result<(Vec<Expense>, u64), PortError> {
            let expenses = self.expenses.read().await;
            let mut owned: Vec<Expense> = expenses
                .values()
                .filter(|e| e.owner_id == owner_id)
                .cloned()
                .collect();
            let total = owned.len() as u64;

            query.sort(&mut owned);
            let page = owned
                .into_iter()
                .skip(query.offset() as usize)
                .take(query.limit as usize)
                .collect();
            Ok((page, total))
        }
    }
}
