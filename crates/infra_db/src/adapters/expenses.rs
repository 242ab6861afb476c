//! PostgreSQL Expense Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, ExpenseId, HealthCheckResult, HealthCheckable, PortError, UserId};
use domain_billing::{Expense, ExpensePort, ExpenseQuery};

use crate::error::DatabaseError;
use crate::repositories::expenses::{ExpenseRepository, ExpenseRow, PageSpec};

use super::{check_pool, money_from_columns};

/// PostgreSQL-backed implementation of the ExpensePort trait
#[derive(Debug, Clone)]
pub struct PostgresExpenseAdapter {
    repository: ExpenseRepository,
    pool: PgPool,
}

impl PostgresExpenseAdapter {
    /// Creates a new PostgreSQL expense adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ExpenseRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresExpenseAdapter {}

#[async_trait]
impl HealthCheckable for PostgresExpenseAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-expense-adapter").await
    }
}

#[async_trait]
impl ExpensePort for PostgresExpenseAdapter {
    #[instrument(skip(self, expense), fields(expense_id = %expense.id))]
    async fn insert_expense(&self, expense: &Expense) -> Result<Expense, PortError> {
        let row = self.repository.insert(&expense_to_row(expense)).await?;
        Ok(row_to_expense(row)?)
    }

    #[instrument(skip(self), fields(expense_id = %id))]
    async fn get_expense(&self, id: ExpenseId) -> Result<Expense, PortError> {
        let row = self.repository.get_by_id(id.into()).await?;
        Ok(row_to_expense(row)?)
    }

    #[instrument(skip(self, expense), fields(expense_id = %expense.id))]
    async fn update_expense(&self, expense: &Expense) -> Result<Expense, PortError> {
        let row = self.repository.update(&expense_to_row(expense)).await?;
        Ok(row_to_expense(row)?)
    }

    #[instrument(skip(self), fields(expense_id = %id))]
    async fn delete_expense(&self, id: ExpenseId) -> Result<(), PortError> {
        Ok(self.repository.delete(id.into()).await?)
    }

    #[instrument(skip(self, query), fields(owner_id = %owner_id, page = query.page, limit = query.limit))]
    async fn list_expenses(
        &self,
        owner_id: UserId,
        query: &ExpenseQuery,
    ) -> Result<(Vec<Expense>, u64), PortError> {
        let rows = self
            .repository
            .list_page(owner_id.into(), page_spec(query))
            .await?;
        let total = self.repository.count_for_owner(owner_id.into()).await?;

        let expenses = rows
            .into_iter()
            .map(row_to_expense)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(returned = expenses.len(), total, "Listed expenses");
        Ok((expenses, total.max(0) as u64))
    }
}

fn page_spec(query: &ExpenseQuery) -> PageSpec {
    PageSpec {
        sort_column: query.sort_by.column(),
        direction: query.order.keyword(),
        limit: i64::from(query.limit),
        offset: i64::try_from(query.offset()).unwrap_or(i64::MAX),
    }
}

fn expense_to_row(expense: &Expense) -> ExpenseRow {
    ExpenseRow {
        id: expense.id.into(),
        owner_id: expense.owner_id.into(),
        amount: expense.amount.amount(),
        currency: expense.amount.currency().code().to_string(),
        description: expense.description.clone(),
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

fn row_to_expense(row: ExpenseRow) -> Result<Expense, DatabaseError> {
    Ok(Expense {
        id: ExpenseId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        amount: money_from_columns(row.amount, &row.currency)?,
        description: row.description,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, Money};
    use rust_decimal_macros::dec;

    #[test]
    fn test_page_spec_uses_whitelisted_fragments() {
        let query = ExpenseQuery::from_params(Some("2"), Some("5"), Some("amount"), Some("asc"));
        let spec = page_spec(&query);
        assert_eq!(spec.sort_column, "amount");
        assert_eq!(spec.direction, "ASC");
        assert_eq!(spec.limit, 5);
        assert_eq!(spec.offset, 5);

        let spec = page_spec(&ExpenseQuery::from_params(None, None, Some("id; DROP TABLE"), None));
        assert_eq!(spec.sort_column, "created_at");
        assert_eq!(spec.direction, "DESC");
    }

    #[test]
    fn test_expense_row_roundtrip() {
        let expense = Expense::new(UserId::new(), Money::new(dec!(4.20), Currency::USD), "Coffee").unwrap();
        let restored = row_to_expense(expense_to_row(&expense)).unwrap();
        assert_eq!(restored, expense);
    }
}
