//! Expense repository implementation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const EXPENSE_COLUMNS: &str = "id, owner_id, amount, currency, description, created_at, updated_at";

/// Database row for a personal expense
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExpenseRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page request, already reduced to SQL fragments
///
/// `sort_column` and `direction` are interpolated into the statement and
/// must come from a fixed whitelist (`ExpenseSort::column`,
/// `SortOrder::keyword`).
#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub sort_column: &'static str,
    pub direction: &'static str,
    pub limit: i64,
    pub offset: i64,
}

/// Repository for the personal expense ledger
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an expense
    pub async fn insert(&self, expense: &ExpenseRow) -> Result<ExpenseRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO expenses ({EXPENSE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {EXPENSE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(expense.id)
            .bind(expense.owner_id)
            .bind(expense.amount)
            .bind(&expense.currency)
            .bind(&expense.description)
            .bind(expense.created_at)
            .bind(expense.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Retrieves an expense by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<ExpenseRow, DatabaseError> {
        let sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1");
        sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Expense", id))
    }

    /// Overwrites amount, description and `updated_at`
    pub async fn update(&self, expense: &ExpenseRow) -> Result<ExpenseRow, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE expenses
            SET amount = $2, currency = $3, description = $4, updated_at = $5
            WHERE id = $1
            RETURNING {EXPENSE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(expense.id)
            .bind(expense.amount)
            .bind(&expense.currency)
            .bind(&expense.description)
            .bind(expense.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Expense", expense.id))
    }

    /// Deletes an expense
    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Expense", id));
        }
        Ok(())
    }

    /// One page of the owner's expenses
    pub async fn list_page(&self, owner_id: Uuid, page: PageSpec) -> Result<Vec<ExpenseRow>, DatabaseError> {
        let sql = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE owner_id = $1 ORDER BY {} {}, id {} LIMIT $2 OFFSET $3",
            page.sort_column, page.direction, page.direction
        );
        let rows = sqlx::query_as::<_, ExpenseRow>(&sql)
            .bind(owner_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Number of expenses the owner has
    pub async fn count_for_owner(&self, owner_id: Uuid) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM expenses WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
