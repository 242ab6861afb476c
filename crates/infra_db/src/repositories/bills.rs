//! Bill repository implementation
//!
//! Bills and their splits are written together. Payment recording needs
//! the domain rules to run between the lock and the update, so the
//! row-level steps are exposed on a borrowed connection and the caller
//! owns the transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

const BILL_COLUMNS: &str =
    "id, owner_id, group_id, amount, currency, description, is_paid, created_at, updated_at";

const SPLIT_COLUMNS: &str = "id, bill_id, user_id, position, amount, currency, is_paid, paid_at";

/// Database row for a bill
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BillRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub group_id: Option<Uuid>,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for one member's share of a bill
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SplitRow {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub user_id: Uuid,
    pub position: i32,
    pub amount: Decimal,
    pub currency: String,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

/// A bill with its splits in allocation order
#[derive(Debug, Clone)]
pub struct BillWithSplits {
    pub bill: BillRow,
    pub splits: Vec<SplitRow>,
}

/// Repository for bills and splits
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: PgPool,
}

impl BillRepository {
    /// Creates a new BillRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a bill and all of its splits, or nothing
    pub async fn insert(&self, bill: &BillRow, splits: &[SplitRow]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO bills ({BILL_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        );
        sqlx::query(&sql)
            .bind(bill.id)
            .bind(bill.owner_id)
            .bind(bill.group_id)
            .bind(bill.amount)
            .bind(&bill.currency)
            .bind(&bill.description)
            .bind(bill.is_paid)
            .bind(bill.created_at)
            .bind(bill.updated_at)
            .execute(&mut *tx)
            .await?;

        let sql = format!("INSERT INTO bill_splits ({SPLIT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)");
        for split in splits {
            sqlx::query(&sql)
                .bind(split.id)
                .bind(split.bill_id)
                .bind(split.user_id)
                .bind(split.position)
                .bind(split.amount)
                .bind(&split.currency)
                .bind(split.is_paid)
                .bind(split.paid_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Retrieves a bill with its splits
    pub async fn get_with_splits(&self, id: Uuid) -> Result<BillWithSplits, DatabaseError> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = $1");
        let bill = sqlx::query_as::<_, BillRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Bill", id))?;

        let mut conn = self.pool.acquire().await?;
        let splits = splits_for(&mut conn, id).await?;
        Ok(BillWithSplits { bill, splits })
    }

    /// Bills the user owns or holds a split on, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BillWithSplits>, DatabaseError> {
        let sql = format!(
            r#"SELECT {BILL_COLUMNS} FROM bills b
            WHERE b.owner_id = $1
               OR EXISTS (SELECT 1 FROM bill_splits s WHERE s.bill_id = b.id AND s.user_id = $1)
            ORDER BY b.created_at DESC, b.id DESC"#
        );
        let bills = sqlx::query_as::<_, BillRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_splits(bills).await
    }

    /// Bills of one group, newest first
    pub async fn list_for_group(&self, group_id: Uuid) -> Result<Vec<BillWithSplits>, DatabaseError> {
        let sql = format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE group_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let bills = sqlx::query_as::<_, BillRow>(&sql)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_splits(bills).await
    }

    /// Deletes a bill; splits cascade
    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM bills WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Bill", id));
        }
        Ok(())
    }

    async fn attach_splits(&self, bills: Vec<BillRow>) -> Result<Vec<BillWithSplits>, DatabaseError> {
        let ids: Vec<Uuid> = bills.iter().map(|b| b.id).collect();
        let sql = format!(
            "SELECT {SPLIT_COLUMNS} FROM bill_splits WHERE bill_id = ANY($1) ORDER BY bill_id, position"
        );
        let mut splits = sqlx::query_as::<_, SplitRow>(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(bills
            .into_iter()
            .map(|bill| {
                let (mine, rest): (Vec<_>, Vec<_>) = splits.drain(..).partition(|s| s.bill_id == bill.id);
                splits = rest;
                BillWithSplits { bill, splits: mine }
            })
            .collect())
    }
}

/// Loads a bill and takes a row lock on it until the transaction ends
pub async fn lock_bill(conn: &mut PgConnection, id: Uuid) -> Result<BillWithSplits, DatabaseError> {
    let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = $1 FOR UPDATE");
    let bill = sqlx::query_as::<_, BillRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Bill", id))?;

    let splits = splits_for(conn, id).await?;
    Ok(BillWithSplits { bill, splits })
}

/// Marks one split paid
pub async fn mark_split_paid(
    conn: &mut PgConnection,
    split_id: Uuid,
    paid_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE bill_splits SET is_paid = TRUE, paid_at = $2 WHERE id = $1 AND is_paid = FALSE")
        .bind(split_id)
        .bind(paid_at)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Writes the bill's paid flag and `updated_at`
pub async fn update_bill_status(
    conn: &mut PgConnection,
    id: Uuid,
    is_paid: bool,
    updated_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE bills SET is_paid = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(is_paid)
        .bind(updated_at)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn splits_for(conn: &mut PgConnection, bill_id: Uuid) -> Result<Vec<SplitRow>, DatabaseError> {
    let sql = format!("SELECT {SPLIT_COLUMNS} FROM bill_splits WHERE bill_id = $1 ORDER BY position");
    let splits = sqlx::query_as::<_, SplitRow>(&sql)
        .bind(bill_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(splits)
}
