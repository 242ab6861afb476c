//! PostgreSQL Billing Adapter
//!
//! Implements `BillingPort` over `BillRepository`.
//!
//! # Payment Recording
//!
//! `record_payment` runs in one transaction:
//!
//! 1. `SELECT ... FOR UPDATE` on the bill row, then load its splits
//! 2. apply `Bill::record_payment` to the loaded aggregate
//! 3. write the paid split and, when nothing is left unpaid, the bill's
//!    paid flag
//!
//! Concurrent payments on one bill serialize on the row lock, so exactly
//! one of them observes the last unpaid split and settles the bill.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use core_kernel::{
    BillId, BillSplitId, DomainPort, GroupId, HealthCheckResult, HealthCheckable, PortError, UserId,
};
use domain_billing::{Bill, BillSplit, BillingPort, PaymentReceipt};

use crate::error::DatabaseError;
use crate::repositories::bills::{self, BillRepository, BillRow, BillWithSplits, SplitRow};

use super::{check_pool, money_from_columns};

/// PostgreSQL-backed implementation of the BillingPort trait
#[derive(Debug, Clone)]
pub struct PostgresBillingAdapter {
    repository: BillRepository,
    pool: PgPool,
}

impl PostgresBillingAdapter {
    /// Creates a new PostgreSQL billing adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BillRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &BillRepository {
        &self.repository
    }
}

impl DomainPort for PostgresBillingAdapter {}

#[async_trait]
impl HealthCheckable for PostgresBillingAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-billing-adapter").await
    }
}

#[async_trait]
impl BillingPort for PostgresBillingAdapter {
    #[instrument(skip(self, bill), fields(bill_id = %bill.id, splits = bill.splits.len()))]
    async fn insert_bill(&self, bill: &Bill) -> Result<Bill, PortError> {
        let (row, splits) = bill_to_rows(bill);
        self.repository.insert(&row, &splits).await?;
        debug!("Bill stored");
        Ok(bill.clone())
    }

    #[instrument(skip(self), fields(bill_id = %id))]
    async fn get_bill(&self, id: BillId) -> Result<Bill, PortError> {
        let record = self.repository.get_with_splits(id.into()).await?;
        Ok(record_to_bill(record)?)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_bills_for_user(&self, user_id: UserId) -> Result<Vec<Bill>, PortError> {
        let records = self.repository.list_for_user(user_id.into()).await?;
        Ok(records_to_bills(records)?)
    }

    #[instrument(skip(self), fields(group_id = %group_id))]
    async fn list_bills_for_group(&self, group_id: GroupId) -> Result<Vec<Bill>, PortError> {
        let records = self.repository.list_for_group(group_id.into()).await?;
        Ok(records_to_bills(records)?)
    }

    #[instrument(skip(self), fields(bill_id = %bill_id, user_id = %user_id))]
    async fn record_payment(&self, bill_id: BillId, user_id: UserId) -> Result<PaymentReceipt, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let record = bills::lock_bill(&mut tx, bill_id.into()).await?;
        let mut bill = record_to_bill(record)?;
        let receipt = bill.record_payment(user_id)?;

        if let Some(split) = bill.split_for(user_id) {
            let paid_at = split.paid_at.unwrap_or(bill.updated_at);
            bills::mark_split_paid(&mut tx, split.id.into(), paid_at).await?;
        }
        bills::update_bill_status(&mut tx, bill_id.into(), bill.is_paid, bill.updated_at).await?;

        tx.commit().await.map_err(DatabaseError::from)?;

        if receipt.bill_settled {
            info!("Bill settled");
        }
        Ok(receipt)
    }

    #[instrument(skip(self), fields(bill_id = %id))]
    async fn delete_bill(&self, id: BillId) -> Result<(), PortError> {
        Ok(self.repository.delete(id.into()).await?)
    }
}

/// Splits a bill into its table rows, recording allocation order in `position`
fn bill_to_rows(bill: &Bill) -> (BillRow, Vec<SplitRow>) {
    let row = BillRow {
        id: bill.id.into(),
        owner_id: bill.owner_id.into(),
        group_id: bill.group_id.map(Into::into),
        amount: bill.amount.amount(),
        currency: bill.amount.currency().code().to_string(),
        description: bill.description.clone(),
        is_paid: bill.is_paid,
        created_at: bill.created_at,
        updated_at: bill.updated_at,
    };
    let splits = bill
        .splits
        .iter()
        .enumerate()
        .map(|(position, split)| SplitRow {
            id: split.id.into(),
            bill_id: split.bill_id.into(),
            user_id: split.user_id.into(),
            position: position as i32,
            amount: split.amount.amount(),
            currency: split.amount.currency().code().to_string(),
            is_paid: split.is_paid,
            paid_at: split.paid_at,
        })
        .collect();
    (row, splits)
}

fn record_to_bill(record: BillWithSplits) -> Result<Bill, DatabaseError> {
    let BillWithSplits { bill, splits } = record;
    let splits = splits
        .into_iter()
        .map(|s| {
            Ok(BillSplit {
                id: BillSplitId::from_uuid(s.id),
                bill_id: BillId::from_uuid(s.bill_id),
                user_id: UserId::from_uuid(s.user_id),
                amount: money_from_columns(s.amount, &s.currency)?,
                is_paid: s.is_paid,
                paid_at: s.paid_at,
            })
        })
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    Ok(Bill {
        id: BillId::from_uuid(bill.id),
        owner_id: UserId::from_uuid(bill.owner_id),
        group_id: bill.group_id.map(GroupId::from_uuid),
        amount: money_from_columns(bill.amount, &bill.currency)?,
        description: bill.description,
        is_paid: bill.is_paid,
        splits,
        created_at: bill.created_at,
        updated_at: bill.updated_at,
    })
}

fn records_to_bills(records: Vec<BillWithSplits>) -> Result<Vec<Bill>, DatabaseError> {
    records.into_iter().map(record_to_bill).collect()
}
