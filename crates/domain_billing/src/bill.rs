//! Bills and their per-member splits
//!
//! A group bill is divided equally between the group's billable members in
//! integer minor units. When the total does not divide evenly the first
//! `remainder` members (admin first, then by join order) carry one extra
//! minor unit, so the splits always reconcile exactly with the bill.
//!
//! Splits move from unpaid to paid only. The bill is settled exactly once,
//! when its last unpaid split is paid.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{BillId, BillSplitId, GroupId, Money, UserId};
use domain_group::Group;

use crate::error::BillingError;

/// Maximum description length for bills and expenses
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Largest amount a bill or expense may carry; monetary columns are `NUMERIC(14, 2)`
pub const MAX_AMOUNT: Decimal = dec!(999999999999.99);

/// One member's share of a group bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSplit {
    pub id: BillSplitId,
    pub bill_id: BillId,
    pub user_id: UserId,
    pub amount: Money,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

impl BillSplit {
    fn new(bill_id: BillId, user_id: UserId, amount: Money) -> Self {
        Self {
            id: BillSplitId::new(),
            bill_id,
            user_id,
            amount,
            is_paid: false,
            paid_at: None,
        }
    }
}

/// A monetary obligation, optionally divided between a group's members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: BillId,
    pub owner_id: UserId,
    /// `None` for a personal bill
    pub group_id: Option<GroupId>,
    pub amount: Money,
    pub description: String,
    pub is_paid: bool,
    pub splits: Vec<BillSplit>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The outcome of dividing a bill between a group
#[derive(Debug, Clone)]
pub struct SplitPlan {
    pub bill: Bill,
    /// The base share every member owes; the first `remainder_minor`
    /// members owe one minor unit more
    pub split_amount: Money,
    pub member_count: usize,
    pub remainder_minor: i64,
}

/// Acknowledgement of a recorded payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub bill_id: BillId,
    pub user_id: UserId,
    /// True once every split of the bill is paid
    pub bill_settled: bool,
    pub remaining_unpaid: usize,
}

/// Why a payment could not be recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaymentRejection {
    #[error("no split for user {user_id} on bill {bill_id}")]
    SplitNotFound { bill_id: BillId, user_id: UserId },

    #[error("split for user {user_id} on bill {bill_id} is already paid")]
    AlreadyPaid { bill_id: BillId, user_id: UserId },
}

impl Bill {
    /// Divides `amount` equally between the group's billable members
    ///
    /// # Errors
    ///
    /// - `Validation` for a non-positive amount, an amount with sub-cent
    ///   digits, or a blank/oversized description
    /// - `Forbidden` if `owner` is neither the admin nor a member
    /// - `EmptyMemberSet` if the group has no one to bill
    pub fn split_equally(
        owner: UserId,
        group: &Group,
        amount: Money,
        description: &str,
    ) -> Result<SplitPlan, BillingError> {
        let description = validate_amount_and_description(&amount, description)?;

        if !group.is_participant(owner) {
            return Err(BillingError::Forbidden(format!(
                "user {} is not a member of group {}",
                owner, group.id
            )));
        }

        let members = group.billable_members();
        if members.is_empty() {
            return Err(BillingError::EmptyMemberSet(group.id.to_string()));
        }

        let member_count = members.len();
        let parts = amount.allocate(member_count as u32)?;
        let total_minor = amount.to_minor()?;
        let remainder_minor = total_minor % member_count as i64;
        let split_amount = Money::from_minor(total_minor / member_count as i64, amount.currency());

        let mut bill = Self::unsplit(owner, Some(group.id), amount, description);
        bill.splits = members
            .into_iter()
            .zip(parts)
            .map(|(user_id, share)| BillSplit::new(bill.id, user_id, share))
            .collect();

        Ok(SplitPlan {
            bill,
            split_amount,
            member_count,
            remainder_minor,
        })
    }

    /// Creates a personal bill with no splits
    pub fn personal(owner: UserId, amount: Money, description: &str) -> Result<Self, BillingError> {
        let description = validate_amount_and_description(&amount, description)?;
        Ok(Self::unsplit(owner, None, amount, description))
    }

    fn unsplit(owner: UserId, group_id: Option<GroupId>, amount: Money, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: BillId::new(),
            owner_id: owner,
            group_id,
            amount,
            description,
            is_paid: false,
            splits: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true for a bill without a group
    pub fn is_personal(&self) -> bool {
        self.group_id.is_none()
    }

    /// Returns the user's split, if any
    pub fn split_for(&self, user_id: UserId) -> Option<&BillSplit> {
        self.splits.iter().find(|s| s.user_id == user_id)
    }

    /// Number of splits still unpaid
    pub fn unpaid_count(&self) -> usize {
        self.splits.iter().filter(|s| !s.is_paid).count()
    }

    /// Returns true if the user owns the bill or holds a split on it
    pub fn involves(&self, user_id: UserId) -> bool {
        self.owner_id == user_id || self.split_for(user_id).is_some()
    }

    /// Records that `user_id` has paid their share
    ///
    /// For a personal bill only the owner can pay, and doing so settles
    /// the bill. For a group bill the user's split is marked paid and the
    /// bill is settled when no unpaid split remains.
    pub fn record_payment(&mut self, user_id: UserId) -> Result<PaymentReceipt, PaymentRejection> {
        let bill_id = self.id;
        let now = Utc::now();

        if self.is_personal() {
            if user_id != self.owner_id {
                return Err(PaymentRejection::SplitNotFound { bill_id, user_id });
            }
            if self.is_paid {
                return Err(PaymentRejection::AlreadyPaid { bill_id, user_id });
            }
        } else {
            let split = self
                .splits
                .iter_mut()
                .find(|s| s.user_id == user_id)
                .ok_or(PaymentRejection::SplitNotFound { bill_id, user_id })?;
            if split.is_paid {
                return Err(PaymentRejection::AlreadyPaid { bill_id, user_id });
            }
            split.is_paid = true;
            split.paid_at = Some(now);
        }

        let remaining_unpaid = self.unpaid_count();
        if remaining_unpaid == 0 && !self.is_paid {
            self.is_paid = true;
        }
        self.updated_at = now;

        Ok(PaymentReceipt {
            bill_id,
            user_id,
            bill_settled: self.is_paid,
            remaining_unpaid,
        })
    }

    /// Sum of all split amounts
    pub fn split_total(&self) -> Result<Money, BillingError> {
        Ok(Money::sum(
            self.amount.currency(),
            self.splits.iter().map(|s| &s.amount),
        )?)
    }
}

/// Validates a monetary amount and a description, returning the trimmed description
pub(crate) fn validate_amount_and_description(
    amount: &Money,
    description: &str,
) -> Result<String, BillingError> {
    validate_amount(amount)?;
    validate_description(description)
}

pub(crate) fn validate_amount(amount: &Money) -> Result<(), BillingError> {
    if !amount.is_positive() {
        return Err(BillingError::Validation("Amount must be a positive number".to_string()));
    }
    if amount.has_sub_minor_precision() {
        return Err(BillingError::Validation(format!(
            "Amount must have at most {} decimal places",
            amount.currency().decimal_places()
        )));
    }
    if amount.amount() > MAX_AMOUNT {
        return Err(BillingError::Validation(format!(
            "Amount must not exceed {}",
            MAX_AMOUNT
        )));
    }
    Ok(())
}

pub(crate) fn validate_description(description: &str) -> Result<String, BillingError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(BillingError::Validation("Description is required".to_string()));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(BillingError::Validation(format!(
            "Description must be at most {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(description.to_string())
}
