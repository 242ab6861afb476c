//! Billing domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};
use domain_group::GroupError;

use crate::bill::PaymentRejection;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Bill not found
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    /// Group not found
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Expense not found
    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    /// The user has no split on the bill
    #[error("No bill split found for user {user_id} on bill {bill_id}")]
    SplitNotFound { bill_id: String, user_id: String },

    /// The user's split is already paid
    #[error("Bill split for user {user_id} on bill {bill_id} is already paid")]
    AlreadyPaid { bill_id: String, user_id: String },

    /// The principal may not perform this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The group has nobody to split the bill between
    #[error("Group {0} has no members to split the bill between")]
    EmptyMemberSet(String),

    /// Input failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Calculation error
    #[error("Calculation error: {0}")]
    Money(#[from] MoneyError),

    /// Underlying port failure
    #[error(transparent)]
    Port(#[from] PortError),
}

impl From<PaymentRejection> for BillingError {
    fn from(rejection: PaymentRejection) -> Self {
        match rejection {
            PaymentRejection::SplitNotFound { bill_id, user_id } => BillingError::SplitNotFound {
                bill_id: bill_id.to_string(),
                user_id: user_id.to_string(),
            },
            PaymentRejection::AlreadyPaid { bill_id, user_id } => BillingError::AlreadyPaid {
                bill_id: bill_id.to_string(),
                user_id: user_id.to_string(),
            },
        }
    }
}

/// Adapters report payment rejections through the port error type
impl From<PaymentRejection> for PortError {
    fn from(rejection: PaymentRejection) -> Self {
        match rejection {
            PaymentRejection::SplitNotFound { bill_id, user_id } => {
                PortError::not_found(SPLIT_ENTITY, format!("{}/{}", bill_id, user_id))
            }
            PaymentRejection::AlreadyPaid { .. } => PortError::conflict(rejection.to_string()),
        }
    }
}

/// Entity name adapters use for a missing split
pub const SPLIT_ENTITY: &str = "BillSplit";

impl From<GroupError> for BillingError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::GroupNotFound(id) => BillingError::GroupNotFound(id),
            GroupError::Forbidden(msg) => BillingError::Forbidden(msg),
            GroupError::Validation(msg) => BillingError::Validation(msg),
            GroupError::Port(port) => BillingError::Port(port),
            other => BillingError::Port(PortError::internal(other.to_string())),
        }
    }
}

impl BillingError {
    /// Maps a port NotFound into `BillNotFound`, leaving other errors intact
    pub fn bill_lookup(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => BillingError::BillNotFound(id),
            other => BillingError::Port(other),
        }
    }

    /// Maps a port NotFound into `ExpenseNotFound`, leaving other errors intact
    pub fn expense_lookup(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => BillingError::ExpenseNotFound(id),
            other => BillingError::Port(other),
        }
    }

    /// Maps the port error of a payment back into the billing taxonomy
    pub fn from_payment(err: PortError, bill_id: impl ToString, user_id: impl ToString) -> Self {
        match err {
            PortError::NotFound { entity_type, .. } if entity_type == SPLIT_ENTITY => {
                BillingError::SplitNotFound {
                    bill_id: bill_id.to_string(),
                    user_id: user_id.to_string(),
                }
            }
            PortError::NotFound { id, .. } => BillingError::BillNotFound(id),
            PortError::Conflict { .. } => BillingError::AlreadyPaid {
                bill_id: bill_id.to_string(),
                user_id: user_id.to_string(),
            },
            other => BillingError::Port(other),
        }
    }
}
