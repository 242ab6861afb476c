//! Bill and payment DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{BillId, Currency, UserId};
use domain_billing::{Bill, BillSplit, PaymentConfirmation, PaymentReceipt, SplitPlan};

/// Body for both group and personal bill creation
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    #[validate(required(message = "amount is required"))]
    pub amount: Option<Decimal>,
    #[validate(required(message = "description is required"))]
    pub description: Option<String>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
}

/// Payment status as sent by clients: `true` or `"paid"`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentStatus {
    Flag(bool),
    Label(String),
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        match self {
            PaymentStatus::Flag(flag) => *flag,
            PaymentStatus::Label(label) => label.eq_ignore_ascii_case("paid"),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[validate(required(message = "billId is required"))]
    pub bill_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[validate(required(message = "status is required"))]
    pub status: Option<PaymentStatus>,
}

impl PaymentRequest {
    pub fn into_confirmation(self) -> PaymentConfirmation {
        PaymentConfirmation {
            bill_id: BillId::from_uuid(self.bill_id.unwrap_or_default()),
            user_id: self.user_id.map(UserId::from_uuid),
            status: self.status.is_some_and(|s| s.is_paid()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub message: String,
    pub bill_settled: bool,
    pub remaining_unpaid: usize,
}

impl From<PaymentReceipt> for PaymentResponse {
    fn from(receipt: PaymentReceipt) -> Self {
        Self {
            message: "Payment updated successfully".to_string(),
            bill_settled: receipt.bill_settled,
            remaining_unpaid: receipt.remaining_unpaid,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResponse {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<&BillSplit> for SplitResponse {
    fn from(split: &BillSplit) -> Self {
        Self {
            id: *split.id.as_uuid(),
            bill_id: *split.bill_id.as_uuid(),
            user_id: *split.user_id.as_uuid(),
            amount: split.amount.amount(),
            is_paid: split.is_paid,
            paid_at: split.paid_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub group_id: Option<Uuid>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
    pub is_paid: bool,
    pub splits: Vec<SplitResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Bill> for BillResponse {
    fn from(bill: &Bill) -> Self {
        Self {
            id: *bill.id.as_uuid(),
            owner_id: *bill.owner_id.as_uuid(),
            group_id: bill.group_id.map(|g| *g.as_uuid()),
            amount: bill.amount.amount(),
            currency: bill.amount.currency(),
            description: bill.description.clone(),
            is_paid: bill.is_paid,
            splits: bill.splits.iter().map(SplitResponse::from).collect(),
            created_at: bill.created_at,
            updated_at: bill.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBillResponse {
    pub bill: BillResponse,
    #[serde(with = "rust_decimal::serde::float")]
    pub split_amount: Decimal,
    pub member_count: usize,
    pub message: String,
}

impl From<&SplitPlan> for GroupBillResponse {
    fn from(plan: &SplitPlan) -> Self {
        Self {
            bill: BillResponse::from(&plan.bill),
            split_amount: plan.split_amount.amount(),
            member_count: plan.member_count,
            message: "Bill created and split successfully".to_string(),
        }
    }
}
