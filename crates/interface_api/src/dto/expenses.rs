//! Expense DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::Currency;
use domain_billing::{Expense, ExpensePage, ExpenseQuery, Pagination};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    #[validate(required(message = "amount is required"))]
    pub amount: Option<Decimal>,
    #[validate(required(message = "description is required"))]
    pub description: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub currency: Option<String>,
}

/// Query string of the list endpoint; every field is optional and
/// out-of-range values are clamped
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    #[serde(alias = "order")]
    pub sort_order: Option<String>,
}

impl ExpenseListParams {
    pub fn to_query(&self) -> ExpenseQuery {
        ExpenseQuery::from_params(
            self.page.as_deref(),
            self.limit.as_deref(),
            self.sort_by.as_deref(),
            self.sort_order.as_deref(),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    pub id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: Currency,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Expense> for ExpenseResponse {
    fn from(expense: &Expense) -> Self {
        Self {
            id: *expense.id.as_uuid(),
            amount: expense.amount.amount(),
            currency: expense.amount.currency(),
            description: expense.description.clone(),
            created_at: expense.created_at,
            updated_at: expense.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseEnvelope {
    pub success: bool,
    pub expense: ExpenseResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExpenseEnvelope {
    pub fn new(expense: &Expense, message: Option<&str>) -> Self {
        Self {
            success: true,
            expense: ExpenseResponse::from(expense),
            message: message.map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListResponse {
    pub success: bool,
    pub expenses: Vec<ExpenseResponse>,
    pub pagination: Pagination,
}

impl From<&ExpensePage> for ExpenseListResponse {
    fn from(page: &ExpensePage) -> Self {
        Self {
            success: true,
            expenses: page.expenses.iter().map(ExpenseResponse::from).collect(),
            pagination: page.pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_billing::{ExpenseSort, SortOrder};

    #[test]
    fn test_order_alias() {
        let params: ExpenseListParams = serde_json::from_str(r#"{"sortBy":"amount","order":"asc"}"#).unwrap();
        let query = params.to_query();
        assert_eq!(query.sort_by, ExpenseSort::Amount);
        assert_eq!(query.order, SortOrder::Asc);
    }
}
