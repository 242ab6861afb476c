//! Personal expense handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::ExpenseId;
use domain_billing::ExpenseUpdate;
use domain_identity::Principal;

use crate::dto::expenses::*;
use crate::dto::money_from_request;
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::AppState;

pub async fn create_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseEnvelope>), ApiError> {
    let amount = money_from_request(
        request.amount.unwrap_or_default(),
        request.currency.as_deref(),
        state.config.currency(),
    )?;
    let expense = state
        .expenses
        .create(&principal, amount, request.description.as_deref().unwrap_or_default())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ExpenseEnvelope::new(&expense, Some("Expense created successfully"))),
    ))
}

/// One page of the caller's expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ExpenseListParams>,
) -> Result<Json<ExpenseListResponse>, ApiError> {
    let page = state.expenses.list(&principal, params.to_query()).await?;
    Ok(Json(ExpenseListResponse::from(&page)))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseEnvelope>, ApiError> {
    let expense = state.expenses.get(&principal, ExpenseId::from_uuid(id)).await?;
    Ok(Json(ExpenseEnvelope::new(&expense, None)))
}

pub async fn update_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateExpenseRequest>,
) -> Result<Json<ExpenseEnvelope>, ApiError> {
    let amount = request
        .amount
        .map(|amount| money_from_request(amount, request.currency.as_deref(), state.config.currency()))
        .transpose()?;
    let update = ExpenseUpdate {
        amount,
        description: request.description,
    };

    let expense = state
        .expenses
        .update(&principal, ExpenseId::from_uuid(id), update)
        .await?;
    Ok(Json(ExpenseEnvelope::new(&expense, Some("Expense updated successfully"))))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseEnvelope>, ApiError> {
    let expense = state.expenses.delete(&principal, ExpenseId::from_uuid(id)).await?;
    Ok(Json(ExpenseEnvelope::new(&expense, Some("Expense deleted successfully"))))
}
