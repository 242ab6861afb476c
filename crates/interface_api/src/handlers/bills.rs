//! Personal bill handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::BillId;
use domain_identity::Principal;

use crate::dto::bills::{BillResponse, CreateBillRequest};
use crate::dto::{money_from_request, MessageResponse};
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::AppState;

/// Creates a bill owned by the caller with no group and no splits
pub async fn create_bill(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<CreateBillRequest>,
) -> Result<(StatusCode, Json<BillResponse>), ApiError> {
    let amount = money_from_request(
        request.amount.unwrap_or_default(),
        request.currency.as_deref(),
        state.config.currency(),
    )?;
    let bill = state
        .billing
        .create_personal_bill(&principal, amount, request.description.as_deref().unwrap_or_default())
        .await?;
    Ok((StatusCode::CREATED, Json(BillResponse::from(&bill))))
}

pub async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillResponse>, ApiError> {
    let bill = state.billing.get_bill(BillId::from_uuid(id)).await?;
    Ok(Json(BillResponse::from(&bill)))
}

pub async fn delete_bill(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.billing.delete_bill(&principal, BillId::from_uuid(id)).await?;
    Ok(Json(MessageResponse::new("Bill deleted successfully")))
}
