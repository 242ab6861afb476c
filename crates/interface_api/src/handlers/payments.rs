//! Payment handler

use axum::{extract::State, Extension, Json};

use domain_identity::Principal;

use crate::dto::bills::{PaymentRequest, PaymentResponse};
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::AppState;

/// Marks the payer's split as paid and settles the bill when it was the last
///
/// The payer defaults to the caller.
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<PaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let receipt = state
        .billing
        .record_payment(&principal, request.into_confirmation())
        .await?;
    Ok(Json(PaymentResponse::from(receipt)))
}
