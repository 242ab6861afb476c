//! API error handling
//!
//! Every handler returns `ApiError`; domain errors convert into it with
//! `From` so handlers can use `?` throughout.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_billing::BillingError;
use domain_group::GroupError;
use domain_identity::IdentityError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },
}

impl ApiError {
    /// Validation failure without per-field details
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::Unprocessable(msg) => ("unprocessable_entity", msg, None),
            ApiError::Internal(msg) => {
                error!(%msg, "Internal error");
                ("internal_error", "Internal server error".to_string(), None)
            }
            ApiError::Validation { message, details } => (
                "validation_error",
                message,
                (!details.is_empty()).then_some(details),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { message, .. } => ApiError::validation(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::UserNotFound(_) => ApiError::NotFound(err.to_string()),
            IdentityError::EmailTaken(_) => ApiError::Conflict(err.to_string()),
            IdentityError::InvalidCredentials => ApiError::Unauthorized("Invalid email or password".to_string()),
            IdentityError::Forbidden(msg) => ApiError::Forbidden(msg),
            IdentityError::Validation(msg) => ApiError::validation(msg),
            IdentityError::Hashing(msg) => ApiError::Internal(msg),
            IdentityError::Port(e) => e.into(),
        }
    }
}

impl From<GroupError> for ApiError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::GroupNotFound(_) | GroupError::UserNotFound(_) => ApiError::NotFound(err.to_string()),
            GroupError::AlreadyMember { .. } => ApiError::Conflict(err.to_string()),
            GroupError::Forbidden(msg) => ApiError::Forbidden(msg),
            GroupError::Validation(msg) => ApiError::validation(msg),
            GroupError::Port(e) => e.into(),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::BillNotFound(_)
            | BillingError::GroupNotFound(_)
            | BillingError::ExpenseNotFound(_)
            | BillingError::SplitNotFound { .. } => ApiError::NotFound(err.to_string()),
            BillingError::AlreadyPaid { .. } => ApiError::Conflict(err.to_string()),
            BillingError::Forbidden(msg) => ApiError::Forbidden(msg),
            BillingError::EmptyMemberSet(_) => ApiError::Unprocessable(err.to_string()),
            BillingError::Validation(msg) => ApiError::validation(msg),
            BillingError::Money(e) => ApiError::validation(e.to_string()),
            BillingError::Port(e) => e.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        details.sort();

        ApiError::Validation {
            message: "Validation failed".to_string(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::BillId;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unprocessable("x".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_billing_errors_map_to_distinct_statuses() {
        let bill_id = BillId::new().to_string();
        let split = ApiError::from(BillingError::SplitNotFound {
            bill_id: bill_id.clone(),
            user_id: "u".into(),
        });
        let paid = ApiError::from(BillingError::AlreadyPaid {
            bill_id,
            user_id: "u".into(),
        });
        assert_eq!(split.status(), StatusCode::NOT_FOUND);
        assert_eq!(paid.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(BillingError::EmptyMemberSet("g".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_identity_errors() {
        assert_eq!(ApiError::from(IdentityError::InvalidCredentials).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(IdentityError::EmailTaken("a@b.c".into())).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_port_conflict_is_409() {
        assert_eq!(ApiError::from(PortError::conflict("dup")).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(PortError::not_found("Bill", "x")).status(), StatusCode::NOT_FOUND);
    }
}
