//! User handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::error;
use uuid::Uuid;

use core_kernel::UserId;
use domain_identity::{Principal, User};

use crate::auth::token_for;
use crate::dto::bills::BillResponse;
use crate::dto::users::*;
use crate::dto::MessageResponse;
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::middleware::TrustedOAuthProxy;
use crate::AppState;

fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    token_for(user, &state.config.jwt_secret, state.config.jwt_expiration_secs).map_err(|e| {
        error!(error = %e, user_id = %user.id, "Failed to sign token");
        ApiError::Internal(e.to_string())
    })
}

/// Registers a user with a password credential
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.identity.register(request.into_registration()).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Password login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .identity
        .login(
            request.email.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;
    let token = issue_token(&state, &user)?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse::from(&user),
    }))
}

/// Google sign-in; creates or links the account as needed
///
/// Reachable only through `oauth_proxy_middleware`, so the email has been
/// verified by the provider.
pub async fn google_sign_in(
    State(state): State<AppState>,
    Extension(_trusted): Extension<TrustedOAuthProxy>,
    ValidatedJson(request): ValidatedJson<OAuthSignInRequest>,
) -> Result<Json<OAuthSignInResponse>, ApiError> {
    let user = state
        .identity
        .sign_in_with_oauth(request.into_profile(GOOGLE_PROVIDER, true))
        .await?;
    let token = issue_token(&state, &user)?;

    Ok(Json(OAuthSignInResponse {
        user_id: *user.id.as_uuid(),
        token,
    }))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.identity.list_users().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.identity.get_user(UserId::from_uuid(id)).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Updates name and/or email; only the user themself or an admin
pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .identity
        .update_user(&principal, UserId::from_uuid(id), request.into())
        .await?;
    Ok(Json(UserResponse::from(&user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.identity.delete_user(&principal, UserId::from_uuid(id)).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// Bills the user owns or holds a split of, newest first
pub async fn user_bills(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BillResponse>>, ApiError> {
    let user_id = UserId::from_uuid(id);
    if !principal.can_act_for(user_id) {
        return Err(ApiError::Forbidden("cannot list another user's bills".to_string()));
    }
    let bills = state.billing.list_bills_for(user_id).await?;
    Ok(Json(bills.iter().map(BillResponse::from).collect()))
}
