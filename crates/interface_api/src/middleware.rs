//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use domain_identity::Principal;

use crate::auth::{validate_token, Claims};
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token and stores both the `Claims` and the derived
/// `Principal` in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        warn!("Missing or invalid Authorization header");
        return Err(ApiError::Unauthorized("Missing bearer token".to_string()));
    };

    let claims = validate_token(token, &state.config.jwt_secret).map_err(|e| {
        warn!(error = %e, "Token validation failed");
        ApiError::Unauthorized(e.to_string())
    })?;
    let principal = claims.principal().map_err(|e| {
        warn!(error = %e, "Token subject is not a user id");
        ApiError::Unauthorized(e.to_string())
    })?;

    request.extensions_mut().insert(principal);
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Header carrying the OAuth front end's shared secret
pub const OAUTH_PROXY_SECRET_HEADER: &str = "x-oauth-proxy-secret";

/// Marks a request as coming from the trusted OAuth front end
#[derive(Debug, Clone, Copy)]
pub struct TrustedOAuthProxy;

/// Guards OAuth sign-in
///
/// Only the front end that completed the provider flow knows the shared
/// secret. With no secret configured every call is rejected.
pub async fn oauth_proxy_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.oauth_proxy_secret.as_deref().filter(|s| !s.is_empty()) else {
        warn!("OAuth sign-in attempted but no proxy secret is configured");
        return Err(ApiError::Unauthorized("OAuth sign-in is not enabled".to_string()));
    };

    let presented = request
        .headers()
        .get(OAUTH_PROXY_SECRET_HEADER)
        .map(|h| h.as_bytes())
        .unwrap_or_default();

    if !bool::from(presented.ct_eq(expected.as_bytes())) {
        warn!("OAuth sign-in rejected: bad proxy secret");
        return Err(ApiError::Unauthorized("Invalid OAuth proxy credentials".to_string()));
    }

    request.extensions_mut().insert(TrustedOAuthProxy);
    Ok(next.run(request).await)
}

/// Audit logging middleware
///
/// Logs every API request with its principal, status and duration.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_id = request
        .extensions()
        .get::<Claims>()
        .map(|c| c.sub.clone())
        .unwrap_or_else(|| "anonymous".to_string());
    let admin = request
        .extensions()
        .get::<Principal>()
        .is_some_and(|p| p.is_admin);

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        admin,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
