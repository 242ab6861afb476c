//! Authentication and authorization
//!
//! Bearer tokens are HS256 JWTs whose subject is the user id. The only
//! role the service distinguishes is `admin`; every other caller acts for
//! themselves.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::UserId;
use domain_identity::{Principal, User};

/// Role granted to administrators
pub const ADMIN_ROLE: &str = "admin";
/// Role granted to every signed-in user
pub const USER_ROLE: &str = "user";

/// Upper bound on token lifetime (one year)
const MAX_EXPIRATION_SECS: u64 = 365 * 24 * 60 * 60;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// Builds the principal the token speaks for
    pub fn principal(&self) -> Result<Principal, AuthError> {
        let user_id: UserId = self.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        Ok(if has_role(self, ADMIN_ROLE) {
            Principal::admin(user_id)
        } else {
            Principal::user(user_id)
        })
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token could not be signed: {0}")]
    Signing(String),
}

/// Creates a signed token for `user_id`
pub fn create_token(
    user_id: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs.min(MAX_EXPIRATION_SECS) as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Issues a token for a signed-in user
pub fn token_for(user: &User, secret: &str, expiration_secs: u64) -> Result<String, AuthError> {
    let mut roles = vec![USER_ROLE.to_string()];
    if user.is_admin {
        roles.push(ADMIN_ROLE.to_string());
    }
    create_token(&user.id.as_uuid().to_string(), roles, secret, expiration_secs)
}

/// Validates a token and returns its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Checks if the claims carry a role; admins hold every role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role || r == ADMIN_ROLE)
}
