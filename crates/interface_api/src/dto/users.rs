//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_identity::{OAuthProfile, ProfileUpdate, Registration, User};

/// Provider name used by the OAuth sign-in route
pub const GOOGLE_PROVIDER: &str = "google";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(required(message = "name is required"))]
    pub name: Option<String>,
    #[validate(required(message = "email is required"))]
    pub email: Option<String>,
    #[validate(required(message = "password is required"))]
    pub password: Option<String>,
}

impl RegisterRequest {
    pub fn into_registration(self) -> Registration {
        Registration {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(required(message = "email is required"))]
    pub email: Option<String>,
    #[validate(required(message = "password is required"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OAuthSignInRequest {
    #[validate(required(message = "providerId is required"), length(min = 1, max = 255))]
    pub provider_id: Option<String>,
    #[validate(required(message = "email is required"), email(message = "email is invalid"))]
    pub email: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl OAuthSignInRequest {
    pub fn into_profile(self, provider: &str, email_verified: bool) -> OAuthProfile {
        OAuthProfile {
            provider: provider.to_string(),
            provider_id: self.provider_id.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            name: self.name,
            image: self.image,
            email_verified,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateUserRequest> for ProfileUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        ProfileUpdate {
            name: req.name,
            email: req.email,
        }
    }
}

/// Public view of a user; credentials never appear here
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            name: user.name.clone(),
            email: user.email.clone(),
            image: user.image.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthSignInResponse {
    pub user_id: Uuid,
    pub token: String,
}
