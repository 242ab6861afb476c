//! Identity domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the identity domain
#[derive(Debug, Error)]
pub enum IdentityError {
    /// User with the given identifier was not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Email is already registered to another user
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Unknown email, no password set, or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The principal may not perform this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Input failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Underlying port failure
    #[error(transparent)]
    Port(#[from] PortError),
}

impl IdentityError {
    /// Creates a UserNotFound error from any ID type
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        IdentityError::UserNotFound(id.to_string())
    }

    /// Creates a Validation error from collected messages
    pub fn validation_failed(errors: Vec<String>) -> Self {
        IdentityError::Validation(errors.join("; "))
    }

    /// Maps a port NotFound into `UserNotFound`, leaving other errors intact
    pub(crate) fn from_lookup(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => IdentityError::UserNotFound(id),
            other => IdentityError::Port(other),
        }
    }
}
