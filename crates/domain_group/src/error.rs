//! Group domain errors

use thiserror::Error;

use core_kernel::PortError;
use domain_identity::IdentityError;

/// Errors that can occur in the group domain
#[derive(Debug, Error)]
pub enum GroupError {
    /// Group with the given ID was not found
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// The user to add does not exist
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The user already belongs to the group
    #[error("User {user_id} is already a member of group {group_id}")]
    AlreadyMember { group_id: String, user_id: String },

    /// The principal may not perform this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid group data provided
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Underlying port failure
    #[error(transparent)]
    Port(#[from] PortError),
}

impl GroupError {
    /// Creates a GroupNotFound error from any ID type
    pub fn not_found(id: impl std::fmt::Display) -> Self {
        GroupError::GroupNotFound(id.to_string())
    }

    /// Maps a port NotFound into `GroupNotFound`, leaving other errors intact
    pub fn from_lookup(err: PortError) -> Self {
        match err {
            PortError::NotFound { id, .. } => GroupError::GroupNotFound(id),
            other => GroupError::Port(other),
        }
    }
}

impl From<IdentityError> for GroupError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::UserNotFound(id) => GroupError::UserNotFound(id),
            IdentityError::Forbidden(msg) => GroupError::Forbidden(msg),
            IdentityError::Validation(msg) => GroupError::Validation(msg),
            IdentityError::Port(port) => GroupError::Port(port),
            other => GroupError::Port(PortError::internal(other.to_string())),
        }
    }
}
