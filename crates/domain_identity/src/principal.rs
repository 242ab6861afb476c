//! The authenticated actor behind a request

use serde::{Deserialize, Serialize};

use core_kernel::UserId;

use crate::user::User;

/// The authenticated user on whose behalf an operation runs
///
/// Every core operation that depends on "who is asking" receives a
/// `Principal` argument. Nothing reads the caller from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Principal {
    /// Creates a principal for a regular user
    pub fn user(user_id: UserId) -> Self {
        Self { user_id, is_admin: false }
    }

    /// Creates a principal with administrative rights
    pub fn admin(user_id: UserId) -> Self {
        Self { user_id, is_admin: true }
    }

    /// Returns true if the principal may act on resources owned by `owner`
    pub fn can_act_for(&self, owner: UserId) -> bool {
        self.is_admin || self.user_id == owner
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            is_admin: user.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_act_for_self() {
        let id = UserId::new();
        assert!(Principal::user(id).can_act_for(id));
        assert!(!Principal::user(id).can_act_for(UserId::new()));
    }

    #[test]
    fn test_admin_can_act_for_anyone() {
        assert!(Principal::admin(UserId::new()).can_act_for(UserId::new()));
    }
}
