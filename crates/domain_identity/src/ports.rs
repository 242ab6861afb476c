//! Identity Domain Ports
//!
//! The `UserPort` trait defines what the identity domain needs from its
//! user store. Two adapters implement it:
//!
//! - **Postgres Adapter**: `infra_db::PostgresUserAdapter`
//! - **Mock Adapter**: in-memory, for tests (`mock` feature)
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_identity::{IdentityService, ports::UserPort};
//! use std::sync::Arc;
//!
//! let users: Arc<dyn UserPort> = Arc::new(PostgresUserAdapter::new(pool));
//! let identity = IdentityService::new(users);
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError, UserId};

use crate::user::User;

/// The port trait for user storage
///
/// Implementations must reject a second user with the same email with
/// `PortError::Conflict`. Emails are stored in normalized (lowercase) form,
/// so lookups compare exactly.
#[async_trait]
pub trait UserPort: DomainPort + HealthCheckable {
    /// Retrieves a user by ID, or `PortError::NotFound`
    async fn get_user(&self, id: UserId) -> Result<User, PortError>;

    /// Finds a user by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError>;

    /// Finds the earliest-registered user with exactly this name
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, PortError>;

    /// Finds the user linked to an OAuth account
    async fn find_by_oauth(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, PortError>;

    /// Lists all users in registration order
    async fn list_users(&self) -> Result<Vec<User>, PortError>;

    /// Persists a new user
    async fn create_user(&self, user: &User) -> Result<User, PortError>;

    /// Overwrites a stored user, credentials included
    async fn update_user(&self, user: &User) -> Result<User, PortError>;

    /// Deletes a user
    async fn delete_user(&self, id: UserId) -> Result<(), PortError>;
}

/// Mock implementation of UserPort for testing
///
/// This adapter stores users in memory and is useful for unit testing
/// without database dependencies.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::HealthCheckResult;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of UserPort
    #[derive(Debug, Default, Clone)]
    pub struct MockUserPort {
        users: Arc<RwLock<HashMap<UserId, User>>>,
    }

    impl MockUserPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with users for testing
        pub async fn with_users(users: Vec<User>) -> Self {
            let port = Self::new();
            for user in users {
                port.users.write().await.insert(user.id, user);
            }
            port
        }

        fn email_taken(users: &HashMap<UserId, User>, email: &str, except: UserId) -> bool {
            users.values().any(|u| u.id != except && u.email == email)
        }

        fn sorted(users: &HashMap<UserId, User>) -> Vec<User> {
            let mut all: Vec<User> = users.values().cloned().collect();
            all.sort_by_key(|u| u.id);
            all
        }
    }

    impl DomainPort for MockUserPort {}

    #[async_trait]
    impl HealthCheckable for MockUserPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-user-port")
        }
    }

    #[async_trait]
    impl UserPort for MockUserPort {
        async fn get_user(&self, id: UserId) -> Result<User, PortError> {
            self.users
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", id))
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError> {
            let users = self.users.read().await;
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<User>, PortError> {
            let users = self.users.read().await;
            Ok(Self::sorted(&users).into_iter().find(|u| u.name == name))
        }

        async fn find_by_oauth(
            &self,
            provider: &str,
            provider_id: &str,
        ) -> Result<Option<User>, PortError> {
            let users = self.users.read().await;
            Ok(users
                .values()
                .find(|u| u.has_oauth(provider, provider_id))
                .cloned())
        }

        async fn list_users(&self) -> Result<Vec<User>, PortError> {
            Ok(Self::sorted(&*self.users.read().await))
        }

        async fn create_user(&self, user: &User) -> Result<User, PortError> {
            let mut users = self.users.write().await;
            if Self::email_taken(&users, &user.email, user.id) {
                return Err(PortError::conflict(format!("email {} already registered", user.email)));
            }
            users.insert(user.id, user.clone());
            Ok(user.clone())
        }

        async fn update_user(&self, user: &User) -> Result<User, PortError> {
            let mut users = self.users.write().await;
            if !users.contains_key(&user.id) {
                return Err(PortError::not_found("User", user.id));
            }
            if Self::email_taken(&users, &user.email, user.id) {
                return Err(PortError::conflict(format!("email {} already registered", user.email)));
            }
            users.insert(user.id, user.clone());
            Ok(user.clone())
        }

        async fn delete_user(&self, id: UserId) -> Result<(), PortError> {
            self.users
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("User", id))
        }
    }
}
