//! Group Domain Ports
//!
//! `GroupPort` is the group store. Membership inserts must be atomic per
//! (group, user): adapters enforce uniqueness so that two concurrent adds
//! of the same user cannot both succeed.

use async_trait::async_trait;

use core_kernel::{DomainPort, GroupId, HealthCheckable, PortError, UserId};

use crate::group::{Group, MemberSummary};

/// The port trait for group storage
#[async_trait]
pub trait GroupPort: DomainPort + HealthCheckable {
    /// Persists a new group with its admin
    async fn create_group(&self, group: &Group) -> Result<Group, PortError>;

    /// Retrieves a group with admin and members, or `PortError::NotFound`
    async fn get_group(&self, id: GroupId) -> Result<Group, PortError>;

    /// Lists groups the user administers or belongs to, oldest first
    async fn list_groups_for(&self, user_id: UserId) -> Result<Vec<Group>, PortError>;

    /// Adds a member and returns the updated group
    ///
    /// # Errors
    ///
    /// - `PortError::NotFound` if the group does not exist
    /// - `PortError::Conflict` if the user already participates
    async fn add_member(&self, group_id: GroupId, member: MemberSummary) -> Result<Group, PortError>;

    /// Updates name and description
    async fn update_group(&self, group: &Group) -> Result<Group, PortError>;

    /// Deletes a group and its memberships
    async fn delete_group(&self, id: GroupId) -> Result<(), PortError>;
}

/// Mock implementation of GroupPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::HealthCheckResult;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of GroupPort
    #[derive(Debug, Default, Clone)]
    pub struct MockGroupPort {
        groups: Arc<RwLock<HashMap<GroupId, Group>>>,
    }

    impl MockGroupPort {
        /// Creates a new mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with groups for testing
        pub async fn with_groups(groups: Vec<Group>) -> Self {
            let port = Self::new();
            for group in groups {
                port.groups.write().await.insert(group.id, group);
            }
            port
        }
    }

    impl DomainPort for MockGroupPort {}

    #[async_trait]
    impl HealthCheckable for MockGroupPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-group-port")
        }
    }

    #[async_trait]
    impl GroupPort for MockGroupPort {
        async fn create_group(&self, group: &Group) -> Result<Group, PortError> {
            self.groups.write().await.insert(group.id, group.clone());
            Ok(group.clone())
        }

        async fn get_group(&self, id: GroupId) -> Result<Group, PortError> {
            self.groups
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Group", id))
        }

        async fn list_groups_for(&self, user_id: UserId) -> Result<Vec<Group>, PortError> {
            let groups = self.groups.read().await;
            let mut found: Vec<Group> = groups
                .values()
                .filter(|g| g.is_participant(user_id))
                .cloned()
                .collect();
            found.sort_by_key(|g| g.id);
            Ok(found)
        }

        async fn add_member(&self, group_id: GroupId, member: MemberSummary) -> Result<Group, PortError> {
            let mut groups = self.groups.write().await;
            let group = groups
                .get_mut(&group_id)
                .ok_or_else(|| PortError::not_found("Group", group_id))?;
            group
                .add_member(member)
                .map_err(|e| PortError::conflict(e.to_string()))?;
            Ok(group.clone())
        }

        async fn update_group(&self, group: &Group) -> Result<Group, PortError> {
            let mut groups = self.groups.write().await;
            let stored = groups
                .get_mut(&group.id)
                .ok_or_else(|| PortError::not_found("Group", group.id))?;
            stored.name = group.name.clone();
            stored.description = group.description.clone();
            stored.updated_at = Utc::now();
            Ok(stored.clone())
        }

        async fn delete_group(&self, id: GroupId) -> Result<(), PortError> {
            self.groups
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Group", id))
        }
    }
}
