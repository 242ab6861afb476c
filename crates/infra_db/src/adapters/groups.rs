//! PostgreSQL Group Adapter

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, GroupId, HealthCheckResult, HealthCheckable, PortError, UserId};
use domain_group::{Group, GroupPort, MemberSummary};

use crate::repositories::groups::{GroupRepository, GroupWithMembers, MemberRow, NewGroup, NewMember};

use super::check_pool;

/// PostgreSQL-backed implementation of the GroupPort trait
///
/// Membership adds take a row lock on the group; the `group_members`
/// primary key turns a concurrent duplicate add into `PortError::Conflict`.
#[derive(Debug, Clone)]
pub struct PostgresGroupAdapter {
    repository: GroupRepository,
    pool: PgPool,
}

impl PostgresGroupAdapter {
    /// Creates a new PostgreSQL group adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: GroupRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &GroupRepository {
        &self.repository
    }
}

impl DomainPort for PostgresGroupAdapter {}

#[async_trait]
impl HealthCheckable for PostgresGroupAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        check_pool(&self.pool, "postgres-group-adapter").await
    }
}

#[async_trait]
impl GroupPort for PostgresGroupAdapter {
    #[instrument(skip(self, group), fields(group_id = %group.id))]
    async fn create_group(&self, group: &Group) -> Result<Group, PortError> {
        let new_group = NewGroup {
            id: group.id.into(),
            name: group.name.clone(),
            description: group.description.clone(),
            admin_id: group.admin.user_id.into(),
            created_at: group.created_at,
            updated_at: group.updated_at,
        };
        let members: Vec<NewMember> = group
            .members
            .iter()
            .map(|m| NewMember {
                user_id: m.user_id.into(),
                joined_at: m.joined_at,
            })
            .collect();

        self.repository.insert(&new_group, &members).await?;
        self.get_group(group.id).await
    }

    #[instrument(skip(self), fields(group_id = %id))]
    async fn get_group(&self, id: GroupId) -> Result<Group, PortError> {
        debug!("Fetching group by ID");
        let record = self.repository.get_with_members(id.into()).await?;
        Ok(record_to_group(record))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_groups_for(&self, user_id: UserId) -> Result<Vec<Group>, PortError> {
        let records = self.repository.list_for_user(user_id.into()).await?;
        Ok(records.into_iter().map(record_to_group).collect())
    }

    #[instrument(skip(self, member), fields(group_id = %group_id, user_id = %member.user_id))]
    async fn add_member(&self, group_id: GroupId, member: MemberSummary) -> Result<Group, PortError> {
        self.repository
            .add_member(
                group_id.into(),
                NewMember {
                    user_id: member.user_id.into(),
                    joined_at: member.joined_at,
                },
            )
            .await?;
        self.get_group(group_id).await
    }

    #[instrument(skip(self, group), fields(group_id = %group.id))]
    async fn update_group(&self, group: &Group) -> Result<Group, PortError> {
        self.repository
            .update(group.id.into(), &group.name, group.description.as_deref(), Utc::now())
            .await?;
        self.get_group(group.id).await
    }

    #[instrument(skip(self), fields(group_id = %id))]
    async fn delete_group(&self, id: GroupId) -> Result<(), PortError> {
        Ok(self.repository.delete(id.into()).await?)
    }
}

fn member_from_row(row: MemberRow) -> MemberSummary {
    MemberSummary {
        user_id: UserId::from_uuid(row.user_id),
        name: row.name,
        email: row.email,
        joined_at: row.joined_at,
    }
}

/// Maps a loaded group to the domain aggregate; the admin joined when the group was created
fn record_to_group(record: GroupWithMembers) -> Group {
    let GroupWithMembers { group, members } = record;
    Group {
        id: GroupId::from_uuid(group.id),
        name: group.name,
        description: group.description,
        admin: MemberSummary {
            user_id: UserId::from_uuid(group.admin_id),
            name: group.admin_name,
            email: group.admin_email,
            joined_at: group.created_at,
        },
        members: members.into_iter().map(member_from_row).collect(),
        created_at: group.created_at,
        updated_at: group.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::groups::GroupRow;
    use uuid::Uuid;

    #[test]
    fn test_record_to_group_keeps_join_order() {
        let now = Utc::now();
        let group_id = Uuid::now_v7();
        let admin_id = Uuid::now_v7();
        let (b, c) = (Uuid::now_v7(), Uuid::now_v7());
        let member = |user_id, name: &str, offset| MemberRow {
            group_id,
            user_id,
            name: name.to_string(),
            email: format!("{}@example.com", name),
            joined_at: now + chrono::Duration::seconds(offset),
        };

        let group = record_to_group(GroupWithMembers {
            group: GroupRow {
                id: group_id,
                name: "Flat".into(),
                description: None,
                admin_id,
                admin_name: "admin".into(),
                admin_email: "admin@example.com".into(),
                created_at: now,
                updated_at: now,
            },
            members: vec![member(b, "b", 1), member(c, "c", 2)],
        });

        assert!(group.is_admin(UserId::from_uuid(admin_id)));
        assert_eq!(
            group.billable_members(),
            vec![UserId::from_uuid(admin_id), UserId::from_uuid(b), UserId::from_uuid(c)]
        );
    }
}
