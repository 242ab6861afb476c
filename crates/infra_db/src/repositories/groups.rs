//! Group repository implementation
//!
//! A group row carries its admin; ordinary members live in
//! `group_members`. Member names and emails are joined in from `users` so
//! that a loaded group is ready to display.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

const GROUP_SELECT: &str = r#"
    SELECT g.id, g.name, g.description, g.admin_id,
           a.name AS admin_name, a.email AS admin_email,
           g.created_at, g.updated_at
    FROM groups g
    JOIN users a ON a.id = g.admin_id
"#;

const MEMBER_SELECT: &str = r#"
    SELECT m.group_id, m.user_id, u.name, u.email, m.joined_at
    FROM group_members m
    JOIN users u ON u.id = m.user_id
"#;

/// Database row for a group joined with its admin
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub admin_id: Uuid,
    pub admin_name: String,
    pub admin_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for a membership joined with the member's user record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberRow {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub joined_at: DateTime<Utc>,
}

/// A group with its members in join order
#[derive(Debug, Clone)]
pub struct GroupWithMembers {
    pub group: GroupRow,
    pub members: Vec<MemberRow>,
}

/// Data for inserting a new group
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub admin_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a membership
#[derive(Debug, Clone, Copy)]
pub struct NewMember {
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

/// Repository for groups and memberships
#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a group and any initial members in one transaction
    pub async fn insert(&self, group: &NewGroup, members: &[NewMember]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO groups (id, name, description, admin_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.description)
        .bind(group.admin_id)
        .bind(group.created_at)
        .bind(group.updated_at)
        .execute(&mut *tx)
        .await?;

        for member in members {
            sqlx::query("INSERT INTO group_members (group_id, user_id, joined_at) VALUES ($1, $2, $3)")
                .bind(group.id)
                .bind(member.user_id)
                .bind(member.joined_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Retrieves a group with its members
    pub async fn get_with_members(&self, id: Uuid) -> Result<GroupWithMembers, DatabaseError> {
        let sql = format!("{GROUP_SELECT} WHERE g.id = $1");
        let group = sqlx::query_as::<_, GroupRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Group", id))?;

        let sql = format!("{MEMBER_SELECT} WHERE m.group_id = $1 ORDER BY m.joined_at, m.user_id");
        let members = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(GroupWithMembers { group, members })
    }

    /// Groups the user administers or belongs to, oldest first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<GroupWithMembers>, DatabaseError> {
        let sql = format!(
            r#"{GROUP_SELECT}
            WHERE g.admin_id = $1
               OR EXISTS (SELECT 1 FROM group_members gm WHERE gm.group_id = g.id AND gm.user_id = $1)
            ORDER BY g.created_at, g.id"#
        );
        let groups = sqlx::query_as::<_, GroupRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<Uuid> = groups.iter().map(|g| g.id).collect();
        let sql = format!("{MEMBER_SELECT} WHERE m.group_id = ANY($1) ORDER BY m.joined_at, m.user_id");
        let mut members = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(groups
            .into_iter()
            .map(|group| {
                let (mine, rest): (Vec<_>, Vec<_>) = members.drain(..).partition(|m| m.group_id == group.id);
                members = rest;
                GroupWithMembers { group, members: mine }
            })
            .collect())
    }

    /// Adds a member under a row lock on the group
    ///
    /// Returns `DuplicateEntry` when the user is the admin or already a
    /// member; the primary key on `group_members` settles concurrent adds.
    pub async fn add_member(&self, group_id: Uuid, member: NewMember) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let admin_id: Uuid = sqlx::query_scalar("SELECT admin_id FROM groups WHERE id = $1 FOR UPDATE")
            .bind(group_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Group", group_id))?;

        if admin_id == member.user_id {
            return Err(DatabaseError::DuplicateEntry(format!(
                "user {} is the admin of group {}",
                member.user_id, group_id
            )));
        }

        sqlx::query("INSERT INTO group_members (group_id, user_id, joined_at) VALUES ($1, $2, $3)")
            .bind(group_id)
            .bind(member.user_id)
            .bind(member.joined_at)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE groups SET updated_at = $2 WHERE id = $1")
            .bind(group_id)
            .bind(member.joined_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Updates name, description and `updated_at`
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        description: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE groups SET name = $2, description = $3, updated_at = $4 WHERE id = $1")
            .bind(id)
            .bind(name)
            .bind(description)
            .bind(updated_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Group", id));
        }
        Ok(())
    }

    /// Deletes a group; memberships and group bills cascade
    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Group", id));
        }
        Ok(())
    }
}
