//! Group aggregate
//!
//! A group has exactly one admin and any number of members. The admin is
//! always a participant even though they are not stored in `members`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{GroupId, UserId};
use domain_identity::User;

use crate::error::GroupError;

/// Maximum length of a group name
pub const MAX_GROUP_NAME_LEN: usize = 100;
/// Maximum length of a group description
pub const MAX_GROUP_DESCRIPTION_LEN: usize = 500;

/// A participant as seen from a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub joined_at: DateTime<Utc>,
}

impl MemberSummary {
    /// Snapshots a user joining now
    pub fn joining(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            joined_at: Utc::now(),
        }
    }
}

/// A named set of users sharing bills
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub admin: MemberSummary,
    /// Members in join order, excluding the admin
    pub members: Vec<MemberSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Creates a group administered by `admin`
    pub fn new(name: impl Into<String>, description: Option<String>, admin: MemberSummary) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::new(),
            name: name.into(),
            description,
            admin,
            members: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the user is the admin
    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin.user_id == user_id
    }

    /// Returns true if the user is listed in `members`
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    /// Returns true if the user is the admin or a listed member
    pub fn is_participant(&self, user_id: UserId) -> bool {
        self.is_admin(user_id) || self.is_member(user_id)
    }

    /// Returns everyone who shares the group's bills
    ///
    /// The admin comes first, then members in join order, with no
    /// duplicates. Remainder cents of a split go to the front of this list.
    pub fn billable_members(&self) -> Vec<UserId> {
        let mut ids = Vec::with_capacity(self.members.len() + 1);
        ids.push(self.admin.user_id);
        for member in &self.members {
            if !ids.contains(&member.user_id) {
                ids.push(member.user_id);
            }
        }
        ids
    }

    /// Adds a member
    ///
    /// # Errors
    ///
    /// `GroupError::AlreadyMember` if the user is already a participant.
    pub fn add_member(&mut self, member: MemberSummary) -> Result<(), GroupError> {
        if self.is_participant(member.user_id) {
            return Err(GroupError::AlreadyMember {
                group_id: self.id.to_string(),
                user_id: member.user_id.to_string(),
            });
        }
        self.members.push(member);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Number of participants including the admin
    pub fn participant_count(&self) -> usize {
        self.billable_members().len()
    }
}

/// Validates a group name, returning the trimmed value
pub fn validate_name(name: &str) -> Result<String, GroupError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GroupError::Validation("Group name is required".to_string()));
    }
    if name.chars().count() > MAX_GROUP_NAME_LEN {
        return Err(GroupError::Validation(format!(
            "Group name must be at most {} characters",
            MAX_GROUP_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// Validates an optional description, treating blank as absent
pub fn validate_description(description: Option<String>) -> Result<Option<String>, GroupError> {
    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if let Some(d) = &description {
        if d.chars().count() > MAX_GROUP_DESCRIPTION_LEN {
            return Err(GroupError::Validation(format!(
                "Group description must be at most {} characters",
                MAX_GROUP_DESCRIPTION_LEN
            )));
        }
    }
    Ok(description)
}
