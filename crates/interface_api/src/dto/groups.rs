//! Group DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::UserId;
use domain_billing::Bill;
use domain_group::{Group, GroupUpdate, MemberSummary};
use domain_identity::MemberRef;

use super::bills::BillResponse;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[validate(required(message = "name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<UpdateGroupRequest> for GroupUpdate {
    fn from(req: UpdateGroupRequest) -> Self {
        GroupUpdate {
            name: req.name,
            description: req.description,
        }
    }
}

/// Names the group and the user to add; the user by id, email or name
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    #[validate(required(message = "groupId is required"))]
    pub group_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl AddMemberRequest {
    /// The member reference, or `None` if no usable identifier was given
    pub fn member_ref(&self) -> Option<MemberRef> {
        MemberRef::pick(
            self.user_id.map(UserId::from_uuid),
            self.email.clone(),
            self.name.clone(),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub joined_at: DateTime<Utc>,
}

impl From<&MemberSummary> for MemberResponse {
    fn from(member: &MemberSummary) -> Self {
        Self {
            user_id: *member.user_id.as_uuid(),
            name: member.name.clone(),
            email: member.email.clone(),
            joined_at: member.joined_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub admin: MemberResponse,
    pub members: Vec<MemberResponse>,
    pub member_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bills: Option<Vec<BillResponse>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupResponse {
    /// Attaches the group's bills (with their splits)
    pub fn with_bills(mut self, bills: &[Bill]) -> Self {
        self.bills = Some(bills.iter().map(BillResponse::from).collect());
        self
    }
}

impl From<&Group> for GroupResponse {
    fn from(group: &Group) -> Self {
        Self {
            id: *group.id.as_uuid(),
            name: group.name.clone(),
            description: group.description.clone(),
            admin: MemberResponse::from(&group.admin),
            members: group.members.iter().map(MemberResponse::from).collect(),
            member_count: group.participant_count(),
            bills: None,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessageResponse {
    pub message: String,
    pub group: GroupResponse,
}
