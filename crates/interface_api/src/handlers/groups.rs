//! Group handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::GroupId;
use domain_identity::Principal;

use crate::dto::bills::{CreateBillRequest, GroupBillResponse};
use crate::dto::groups::*;
use crate::dto::{money_from_request, MessageResponse};
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::AppState;

/// Creates a group with the caller as admin
pub async fn create_group(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupMessageResponse>), ApiError> {
    let group = state
        .groups
        .create_group(&principal, request.name.as_deref().unwrap_or_default(), request.description)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GroupMessageResponse {
            message: "Group created successfully".to_string(),
            group: GroupResponse::from(&group),
        }),
    ))
}

/// Groups the caller administers or belongs to
pub async fn list_groups(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<GroupResponse>>, ApiError> {
    let groups = state.groups.list_groups_for(principal.user_id).await?;
    Ok(Json(groups.iter().map(GroupResponse::from).collect()))
}

/// Group with admin, members, and every bill with its splits
pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupResponse>, ApiError> {
    let overview = state.billing.group_overview(GroupId::from_uuid(id)).await?;
    Ok(Json(GroupResponse::from(&overview.group).with_bills(&overview.bills)))
}

pub async fn update_group(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateGroupRequest>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group = state
        .groups
        .update_group(&principal, GroupId::from_uuid(id), request.into())
        .await?;
    Ok(Json(GroupResponse::from(&group)))
}

pub async fn delete_group(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.groups.delete_group(&principal, GroupId::from_uuid(id)).await?;
    Ok(Json(MessageResponse::new("Group deleted successfully")))
}

/// Adds a user, named by id, email or name, to a group
pub async fn add_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> Result<Json<GroupMessageResponse>, ApiError> {
    let member = request
        .member_ref()
        .ok_or_else(|| ApiError::validation("one of userId, email or name is required"))?;
    let group_id = GroupId::from_uuid(request.group_id.unwrap_or_default());

    let group = state.groups.add_member(&principal, group_id, &member).await?;

    Ok(Json(GroupMessageResponse {
        message: "User added to group successfully.".to_string(),
        group: GroupResponse::from(&group),
    }))
}

/// Creates a bill split equally across the group's participants
pub async fn create_group_bill(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateBillRequest>,
) -> Result<(StatusCode, Json<GroupBillResponse>), ApiError> {
    let amount = money_from_request(
        request.amount.unwrap_or_default(),
        request.currency.as_deref(),
        state.config.currency(),
    )?;

    let plan = state
        .billing
        .create_group_bill(
            &principal,
            GroupId::from_uuid(id),
            amount,
            request.description.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(GroupBillResponse::from(&plan))))
}
