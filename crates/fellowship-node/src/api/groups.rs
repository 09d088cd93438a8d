//! Group and membership endpoints.

use super::{check_ids, AuthUser, Json, Path, SharedState};
use crate::error::Result;
use crate::models::{Celebration, GroupUpdate, GroupView, Member, NewGroup, RoleUpdate};
use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

pub(super) async fn create_group(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Json(req): Json<NewGroup>,
) -> Result<(StatusCode, Json<Value>)> {
    req.validate()?;
    let group = state.groups.create_group(&uid, req)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Group created successfully", "group": group })),
    ))
}

pub(super) async fn get_group(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<GroupView>> {
    check_ids(&[&id])?;
    Ok(Json(state.groups.get_group_by_id(&uid, &id)?))
}

pub(super) async fn update_group(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<GroupUpdate>,
) -> Result<Json<Value>> {
    check_ids(&[&id])?;
    req.validate()?;
    let group = state.groups.update_group(&uid, &id, req)?;
    Ok(Json(json!({ "message": "Group updated successfully", "group": group })))
}

pub(super) async fn delete_group(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    check_ids(&[&id])?;
    state.groups.delete_group(&uid, &id)?;
    Ok(Json(json!({ "message": "Group deleted successfully" })))
}

pub(super) async fn get_user_groups(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
) -> Result<Json<Vec<GroupView>>> {
    Ok(Json(state.groups.get_user_groups(&uid)?))
}

// --- Membership ---

pub(super) async fn get_members(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Member>>> {
    check_ids(&[&id])?;
    Ok(Json(state.groups.get_group_members(&uid, &id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddMemberRequest {
    user_id: String,
}

pub(super) async fn add_member(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    check_ids(&[&id, &req.user_id])?;
    let member = state.groups.add_member(&uid, &id, &req.user_id)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Member added successfully", "member": member })),
    ))
}

pub(super) async fn update_member_role(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, member_id)): Path<(String, String)>,
    Json(req): Json<RoleUpdate>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &member_id])?;
    let member = state
        .groups
        .update_member_role(&uid, &id, &member_id, req.is_admin, req.position)?;
    Ok(Json(json!({ "message": "Member role updated successfully", "member": member })))
}

pub(super) async fn remove_member(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, member_id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &member_id])?;
    state.groups.remove_member(&uid, &id, &member_id)?;
    Ok(Json(json!({ "message": "Member removed successfully" })))
}

pub(super) async fn join_group(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    check_ids(&[&id])?;
    let member = state.groups.join_group(&uid, &id)?;
    Ok(Json(json!({ "message": "Joined group successfully", "member": member })))
}

pub(super) async fn leave_group(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    check_ids(&[&id])?;
    state.groups.leave_group(&uid, &id)?;
    Ok(Json(json!({ "message": "Left group successfully" })))
}

pub(super) async fn get_celebrations(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Celebration>>> {
    check_ids(&[&id])?;
    Ok(Json(state.groups.get_group_celebrations(&uid, &id)?))
}
