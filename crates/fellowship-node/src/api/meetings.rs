//! Meeting endpoints.

use super::{check_ids, AuthUser, Json, Path, SharedState};
use crate::error::Result;
use crate::models::{Meeting, MeetingUpdate, NewMeeting};
use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};

pub(super) async fn list_meetings(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Meeting>>> {
    check_ids(&[&id])?;
    Ok(Json(state.meetings.get_group_meetings(&uid, &id)?))
}

pub(super) async fn get_meeting(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, mid)): Path<(String, String)>,
) -> Result<Json<Meeting>> {
    check_ids(&[&id, &mid])?;
    Ok(Json(state.meetings.get_meeting_by_id(&uid, &id, &mid)?))
}

pub(super) async fn create_meeting(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<NewMeeting>,
) -> Result<(StatusCode, Json<Value>)> {
    check_ids(&[&id])?;
    req.validate()?;
    let meeting = state.meetings.create_meeting(&uid, &id, req)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Meeting created successfully", "meeting": meeting })),
    ))
}

pub(super) async fn update_meeting(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, mid)): Path<(String, String)>,
    Json(req): Json<MeetingUpdate>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &mid])?;
    req.validate()?;
    let meeting = state.meetings.update_meeting(&uid, &id, &mid, req)?;
    Ok(Json(json!({ "message": "Meeting updated successfully", "meeting": meeting })))
}

pub(super) async fn delete_meeting(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, mid)): Path<(String, String)>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &mid])?;
    state.meetings.delete_meeting(&uid, &id, &mid)?;
    Ok(Json(json!({ "message": "Meeting deleted successfully" })))
}

pub(super) async fn join_meeting(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, mid)): Path<(String, String)>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &mid])?;
    let meeting = state.meetings.join_meeting(&uid, &id, &mid)?;
    Ok(Json(json!({ "message": "Joined meeting successfully", "meeting": meeting })))
}

pub(super) async fn leave_meeting(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, mid)): Path<(String, String)>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &mid])?;
    let meeting = state.meetings.leave_meeting(&uid, &id, &mid)?;
    Ok(Json(json!({ "message": "Left meeting successfully", "meeting": meeting })))
}
