//! Event endpoints.

use super::{check_ids, AuthUser, Json, Path, SharedState};
use crate::error::Result;
use crate::models::{Event, EventUpdate, NewEvent};
use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};

pub(super) async fn list_events(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Event>>> {
    check_ids(&[&id])?;
    Ok(Json(state.events.get_group_events(&uid, &id)?))
}

pub(super) async fn get_event(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, eid)): Path<(String, String)>,
) -> Result<Json<Event>> {
    check_ids(&[&id, &eid])?;
    Ok(Json(state.events.get_event_by_id(&uid, &id, &eid)?))
}

pub(super) async fn create_event(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<NewEvent>,
) -> Result<(StatusCode, Json<Value>)> {
    check_ids(&[&id])?;
    req.validate()?;
    let event = state.events.create_event(&uid, &id, req)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Event created successfully", "event": event })),
    ))
}

pub(super) async fn update_event(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, eid)): Path<(String, String)>,
    Json(req): Json<EventUpdate>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &eid])?;
    req.validate()?;
    let event = state.events.update_event(&uid, &id, &eid, req)?;
    Ok(Json(json!({ "message": "Event updated successfully", "event": event })))
}

pub(super) async fn delete_event(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, eid)): Path<(String, String)>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &eid])?;
    state.events.delete_event(&uid, &id, &eid)?;
    Ok(Json(json!({ "message": "Event deleted successfully" })))
}

pub(super) async fn join_event(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, eid)): Path<(String, String)>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &eid])?;
    let event = state.events.join_event(&uid, &id, &eid)?;
    Ok(Json(json!({ "message": "Joined event successfully", "event": event })))
}

pub(super) async fn leave_event(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, eid)): Path<(String, String)>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &eid])?;
    let event = state.events.leave_event(&uid, &id, &eid)?;
    Ok(Json(json!({ "message": "Left event successfully", "event": event })))
}
