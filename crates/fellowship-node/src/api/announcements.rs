//! Announcement endpoints.

use super::{check_ids, AuthUser, Json, PageParams, Path, Query, SharedState};
use crate::error::Result;
use crate::models::{Announcement, AnnouncementUpdate, NewAnnouncement};
use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};

pub(super) async fn list_announcements(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<Announcement>>> {
    check_ids(&[&id])?;
    let announcements = state.announcements.get_group_announcements(
        &uid,
        &id,
        page.limit,
        page.start_after.as_deref(),
    )?;
    Ok(Json(announcements))
}

pub(super) async fn get_announcement(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, aid)): Path<(String, String)>,
) -> Result<Json<Announcement>> {
    check_ids(&[&id, &aid])?;
    Ok(Json(state.announcements.get_announcement_by_id(&uid, &id, &aid)?))
}

pub(super) async fn create_announcement(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<NewAnnouncement>,
) -> Result<(StatusCode, Json<Value>)> {
    check_ids(&[&id])?;
    req.validate()?;
    let announcement = state.announcements.create_announcement(&uid, &id, req)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Announcement created successfully",
            "announcement": announcement,
        })),
    ))
}

pub(super) async fn update_announcement(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, aid)): Path<(String, String)>,
    Json(req): Json<AnnouncementUpdate>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &aid])?;
    req.validate()?;
    let announcement = state
        .announcements
        .update_announcement(&uid, &id, &aid, req)?;
    Ok(Json(json!({
        "message": "Announcement updated successfully",
        "announcement": announcement,
    })))
}

pub(super) async fn delete_announcement(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path((id, aid)): Path<(String, String)>,
) -> Result<Json<Value>> {
    check_ids(&[&id, &aid])?;
    state.announcements.delete_announcement(&uid, &id, &aid)?;
    Ok(Json(json!({ "message": "Announcement deleted successfully" })))
}

/// Run the expiry sweep for one group. Any member may trigger it.
pub(super) async fn cleanup_expired(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    check_ids(&[&id])?;
    state.groups.get_group_by_id(&uid, &id)?;
    let deleted = state.announcements.cleanup_expired_announcements(&id)?;
    Ok(Json(json!({
        "message": "Expired announcements cleaned up",
        "deleted": deleted,
    })))
}
