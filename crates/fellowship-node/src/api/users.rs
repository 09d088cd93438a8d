//! Profile endpoints.

use super::{AuthUser, Json, SharedState};
use crate::error::Result;
use crate::models::{NewProfile, ProfileUpdate, UserProfile};
use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};

pub(super) async fn create_profile(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Json(req): Json<NewProfile>,
) -> Result<(StatusCode, Json<Value>)> {
    req.validate()?;
    let profile = state.users.create_profile(&uid, req)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Profile created successfully", "user": profile })),
    ))
}

pub(super) async fn get_profile(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
) -> Result<Json<UserProfile>> {
    Ok(Json(state.users.get_profile(&uid)?))
}

pub(super) async fn update_profile(
    State(state): State<SharedState>,
    AuthUser(uid): AuthUser,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<Value>> {
    req.validate()?;
    let profile = state.users.update_profile(&uid, req)?;
    Ok(Json(json!({ "message": "Profile updated successfully", "user": profile })))
}
