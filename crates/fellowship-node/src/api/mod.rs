//! HTTP API for Fellowship.
//!
//! Every route lives under `/api/v1`. Callers identify themselves with the
//! `x-user-id` header, which the fronting auth proxy sets after verifying
//! the session.

mod announcements;
mod events;
mod extract;
mod groups;
mod meetings;
mod users;

pub use extract::{Json, Path, Query};

use crate::error::{messages, ApiError, Result};
use crate::node::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub type SharedState = Arc<AppState>;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Build the API router.
pub fn build_router(state: SharedState) -> Router {
    // CORS layer for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health (at root and under /api/v1)
        .route("/health", get(health))
        .route("/api/v1/health", get(health))
        .route("/api/v1/ready", get(ready))
        // Profile
        .route(
            "/api/v1/users/me",
            post(users::create_profile)
                .get(users::get_profile)
                .put(users::update_profile),
        )
        .route("/api/v1/users/me/groups", get(groups::get_user_groups))
        // Groups
        .route("/api/v1/groups", post(groups::create_group))
        .route(
            "/api/v1/groups/:id",
            get(groups::get_group)
                .put(groups::update_group)
                .delete(groups::delete_group),
        )
        .route(
            "/api/v1/groups/:id/members",
            get(groups::get_members).post(groups::add_member),
        )
        .route(
            "/api/v1/groups/:id/members/:member_id",
            put(groups::update_member_role).delete(groups::remove_member),
        )
        .route("/api/v1/groups/:id/join", post(groups::join_group))
        .route("/api/v1/groups/:id/leave", post(groups::leave_group))
        .route("/api/v1/groups/:id/celebrations", get(groups::get_celebrations))
        // Announcements
        .route(
            "/api/v1/groups/:id/announcements",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route(
            "/api/v1/groups/:id/announcements/cleanup",
            post(announcements::cleanup_expired),
        )
        .route(
            "/api/v1/groups/:id/announcements/:aid",
            get(announcements::get_announcement)
                .put(announcements::update_announcement)
                .delete(announcements::delete_announcement),
        )
        // Events
        .route(
            "/api/v1/groups/:id/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/v1/groups/:id/events/:eid",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/api/v1/groups/:id/events/:eid/join", post(events::join_event))
        .route("/api/v1/groups/:id/events/:eid/leave", post(events::leave_event))
        // Meetings
        .route(
            "/api/v1/groups/:id/meetings",
            get(meetings::list_meetings).post(meetings::create_meeting),
        )
        .route(
            "/api/v1/groups/:id/meetings/:mid",
            get(meetings::get_meeting)
                .put(meetings::update_meeting)
                .delete(meetings::delete_meeting),
        )
        .route("/api/v1/groups/:id/meetings/:mid/join", post(meetings::join_meeting))
        .route("/api/v1/groups/:id/meetings/:mid/leave", post(meetings::leave_meeting))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// --- Health endpoints ---

async fn health() -> &'static str {
    "OK"
}

async fn ready() -> &'static str {
    "OK"
}

// --- Shared extractors ---

/// The caller, taken from the `x-user-id` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let uid = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        if uid.is_empty() || uid.contains('/') {
            return Err(ApiError::Unauthorized(messages::MISSING_IDENTITY.into()));
        }
        Ok(AuthUser(uid.to_string()))
    }
}

/// `?limit=&startAfter=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageParams {
    pub limit: Option<usize>,
    pub start_after: Option<String>,
}

/// Ids from the URL become store path segments, so they may not contain a
/// separator once percent-decoded.
pub(crate) fn check_ids(ids: &[&str]) -> Result<()> {
    if ids.iter().any(|id| id.is_empty() || id.contains('/')) {
        return Err(ApiError::bad_request("Invalid id"));
    }
    Ok(())
}
