//! Error types for the Fellowship node.
//!
//! [`ApiError`] is what services return and what the HTTP layer renders.
//! [`Error`] covers node startup: configuration, IO and opening the store.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Client-facing messages.
pub mod messages {
    pub const GROUP_NOT_FOUND: &str = "Group not found";
    pub const USER_NOT_FOUND: &str = "User not found";
    pub const ANNOUNCEMENT_NOT_FOUND: &str = "Announcement not found";
    pub const EVENT_NOT_FOUND: &str = "Event not found";
    pub const MEETING_NOT_FOUND: &str = "Meeting not found";
    pub const USER_NOT_IN_GROUP: &str = "User is not a member of this group";
    pub const NOT_GROUP_MEMBER: &str = "You are not a member of this group";
    pub const NOT_GROUP_ADMIN: &str = "You are not an admin of this group";
    pub const CANNOT_REMOVE_LAST_ADMIN: &str = "Cannot remove the last admin of a group";
    pub const FORBIDDEN: &str = "You do not have permission to perform this action";
    pub const PROFILE_EXISTS: &str = "A profile already exists for this user";
    pub const MISSING_IDENTITY: &str = "Missing authenticated user";
    pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
}

/// Service error carrying an HTTP status and a client message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn group_not_found() -> Self {
        ApiError::NotFound(messages::GROUP_NOT_FOUND.into())
    }

    pub fn user_not_found() -> Self {
        ApiError::NotFound(messages::USER_NOT_FOUND.into())
    }

    pub fn user_not_in_group() -> Self {
        ApiError::NotFound(messages::USER_NOT_IN_GROUP.into())
    }

    pub fn not_group_member() -> Self {
        ApiError::Forbidden(messages::NOT_GROUP_MEMBER.into())
    }

    pub fn not_group_admin() -> Self {
        ApiError::Forbidden(messages::NOT_GROUP_ADMIN.into())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden(messages::FORBIDDEN.into())
    }

    pub fn last_admin() -> Self {
        ApiError::BadRequest(messages::CANNOT_REMOVE_LAST_ADMIN.into())
    }
}

impl From<fellowship_store::Error> for ApiError {
    fn from(e: fellowship_store::Error) -> Self {
        tracing::error!(error = %e, "store operation failed");
        ApiError::Internal(messages::INTERNAL_SERVER_ERROR.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "status": status.as_u16(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Errors that can stop the node from starting or serving.
#[derive(Debug, Error)]
pub enum Error {
    /// Store error
    #[error("Storage error: {0}")]
    Store(#[from] fellowship_store::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(ApiError::group_not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::not_group_member().status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::last_admin().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Unauthorized(messages::MISSING_IDENTITY.into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn store_errors_become_internal() {
        let err: ApiError = fellowship_store::Error::Storage("disk gone".into()).into();
        assert_eq!(
            err,
            ApiError::Internal(messages::INTERNAL_SERVER_ERROR.into())
        );
    }

    #[test]
    fn response_carries_status() {
        let response = ApiError::forbidden().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
