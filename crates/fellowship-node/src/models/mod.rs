//! Data models for Fellowship.
//!
//! All documents serialize with camelCase field names. Instants are stored
//! as integer milliseconds since the Unix epoch so the store can order and
//! range-filter them numerically; calendar dates are `YYYY-MM-DD` strings.
//!
//! # Core Types
//!
//! - [`Group`] - A recovery group with its admin set
//! - [`Member`] - A group's member record, keyed by user id
//! - [`UserProfile`] - A user's profile including `homeGroups`
//! - [`Announcement`] - A group announcement, optionally pinned or expiring
//! - [`Event`] / [`Meeting`] - Group-scoped events and recurring meetings
//!
//! # Request Types
//!
//! Creation payloads (`New*`) and per-field-optional updates (`*Update`) are
//! validated with `validate()` before they reach a service.

mod announcement;
mod event;
mod group;
mod meeting;
mod member;
mod user;

pub use announcement::{Announcement, AnnouncementUpdate, NewAnnouncement};
pub use event::{Event, EventUpdate, NewEvent};
pub use group::{Group, GroupUpdate, GroupView, NewGroup};
pub use meeting::{Meeting, MeetingUpdate, NewMeeting};
pub use member::{Celebration, Member, RoleUpdate, CREATOR_POSITION};
pub use user::{NewProfile, ProfileUpdate, UserProfile};

use crate::error::{ApiError, Result};

/// Document field names used in store queries.
pub mod fields {
    pub const CREATED_AT: &str = "createdAt";
    pub const UPDATED_AT: &str = "updatedAt";
    pub const IS_PINNED: &str = "isPinned";
    pub const EXPIRES_AT: &str = "expiresAt";
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_optional_text(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) => require_text(field, value),
        None => Ok(()),
    }
}

fn require_time(field: &str, value: &str) -> Result<()> {
    chrono::NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| ApiError::bad_request(format!("{} must be HH:MM", field)))
}

fn require_weekday(field: &str, value: &str) -> Result<()> {
    value
        .parse::<chrono::Weekday>()
        .map(|_| ())
        .map_err(|_| ApiError::bad_request(format!("{} must be a day of the week", field)))
}

/// Add `user_id` to `list` unless present. Returns whether it was added.
pub(crate) fn add_unique(list: &mut Vec<String>, user_id: &str) -> bool {
    if list.iter().any(|id| id == user_id) {
        return false;
    }
    list.push(user_id.to_string());
    true
}
