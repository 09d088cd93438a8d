//! Group model.

use super::{require_optional_text, require_text};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recovery group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Store-generated identifier
    pub id: String,

    /// Display name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Regular meeting day, e.g. "Tuesday"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_day: Option<String>,

    /// Regular meeting time, "HH:MM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_time: Option<String>,

    /// Meeting format, e.g. "Open Discussion"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    pub member_count: u32,

    /// User ids with admin rights. Never empty.
    pub admins: Vec<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Whether `user_id` is in the admin set.
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.iter().any(|id| id == user_id)
    }
}

/// A group as seen by one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    #[serde(flatten)]
    pub group: Group,
    pub is_admin: bool,
}

impl GroupView {
    pub fn new(group: Group, is_admin: bool) -> Self {
        Self { group, is_admin }
    }

    /// Annotate `group` for `user_id`.
    pub fn for_user(group: Group, user_id: &str) -> Self {
        let is_admin = group.is_admin(user_id);
        Self { group, is_admin }
    }
}

/// Payload for creating a group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_day: Option<String>,
    #[serde(default)]
    pub meeting_time: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl NewGroup {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        if let Some(day) = &self.meeting_day {
            super::require_weekday("meetingDay", day)?;
        }
        if let Some(time) = &self.meeting_time {
            super::require_time("meetingTime", time)?;
        }
        Ok(())
    }

    /// Build the stored group with `creator_id` as its only admin.
    pub fn into_group(self, id: String, creator_id: &str, now: DateTime<Utc>) -> Group {
        Group {
            id,
            name: self.name,
            description: self.description,
            location: self.location,
            meeting_day: self.meeting_day,
            meeting_time: self.meeting_time,
            format: self.format,
            member_count: 1,
            admins: vec![creator_id.to_string()],
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial group update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub meeting_day: Option<String>,
    pub meeting_time: Option<String>,
    pub format: Option<String>,
}

impl GroupUpdate {
    pub fn validate(&self) -> Result<()> {
        require_optional_text("name", self.name.as_deref())?;
        if let Some(day) = &self.meeting_day {
            super::require_weekday("meetingDay", day)?;
        }
        if let Some(time) = &self.meeting_time {
            super::require_time("meetingTime", time)?;
        }
        Ok(())
    }

    pub fn apply(self, group: &mut Group, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            group.name = name;
        }
        if let Some(description) = self.description {
            group.description = Some(description);
        }
        if let Some(location) = self.location {
            group.location = Some(location);
        }
        if let Some(day) = self.meeting_day {
            group.meeting_day = Some(day);
        }
        if let Some(time) = self.meeting_time {
            group.meeting_time = Some(time);
        }
        if let Some(format) = self.format {
            group.format = Some(format);
        }
        group.updated_at = now;
    }
}
