//! User profile model.

use super::{require_optional_text, require_text};
use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A user's profile in `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,

    #[serde(default)]
    pub recovery_date: Option<NaiveDate>,

    /// Ids of groups the user belongs to
    #[serde(default)]
    pub home_groups: Vec<String>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub recovery_date: Option<NaiveDate>,
}

impl NewProfile {
    pub fn validate(&self) -> Result<()> {
        require_text("email", &self.email)?;
        require_text("displayName", &self.display_name)
    }

    pub fn into_profile(self, uid: &str, now: DateTime<Utc>) -> UserProfile {
        UserProfile {
            uid: uid.to_string(),
            email: self.email,
            display_name: self.display_name,
            recovery_date: self.recovery_date,
            home_groups: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub recovery_date: Option<NaiveDate>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        require_optional_text("displayName", self.display_name.as_deref())
    }

    pub fn apply(self, profile: &mut UserProfile, now: DateTime<Utc>) {
        if let Some(name) = self.display_name {
            profile.display_name = name;
        }
        if let Some(date) = self.recovery_date {
            profile.recovery_date = Some(date);
        }
        profile.updated_at = now;
    }
}
