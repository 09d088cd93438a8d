//! Group member records and celebrations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Position given to a group's creator.
pub const CREATOR_POSITION: &str = "Creator";

/// A member record in `groups/{gid}/members/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub uid: String,

    /// Copied from the user's profile when they joined
    pub display_name: String,

    #[serde(default)]
    pub recovery_date: Option<NaiveDate>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub joined_at: DateTime<Utc>,

    /// Service position, e.g. "Secretary"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    pub is_admin: bool,

    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of a role change request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    pub is_admin: bool,
    #[serde(default)]
    pub position: Option<String>,
}

/// An upcoming sobriety anniversary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Celebration {
    /// `celebration-{uid}`
    pub id: String,
    pub member_id: String,
    pub member_name: String,
    pub years: i32,
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_without_optional_fields() {
        let member: Member = serde_json::from_value(json!({
            "uid": "u1",
            "displayName": "Sam",
            "joinedAt": 1_700_000_000_000i64,
            "isAdmin": false,
        }))
        .unwrap();
        assert_eq!(member.recovery_date, None);
        assert_eq!(member.position, None);
        assert_eq!(member.updated_at, None);
    }

    #[test]
    fn recovery_date_is_calendar_date() {
        let member: Member = serde_json::from_value(json!({
            "uid": "u1",
            "displayName": "Sam",
            "recoveryDate": "2019-03-14",
            "joinedAt": 0,
            "isAdmin": true,
        }))
        .unwrap();
        assert_eq!(member.recovery_date, NaiveDate::from_ymd_opt(2019, 3, 14));
    }
}
