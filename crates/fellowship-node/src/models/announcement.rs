//! Announcement model.

use super::{require_optional_text, require_text};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// An announcement in `groups/{gid}/announcements/{aid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub content: String,
    pub is_pinned: bool,

    /// Author user id
    pub created_by: String,

    /// Author display name at creation time
    pub author_name: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,

    /// Removed by the expiry sweep once this instant has passed
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Payload for creating an announcement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_pinned: Option<bool>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewAnnouncement {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }
}

/// Partial announcement update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
    /// `Some(None)` clears the expiry; JSON `null` parses to that.
    #[serde(default, deserialize_with = "nullable_millis")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

fn nullable_millis<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    chrono::serde::ts_milliseconds_option::deserialize(deserializer).map(Some)
}

impl AnnouncementUpdate {
    pub fn validate(&self) -> Result<()> {
        require_optional_text("title", self.title.as_deref())?;
        require_optional_text("content", self.content.as_deref())
    }

    pub fn apply(self, announcement: &mut Announcement, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            announcement.title = title;
        }
        if let Some(content) = self.content {
            announcement.content = content;
        }
        if let Some(pinned) = self.is_pinned {
            announcement.is_pinned = pinned;
        }
        if let Some(expires_at) = self.expires_at {
            announcement.expires_at = expires_at;
        }
        announcement.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expiry_is_omitted_when_absent() {
        let now = Utc::now();
        let announcement = Announcement {
            id: "a1".into(),
            group_id: "g1".into(),
            title: "Business meeting".into(),
            content: "After the regular meeting".into(),
            is_pinned: false,
            created_by: "u1".into(),
            author_name: "Sam".into(),
            created_at: now,
            updated_at: now,
            expires_at: None,
        };
        let json = serde_json::to_value(&announcement).unwrap();
        assert!(json.get("expiresAt").is_none());
        assert_eq!(json["isPinned"], false);
    }

    #[test]
    fn update_payload_parses_partial_fields() {
        let update: AnnouncementUpdate =
            serde_json::from_value(json!({"isPinned": true})).unwrap();
        assert_eq!(update.is_pinned, Some(true));
        assert!(update.title.is_none());
        assert!(update.expires_at.is_none());
    }

    #[test]
    fn null_expiry_clears_and_absent_keeps() {
        let now = Utc::now();
        let mut announcement = Announcement {
            id: "a1".into(),
            group_id: "g1".into(),
            title: "Retreat".into(),
            content: "Sign-ups open".into(),
            is_pinned: false,
            created_by: "u1".into(),
            author_name: "Sam".into(),
            created_at: now,
            updated_at: now,
            expires_at: Some(now),
        };

        let keep: AnnouncementUpdate = serde_json::from_value(json!({"title": "Retreat 2"})).unwrap();
        keep.apply(&mut announcement, now);
        assert_eq!(announcement.expires_at, Some(now));

        let clear: AnnouncementUpdate = serde_json::from_value(json!({"expiresAt": null})).unwrap();
        assert_eq!(clear.expires_at, Some(None));
        clear.apply(&mut announcement, now);
        assert_eq!(announcement.expires_at, None);

        let set: AnnouncementUpdate =
            serde_json::from_value(json!({"expiresAt": 1_700_000_000_000i64})).unwrap();
        assert_eq!(
            set.expires_at.flatten().map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn new_announcement_requires_title() {
        let data = NewAnnouncement {
            title: "".into(),
            content: "x".into(),
            ..Default::default()
        };
        assert!(data.validate().is_err());
    }
}
