//! Meeting model - a group's regular (usually weekly) meetings.

use super::{require_optional_text, require_text, require_time, require_weekday};
use crate::error::Result;
use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// A meeting in `groups/{gid}/meetings/{mid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub group_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Day of the week, e.g. "Wednesday"
    pub day: String,
    /// Start time, "HH:MM"
    pub time: String,
    pub duration: u32,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// e.g. "Big Book Study", "Speaker"
    pub format: String,
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_link: Option<String>,
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_pattern: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Meeting {
    /// Day index with Monday as 0; unknown days sort last.
    pub fn weekday_index(&self) -> u32 {
        self.day
            .parse::<Weekday>()
            .map(|d| d.num_days_from_monday())
            .unwrap_or(u32::MAX)
    }
}

/// Payload for creating a meeting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeeting {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub day: String,
    pub time: String,
    pub duration: u32,
    pub location: String,
    #[serde(default)]
    pub address: Option<String>,
    pub format: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub online_link: Option<String>,
    #[serde(default = "default_recurring")]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_pattern: Option<String>,
}

fn default_recurring() -> bool {
    true
}

impl NewMeeting {
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("location", &self.location)?;
        require_text("format", &self.format)?;
        require_weekday("day", &self.day)?;
        require_time("time", &self.time)
    }

    pub fn into_meeting(
        self,
        id: String,
        group_id: &str,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Meeting {
        Meeting {
            id,
            group_id: group_id.to_string(),
            name: self.name,
            description: self.description,
            day: self.day,
            time: self.time,
            duration: self.duration,
            location: self.location,
            address: self.address,
            format: self.format,
            is_online: self.is_online,
            online_link: self.online_link,
            is_recurring: self.is_recurring,
            recurrence_pattern: self.recurrence_pattern,
            created_by: created_by.to_string(),
            attendees: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial meeting update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub duration: Option<u32>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub format: Option<String>,
    pub is_online: Option<bool>,
    pub online_link: Option<String>,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<String>,
}

impl MeetingUpdate {
    pub fn validate(&self) -> Result<()> {
        require_optional_text("name", self.name.as_deref())?;
        require_optional_text("location", self.location.as_deref())?;
        require_optional_text("format", self.format.as_deref())?;
        if let Some(day) = &self.day {
            require_weekday("day", day)?;
        }
        if let Some(time) = &self.time {
            require_time("time", time)?;
        }
        Ok(())
    }

    pub fn apply(self, meeting: &mut Meeting, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            meeting.name = v;
        }
        if let Some(v) = self.description {
            meeting.description = Some(v);
        }
        if let Some(v) = self.day {
            meeting.day = v;
        }
        if let Some(v) = self.time {
            meeting.time = v;
        }
        if let Some(v) = self.duration {
            meeting.duration = v;
        }
        if let Some(v) = self.location {
            meeting.location = v;
        }
        if let Some(v) = self.address {
            meeting.address = Some(v);
        }
        if let Some(v) = self.format {
            meeting.format = v;
        }
        if let Some(v) = self.is_online {
            meeting.is_online = v;
        }
        if let Some(v) = self.online_link {
            meeting.online_link = Some(v);
        }
        if let Some(v) = self.is_recurring {
            meeting.is_recurring = v;
        }
        if let Some(v) = self.recurrence_pattern {
            meeting.recurrence_pattern = Some(v);
        }
        meeting.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meeting(day: &str) -> Meeting {
        let data: NewMeeting = serde_json::from_value(json!({
            "name": "Step study",
            "day": day,
            "time": "19:00",
            "duration": 60,
            "location": "Basement",
            "format": "Step Study",
        }))
        .unwrap();
        data.into_meeting("m1".into(), "g1", "u1", Utc::now())
    }

    #[test]
    fn recurring_by_default() {
        let m = meeting("Monday");
        assert!(m.is_recurring);
        assert!(m.attendees.is_empty());
    }

    #[test]
    fn weekday_order() {
        assert_eq!(meeting("Monday").weekday_index(), 0);
        assert_eq!(meeting("Sunday").weekday_index(), 6);
        assert_eq!(meeting("Caturday").weekday_index(), u32::MAX);
    }

    #[test]
    fn update_rejects_unknown_day() {
        let update = MeetingUpdate {
            day: Some("Funday".into()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
