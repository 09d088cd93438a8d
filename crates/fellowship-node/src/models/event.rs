//! Event model - one-off group events (workshops, picnics, speaker nights).

use super::{require_optional_text, require_text, require_time};
use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// An event in `groups/{gid}/events/{eid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    /// Start time, "HH:MM" (UTC)
    pub time: String,
    /// Length in minutes
    pub duration: u32,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_link: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Start instant, or `None` if the stored time is malformed.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        let time = NaiveTime::parse_from_str(&self.time, "%H:%M").ok()?;
        Some(self.date.and_time(time))
    }
}

/// Payload for creating an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration: u32,
    pub location: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub online_link: Option<String>,
}

impl NewEvent {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("location", &self.location)?;
        require_time("time", &self.time)
    }

    pub fn into_event(
        self,
        id: String,
        group_id: &str,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Event {
        Event {
            id,
            group_id: group_id.to_string(),
            title: self.title,
            description: self.description,
            date: self.date,
            time: self.time,
            duration: self.duration,
            location: self.location,
            address: self.address,
            is_online: self.is_online,
            online_link: self.online_link,
            created_by: created_by.to_string(),
            attendees: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial event update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub duration: Option<u32>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub is_online: Option<bool>,
    pub online_link: Option<String>,
}

impl EventUpdate {
    pub fn validate(&self) -> Result<()> {
        require_optional_text("title", self.title.as_deref())?;
        require_optional_text("location", self.location.as_deref())?;
        if let Some(time) = &self.time {
            require_time("time", time)?;
        }
        Ok(())
    }

    pub fn apply(self, event: &mut Event, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            event.title = v;
        }
        if let Some(v) = self.description {
            event.description = v;
        }
        if let Some(v) = self.date {
            event.date = v;
        }
        if let Some(v) = self.time {
            event.time = v;
        }
        if let Some(v) = self.duration {
            event.duration = v;
        }
        if let Some(v) = self.location {
            event.location = v;
        }
        if let Some(v) = self.address {
            event.address = Some(v);
        }
        if let Some(v) = self.is_online {
            event.is_online = v;
        }
        if let Some(v) = self.online_link {
            event.online_link = Some(v);
        }
        event.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event() -> NewEvent {
        NewEvent {
            title: "Speaker night".into(),
            description: "Guest speaker".into(),
            date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
            time: "18:45".into(),
            duration: 90,
            location: "Hall".into(),
            address: None,
            is_online: false,
            online_link: None,
        }
    }

    #[test]
    fn start_combines_date_and_time() {
        let event = new_event().into_event("e1".into(), "g1", "u1", Utc::now());
        let start = event.starts_at().unwrap();
        assert_eq!(start.to_string(), "2030-05-01 18:45:00");
    }

    #[test]
    fn rejects_bad_time() {
        let mut data = new_event();
        data.time = "25:00".into();
        assert!(data.validate().is_err());
    }
}
