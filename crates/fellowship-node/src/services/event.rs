//! One-off group events and their attendance lists.

use super::{ensure_creator_or_admin, GroupService};
use crate::error::{messages, ApiError, Result};
use crate::models::{add_unique, Event, EventUpdate, NewEvent};
use crate::paths;
use chrono::{NaiveDateTime, Utc};
use fellowship_store::{generate_id, DocumentStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct EventService {
    store: Arc<DocumentStore>,
    groups: GroupService,
}

impl EventService {
    pub fn new(store: Arc<DocumentStore>, groups: GroupService) -> Self {
        Self { store, groups }
    }

    /// Events that have not started yet, soonest first.
    pub fn get_group_events(&self, user_id: &str, group_id: &str) -> Result<Vec<Event>> {
        self.groups.get_group_by_id(user_id, group_id)?;
        let events: Vec<Event> = self.store.list(&paths::events(group_id))?;
        Ok(upcoming(events, Utc::now().naive_utc()))
    }

    pub fn get_event_by_id(&self, user_id: &str, group_id: &str, event_id: &str) -> Result<Event> {
        self.groups.get_group_by_id(user_id, group_id)?;
        self.store
            .get(&paths::event(group_id, event_id))?
            .ok_or_else(not_found)
    }

    pub fn create_event(&self, user_id: &str, group_id: &str, data: NewEvent) -> Result<Event> {
        self.groups.get_group_by_id(user_id, group_id)?;
        let event = data.into_event(generate_id(), group_id, user_id, Utc::now());
        self.store.set(&paths::event(group_id, &event.id), &event)?;
        tracing::info!(group_id, event_id = %event.id, "event created");
        Ok(event)
    }

    /// Creator or group admin only.
    pub fn update_event(
        &self,
        user_id: &str,
        group_id: &str,
        event_id: &str,
        update: EventUpdate,
    ) -> Result<Event> {
        let group = self.groups.get_group_by_id(user_id, group_id)?;
        let path = paths::event(group_id, event_id);
        self.store.run_transaction(|txn| -> Result<Event> {
            let mut event: Event = txn.get(&path)?.ok_or_else(not_found)?;
            ensure_creator_or_admin(&group, &event.created_by, user_id)?;
            update.apply(&mut event, Utc::now());
            txn.set(&path, &event)?;
            Ok(event)
        })
    }

    /// Creator or group admin only.
    pub fn delete_event(&self, user_id: &str, group_id: &str, event_id: &str) -> Result<()> {
        let group = self.groups.get_group_by_id(user_id, group_id)?;
        let path = paths::event(group_id, event_id);
        self.store.run_transaction(|txn| -> Result<()> {
            let event: Event = txn.get(&path)?.ok_or_else(not_found)?;
            ensure_creator_or_admin(&group, &event.created_by, user_id)?;
            txn.delete(&path)?;
            Ok(())
        })?;
        tracing::info!(group_id, event_id, "event deleted");
        Ok(())
    }

    pub fn join_event(&self, user_id: &str, group_id: &str, event_id: &str) -> Result<Event> {
        self.set_attendance(user_id, group_id, event_id, true)
    }

    pub fn leave_event(&self, user_id: &str, group_id: &str, event_id: &str) -> Result<Event> {
        self.set_attendance(user_id, group_id, event_id, false)
    }

    fn set_attendance(
        &self,
        user_id: &str,
        group_id: &str,
        event_id: &str,
        attending: bool,
    ) -> Result<Event> {
        self.groups.get_group_by_id(user_id, group_id)?;
        let path = paths::event(group_id, event_id);
        self.store.run_transaction(|txn| -> Result<Event> {
            let mut event: Event = txn.get(&path)?.ok_or_else(not_found)?;
            let changed = if attending {
                add_unique(&mut event.attendees, user_id)
            } else {
                let before = event.attendees.len();
                event.attendees.retain(|id| id != user_id);
                event.attendees.len() != before
            };
            if changed {
                event.updated_at = Utc::now();
                txn.set(&path, &event)?;
            }
            Ok(event)
        })
    }
}

fn upcoming(events: Vec<Event>, now: NaiveDateTime) -> Vec<Event> {
    let mut upcoming: Vec<(NaiveDateTime, Event)> = events
        .into_iter()
        .filter_map(|e| e.starts_at().map(|start| (start, e)))
        .filter(|(start, _)| *start >= now)
        .collect();
    upcoming.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
    upcoming.into_iter().map(|(_, e)| e).collect()
}

fn not_found() -> ApiError {
    ApiError::NotFound(messages::EVENT_NOT_FOUND.into())
}
