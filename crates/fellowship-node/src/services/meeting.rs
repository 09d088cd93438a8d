//! Regular group meetings.

use super::{ensure_creator_or_admin, GroupService};
use crate::error::{messages, ApiError, Result};
use crate::models::{add_unique, Meeting, MeetingUpdate, NewMeeting};
use crate::paths;
use chrono::Utc;
use fellowship_store::{generate_id, DocumentStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct MeetingService {
    store: Arc<DocumentStore>,
    groups: GroupService,
}

impl MeetingService {
    pub fn new(store: Arc<DocumentStore>, groups: GroupService) -> Self {
        Self { store, groups }
    }

    /// All meetings, Monday first, then by start time.
    pub fn get_group_meetings(&self, user_id: &str, group_id: &str) -> Result<Vec<Meeting>> {
        self.groups.get_group_by_id(user_id, group_id)?;
        let mut meetings: Vec<Meeting> = self.store.list(&paths::meetings(group_id))?;
        meetings.sort_by(|a, b| {
            a.weekday_index()
                .cmp(&b.weekday_index())
                .then_with(|| a.time.cmp(&b.time))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(meetings)
    }

    pub fn get_meeting_by_id(
        &self,
        user_id: &str,
        group_id: &str,
        meeting_id: &str,
    ) -> Result<Meeting> {
        self.groups.get_group_by_id(user_id, group_id)?;
        self.store
            .get(&paths::meeting(group_id, meeting_id))?
            .ok_or_else(not_found)
    }

    pub fn create_meeting(
        &self,
        user_id: &str,
        group_id: &str,
        data: NewMeeting,
    ) -> Result<Meeting> {
        self.groups.get_group_by_id(user_id, group_id)?;
        let meeting = data.into_meeting(generate_id(), group_id, user_id, Utc::now());
        self.store
            .set(&paths::meeting(group_id, &meeting.id), &meeting)?;
        tracing::info!(group_id, meeting_id = %meeting.id, day = %meeting.day, "meeting created");
        Ok(meeting)
    }

    pub fn update_meeting(
        &self,
        user_id: &str,
        group_id: &str,
        meeting_id: &str,
        update: MeetingUpdate,
    ) -> Result<Meeting> {
        let group = self.groups.get_group_by_id(user_id, group_id)?;
        let path = paths::meeting(group_id, meeting_id);
        self.store.run_transaction(|txn| -> Result<Meeting> {
            let mut meeting: Meeting = txn.get(&path)?.ok_or_else(not_found)?;
            ensure_creator_or_admin(&group, &meeting.created_by, user_id)?;
            update.apply(&mut meeting, Utc::now());
            txn.set(&path, &meeting)?;
            Ok(meeting)
        })
    }

    pub fn delete_meeting(&self, user_id: &str, group_id: &str, meeting_id: &str) -> Result<()> {
        let group = self.groups.get_group_by_id(user_id, group_id)?;
        let path = paths::meeting(group_id, meeting_id);
        self.store.run_transaction(|txn| -> Result<()> {
            let meeting: Meeting = txn.get(&path)?.ok_or_else(not_found)?;
            ensure_creator_or_admin(&group, &meeting.created_by, user_id)?;
            txn.delete(&path)?;
            Ok(())
        })?;
        tracing::info!(group_id, meeting_id, "meeting deleted");
        Ok(())
    }

    pub fn join_meeting(&self, user_id: &str, group_id: &str, meeting_id: &str) -> Result<Meeting> {
        self.groups.get_group_by_id(user_id, group_id)?;
        let path = paths::meeting(group_id, meeting_id);
        self.store.run_transaction(|txn| -> Result<Meeting> {
            let mut meeting: Meeting = txn.get(&path)?.ok_or_else(not_found)?;
            if add_unique(&mut meeting.attendees, user_id) {
                meeting.updated_at = Utc::now();
                txn.set(&path, &meeting)?;
            }
            Ok(meeting)
        })
    }

    pub fn leave_meeting(
        &self,
        user_id: &str,
        group_id: &str,
        meeting_id: &str,
    ) -> Result<Meeting> {
        self.groups.get_group_by_id(user_id, group_id)?;
        let path = paths::meeting(group_id, meeting_id);
        self.store.run_transaction(|txn| -> Result<Meeting> {
            let mut meeting: Meeting = txn.get(&path)?.ok_or_else(not_found)?;
            let before = meeting.attendees.len();
            meeting.attendees.retain(|id| id != user_id);
            if meeting.attendees.len() != before {
                meeting.updated_at = Utc::now();
                txn.set(&path, &meeting)?;
            }
            Ok(meeting)
        })
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound(messages::MEETING_NOT_FOUND.into())
}
