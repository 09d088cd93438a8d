//! Announcements: lifecycle, pin capacity and expiry.
//!
//! Pin enforcement runs after the write that pinned an announcement, not
//! inside it. Between the two, readers may briefly see more than
//! [`MAX_PINNED_ANNOUNCEMENTS`] pinned items.

use super::{ensure_creator_or_admin, GroupService};
use crate::error::{ApiError, Result};
use crate::models::{fields, Announcement, AnnouncementUpdate, NewAnnouncement, UserProfile};
use crate::paths;
use chrono::{DateTime, Utc};
use fellowship_store::{generate_id, Batch, Direction, DocumentStore, Query};
use serde_json::json;
use std::sync::Arc;

/// Pinned announcements kept per group.
pub const MAX_PINNED_ANNOUNCEMENTS: usize = 3;

/// Page size when the caller gives no limit.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Group announcements.
#[derive(Clone)]
pub struct AnnouncementService {
    store: Arc<DocumentStore>,
    groups: GroupService,
}

impl AnnouncementService {
    pub fn new(store: Arc<DocumentStore>, groups: GroupService) -> Self {
        Self { store, groups }
    }

    /// Newest first. `start_after` is the id of the last announcement of
    /// the previous page; an unknown id restarts from the top.
    pub fn get_group_announcements(
        &self,
        user_id: &str,
        group_id: &str,
        limit: Option<usize>,
        start_after: Option<&str>,
    ) -> Result<Vec<Announcement>> {
        self.groups.get_group_by_id(user_id, group_id)?;

        let mut query = Query::new()
            .order_by(fields::CREATED_AT, Direction::Descending)
            .limit(limit.unwrap_or(DEFAULT_PAGE_SIZE));
        if let Some(cursor) = start_after {
            query = query.start_after(cursor);
        }

        Ok(self.store.query(&paths::announcements(group_id), &query)?)
    }

    pub fn get_announcement_by_id(
        &self,
        user_id: &str,
        group_id: &str,
        announcement_id: &str,
    ) -> Result<Announcement> {
        self.groups.get_group_by_id(user_id, group_id)?;
        self.store
            .get(&paths::announcement(group_id, announcement_id))?
            .ok_or_else(not_found)
    }

    /// Post an announcement. Any member may post.
    pub fn create_announcement(
        &self,
        user_id: &str,
        group_id: &str,
        data: NewAnnouncement,
    ) -> Result<Announcement> {
        self.groups.get_group_by_id(user_id, group_id)?;

        let author: UserProfile = self
            .store
            .get(&paths::user(user_id))?
            .ok_or_else(ApiError::user_not_found)?;

        let now = Utc::now();
        let announcement = Announcement {
            id: generate_id(),
            group_id: group_id.to_string(),
            title: data.title,
            content: data.content,
            is_pinned: data.is_pinned.unwrap_or(false),
            created_by: user_id.to_string(),
            author_name: author.display_name,
            created_at: now,
            updated_at: now,
            expires_at: data.expires_at,
        };

        self.store
            .set(&paths::announcement(group_id, &announcement.id), &announcement)?;
        tracing::info!(group_id, announcement_id = %announcement.id, pinned = announcement.is_pinned, "announcement created");

        if announcement.is_pinned {
            self.manage_pinned_announcements(group_id)?;
        }

        Ok(announcement)
    }

    /// Apply a partial update. Creator or group admin only.
    ///
    /// Pinning a previously unpinned announcement triggers pin enforcement,
    /// which may immediately unpin it again if it is older than the current
    /// pinned set; the returned value reflects that.
    pub fn update_announcement(
        &self,
        user_id: &str,
        group_id: &str,
        announcement_id: &str,
        update: AnnouncementUpdate,
    ) -> Result<Announcement> {
        let group = self.groups.get_group_by_id(user_id, group_id)?;
        let path = paths::announcement(group_id, announcement_id);
        let now = Utc::now();

        let (updated, newly_pinned) = self.store.run_transaction(|txn| -> Result<_> {
            let mut announcement: Announcement = txn.get(&path)?.ok_or_else(not_found)?;
            ensure_creator_or_admin(&group, &announcement.created_by, user_id)?;

            let was_pinned = announcement.is_pinned;
            update.apply(&mut announcement, now);
            txn.set(&path, &announcement)?;

            let newly_pinned = !was_pinned && announcement.is_pinned;
            Ok((announcement, newly_pinned))
        })?;

        if !newly_pinned {
            return Ok(updated);
        }

        self.manage_pinned_announcements(group_id)?;
        Ok(self.store.get(&path)?.unwrap_or(updated))
    }

    /// Delete an announcement. Creator or group admin only.
    pub fn delete_announcement(
        &self,
        user_id: &str,
        group_id: &str,
        announcement_id: &str,
    ) -> Result<()> {
        let group = self.groups.get_group_by_id(user_id, group_id)?;
        let path = paths::announcement(group_id, announcement_id);

        self.store.run_transaction(|txn| -> Result<()> {
            let announcement: Announcement = txn.get(&path)?.ok_or_else(not_found)?;
            ensure_creator_or_admin(&group, &announcement.created_by, user_id)?;
            txn.delete(&path)?;
            Ok(())
        })?;

        tracing::info!(group_id, announcement_id, "announcement deleted");
        Ok(())
    }

    /// Keep only the most recently created pinned announcements pinned.
    ///
    /// Returns how many were unpinned.
    pub fn manage_pinned_announcements(&self, group_id: &str) -> Result<usize> {
        let query = Query::new()
            .where_eq(fields::IS_PINNED, true)
            .order_by(fields::CREATED_AT, Direction::Descending);
        let pinned: Vec<Announcement> = self.store.query(&paths::announcements(group_id), &query)?;

        if pinned.len() <= MAX_PINNED_ANNOUNCEMENTS {
            return Ok(0);
        }

        let now = Utc::now().timestamp_millis();
        let mut unpinned = 0;
        for announcement in &pinned[MAX_PINNED_ANNOUNCEMENTS..] {
            let result = self.store.update(
                &paths::announcement(group_id, &announcement.id),
                json!({ (fields::IS_PINNED): false, (fields::UPDATED_AT): now }),
            );
            match result {
                Ok(()) => unpinned += 1,
                // Deleted since the query ran; nothing left to unpin.
                Err(fellowship_store::Error::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(group_id, unpinned, "unpinned announcements over capacity");
        Ok(unpinned)
    }

    /// Announcements whose `expiresAt` has passed.
    pub fn get_expired_announcements(&self, group_id: &str) -> Result<Vec<Announcement>> {
        self.expired_at(group_id, Utc::now())
    }

    /// Delete every expired announcement in one batch. Returns how many were
    /// deleted.
    pub fn cleanup_expired_announcements(&self, group_id: &str) -> Result<usize> {
        let expired = self.get_expired_announcements(group_id)?;
        if expired.is_empty() {
            return Ok(0);
        }

        let mut batch = Batch::new();
        for announcement in &expired {
            batch.delete(&paths::announcement(group_id, &announcement.id));
        }
        self.store.commit(batch)?;

        tracing::info!(group_id, count = expired.len(), "expired announcements removed");
        Ok(expired.len())
    }

    fn expired_at(&self, group_id: &str, now: DateTime<Utc>) -> Result<Vec<Announcement>> {
        let query = Query::new().where_lte(fields::EXPIRES_AT, now.timestamp_millis());
        Ok(self.store.query(&paths::announcements(group_id), &query)?)
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound(crate::error::messages::ANNOUNCEMENT_NOT_FOUND.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;
    use crate::node::AppState;
    use chrono::Duration;

    fn post(state: &AppState, uid: &str, gid: &str, title: &str, pinned: bool) -> Announcement {
        state
            .announcements
            .create_announcement(
                uid,
                gid,
                NewAnnouncement {
                    title: title.into(),
                    content: format!("{} body", title),
                    is_pinned: Some(pinned),
                    expires_at: None,
                },
            )
            .unwrap()
    }

    /// Write an announcement directly with a fixed creation time.
    fn seed(state: &AppState, gid: &str, id: &str, created_at: DateTime<Utc>, pinned: bool) {
        let announcement = Announcement {
            id: id.into(),
            group_id: gid.into(),
            title: id.into(),
            content: String::new(),
            is_pinned: pinned,
            created_by: "owner".into(),
            author_name: "Owner".into(),
            created_at,
            updated_at: created_at,
            expires_at: None,
        };
        state
            .store()
            .set(&paths::announcement(gid, id), &announcement)
            .unwrap();
    }

    fn pinned_ids(state: &AppState, gid: &str) -> Vec<String> {
        let all: Vec<Announcement> = state.store().list(&paths::announcements(gid)).unwrap();
        let mut ids: Vec<String> = all.into_iter().filter(|a| a.is_pinned).map(|a| a.id).collect();
        ids.sort();
        ids
    }

    fn setup() -> (tempfile::TempDir, AppState, String) {
        let (dir, state) = testing::state();
        testing::profile(&state, "owner", "Owner");
        testing::profile(&state, "member", "Member");
        testing::profile(&state, "outsider", "Outsider");
        let gid = testing::group(&state, "owner");
        state.groups.join_group("member", &gid).unwrap();
        (dir, state, gid)
    }

    #[test]
    fn create_captures_author_and_defaults_unpinned() {
        let (_dir, state, gid) = setup();
        let a = state
            .announcements
            .create_announcement(
                "member",
                &gid,
                NewAnnouncement {
                    title: "Coffee".into(),
                    content: "Bring mugs".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!a.is_pinned);
        assert_eq!(a.author_name, "Member");
        assert_eq!(a.group_id, gid);

        let fetched = state
            .announcements
            .get_announcement_by_id("owner", &gid, &a.id)
            .unwrap();
        assert_eq!(fetched, a);
    }

    #[test]
    fn outsider_cannot_post_or_read() {
        let (_dir, state, gid) = setup();
        let err = state
            .announcements
            .create_announcement(
                "outsider",
                &gid,
                NewAnnouncement {
                    title: "Hi".into(),
                    content: "x".into(),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, ApiError::not_group_member());
        assert_eq!(
            state
                .announcements
                .get_group_announcements("outsider", &gid, None, None)
                .unwrap_err(),
            ApiError::not_group_member()
        );
    }

    #[test]
    fn missing_announcement_is_not_found() {
        let (_dir, state, gid) = setup();
        assert_eq!(
            state
                .announcements
                .get_announcement_by_id("owner", &gid, "nope")
                .unwrap_err(),
            not_found()
        );
        assert_eq!(
            state
                .announcements
                .delete_announcement("owner", &gid, "nope")
                .unwrap_err(),
            not_found()
        );
    }

    #[test]
    fn four_pinned_keeps_three_newest() {
        let (_dir, state, gid) = setup();
        let base = Utc::now() - Duration::hours(4);
        for (i, id) in ["t1", "t2", "t3", "t4"].iter().enumerate() {
            seed(&state, &gid, id, base + Duration::minutes(i as i64), true);
        }

        let unpinned = state.announcements.manage_pinned_announcements(&gid).unwrap();
        assert_eq!(unpinned, 1);
        assert_eq!(pinned_ids(&state, &gid), vec!["t2", "t3", "t4"]);

        let t1 = state
            .announcements
            .get_announcement_by_id("owner", &gid, "t1")
            .unwrap();
        assert!(t1.updated_at > base);
    }

    #[test]
    fn enforcement_is_noop_under_capacity() {
        let (_dir, state, gid) = setup();
        let base = Utc::now() - Duration::hours(1);
        seed(&state, &gid, "a", base, true);
        seed(&state, &gid, "b", base + Duration::minutes(1), false);
        assert_eq!(state.announcements.manage_pinned_announcements(&gid).unwrap(), 0);
        assert_eq!(pinned_ids(&state, &gid), vec!["a"]);
    }

    #[test]
    fn creating_pinned_evicts_oldest() {
        let (_dir, state, gid) = setup();
        let base = Utc::now() - Duration::hours(1);
        for (i, id) in ["p1", "p2", "p3"].iter().enumerate() {
            seed(&state, &gid, id, base + Duration::minutes(i as i64), true);
        }

        let fresh = post(&state, "member", &gid, "Fresh", true);
        let mut expected = vec!["p2".to_string(), "p3".to_string(), fresh.id.clone()];
        expected.sort();
        assert_eq!(pinned_ids(&state, &gid), expected);
    }

    #[test]
    fn repinning_an_old_announcement_unpins_it_again() {
        let (_dir, state, gid) = setup();
        let base = Utc::now() - Duration::hours(1);
        seed(&state, &gid, "old", base, false);
        for (i, id) in ["p1", "p2", "p3"].iter().enumerate() {
            seed(&state, &gid, id, base + Duration::minutes(1 + i as i64), true);
        }

        let result = state
            .announcements
            .update_announcement(
                "owner",
                &gid,
                "old",
                AnnouncementUpdate {
                    is_pinned: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!result.is_pinned);
        assert_eq!(pinned_ids(&state, &gid), vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let (_dir, state, gid) = setup();
        let a = post(&state, "member", &gid, "Original", false);

        let updated = state
            .announcements
            .update_announcement(
                "member",
                &gid,
                &a.id,
                AnnouncementUpdate {
                    content: Some("Edited".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Original");
        assert_eq!(updated.content, "Edited");
        assert!(updated.updated_at >= a.updated_at);
        assert_eq!(updated.created_at, a.created_at);
    }

    #[test]
    fn only_creator_or_admin_may_modify() {
        let (_dir, state, gid) = setup();
        testing::profile(&state, "peer", "Peer");
        state.groups.join_group("peer", &gid).unwrap();
        let a = post(&state, "member", &gid, "Mine", false);

        let update = AnnouncementUpdate {
            title: Some("Hijacked".into()),
            ..Default::default()
        };
        assert_eq!(
            state
                .announcements
                .update_announcement("peer", &gid, &a.id, update.clone())
                .unwrap_err(),
            ApiError::forbidden()
        );
        assert_eq!(
            state
                .announcements
                .delete_announcement("peer", &gid, &a.id)
                .unwrap_err(),
            ApiError::forbidden()
        );

        state
            .announcements
            .update_announcement("owner", &gid, &a.id, update)
            .unwrap();
        state
            .announcements
            .delete_announcement("owner", &gid, &a.id)
            .unwrap();
        assert_eq!(
            state
                .announcements
                .get_announcement_by_id("member", &gid, &a.id)
                .unwrap_err(),
            not_found()
        );
    }

    #[test]
    fn cleanup_removes_only_expired() {
        let (_dir, state, gid) = setup();
        let now = Utc::now();
        let make = |title: &str, expires_at: Option<DateTime<Utc>>| {
            state
                .announcements
                .create_announcement(
                    "owner",
                    &gid,
                    NewAnnouncement {
                        title: title.into(),
                        content: "x".into(),
                        is_pinned: None,
                        expires_at,
                    },
                )
                .unwrap()
        };
        let gone = make("gone", Some(now - Duration::hours(1)));
        let also_gone = make("also gone", Some(now - Duration::days(3)));
        let future = make("future", Some(now + Duration::days(1)));
        let forever = make("forever", None);

        let mut expired: Vec<String> = state
            .announcements
            .get_expired_announcements(&gid)
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        expired.sort();
        let mut expected = vec![gone.id.clone(), also_gone.id.clone()];
        expected.sort();
        assert_eq!(expired, expected);

        assert_eq!(state.announcements.cleanup_expired_announcements(&gid).unwrap(), 2);
        assert_eq!(state.announcements.cleanup_expired_announcements(&gid).unwrap(), 0);

        let remaining: Vec<Announcement> =
            state.store().list(&paths::announcements(&gid)).unwrap();
        let mut ids: Vec<String> = remaining.into_iter().map(|a| a.id).collect();
        ids.sort();
        let mut kept = vec![future.id, forever.id];
        kept.sort();
        assert_eq!(ids, kept);
    }

    #[test]
    fn pagination_resumes_after_cursor() {
        let (_dir, state, gid) = setup();
        let base = Utc::now() - Duration::hours(1);
        for i in 0..5 {
            seed(&state, &gid, &format!("a{}", i), base + Duration::minutes(i), false);
        }

        let page = |cursor: Option<&str>| -> Vec<String> {
            state
                .announcements
                .get_group_announcements("member", &gid, Some(2), cursor)
                .unwrap()
                .into_iter()
                .map(|a| a.id)
                .collect()
        };

        assert_eq!(page(None), vec!["a4", "a3"]);
        assert_eq!(page(Some("a3")), vec!["a2", "a1"]);
        assert_eq!(page(Some("a1")), vec!["a0"]);
        assert_eq!(page(Some("missing")), vec!["a4", "a3"]);

        let all = state
            .announcements
            .get_group_announcements("member", &gid, None, None)
            .unwrap();
        assert_eq!(all.len(), 5);
    }
}
