//! Services: the consistency rules behind every HTTP operation.
//!
//! Each service owns an `Arc<DocumentStore>` handed in by the node, checks
//! membership or admin rights against the group first, then reads and
//! writes, inside a store transaction whenever more than one document must
//! change together.

mod announcement;
mod event;
mod group;
mod meeting;
mod user;

pub use announcement::{AnnouncementService, DEFAULT_PAGE_SIZE, MAX_PINNED_ANNOUNCEMENTS};
pub use event::EventService;
pub use group::{upcoming_celebrations, GroupService, CELEBRATION_WINDOW_MONTHS};
pub use meeting::MeetingService;
pub use user::UserService;

use crate::error::{ApiError, Result};
use crate::models::GroupView;

/// Only the author of an item or a group admin may change or delete it.
fn ensure_creator_or_admin(group: &GroupView, created_by: &str, user_id: &str) -> Result<()> {
    if created_by != user_id && !group.is_admin {
        return Err(ApiError::forbidden());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::models::{NewGroup, NewProfile, UserProfile};
    use crate::node::AppState;
    use chrono::{NaiveDate, Utc};
    use fellowship_store::DocumentStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// A fresh store in a temp dir, kept alive by the returned guard.
    pub fn state() -> (TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DocumentStore::open(dir.path()).unwrap());
        (dir, AppState::new(store))
    }

    pub fn profile(state: &AppState, uid: &str, name: &str) -> UserProfile {
        state
            .users
            .create_profile(
                uid,
                NewProfile {
                    email: format!("{}@example.org", uid),
                    display_name: name.to_string(),
                    recovery_date: None,
                },
            )
            .unwrap()
    }

    pub fn profile_with_recovery(
        state: &AppState,
        uid: &str,
        name: &str,
        recovery: NaiveDate,
    ) -> UserProfile {
        state
            .users
            .create_profile(
                uid,
                NewProfile {
                    email: format!("{}@example.org", uid),
                    display_name: name.to_string(),
                    recovery_date: Some(recovery),
                },
            )
            .unwrap()
    }

    /// Create a group owned by `uid` (who must already have a profile).
    pub fn group(state: &AppState, uid: &str) -> String {
        state
            .groups
            .create_group(
                uid,
                NewGroup {
                    name: format!("Group of {}", uid),
                    ..Default::default()
                },
            )
            .unwrap()
            .group
            .id
    }

    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }
}
