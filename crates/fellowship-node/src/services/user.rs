//! User profiles.

use crate::error::{messages, ApiError, Result};
use crate::models::{NewProfile, ProfileUpdate, UserProfile};
use crate::paths;
use chrono::Utc;
use fellowship_store::DocumentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserService {
    store: Arc<DocumentStore>,
}

impl UserService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Create the caller's profile. Fails if one already exists.
    pub fn create_profile(&self, uid: &str, data: NewProfile) -> Result<UserProfile> {
        let path = paths::user(uid);
        let profile = self.store.run_transaction(|txn| -> Result<UserProfile> {
            if txn.get::<UserProfile>(&path)?.is_some() {
                return Err(ApiError::bad_request(messages::PROFILE_EXISTS));
            }
            let profile = data.into_profile(uid, Utc::now());
            txn.set(&path, &profile)?;
            Ok(profile)
        })?;

        tracing::info!(uid, "profile created");
        Ok(profile)
    }

    pub fn get_profile(&self, uid: &str) -> Result<UserProfile> {
        self.store
            .get(&paths::user(uid))?
            .ok_or_else(ApiError::user_not_found)
    }

    /// Partial update. Member records in groups keep the name they were
    /// created with.
    pub fn update_profile(&self, uid: &str, update: ProfileUpdate) -> Result<UserProfile> {
        let path = paths::user(uid);
        self.store.run_transaction(|txn| -> Result<UserProfile> {
            let mut profile: UserProfile =
                txn.get(&path)?.ok_or_else(ApiError::user_not_found)?;
            update.apply(&mut profile, Utc::now());
            txn.set(&path, &profile)?;
            Ok(profile)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing;
    use chrono::NaiveDate;

    #[test]
    fn create_then_get() {
        let (_dir, state) = testing::state();
        let created = testing::profile(&state, "u1", "Alex");
        assert!(created.home_groups.is_empty());
        assert_eq!(created.email, "u1@example.org");
        assert_eq!(state.users.get_profile("u1").unwrap(), created);
    }

    #[test]
    fn second_create_is_rejected() {
        let (_dir, state) = testing::state();
        testing::profile(&state, "u1", "Alex");
        let err = state
            .users
            .create_profile(
                "u1",
                NewProfile {
                    email: "other@example.org".into(),
                    display_name: "Other".into(),
                    recovery_date: None,
                },
            )
            .unwrap_err();
        assert_eq!(err, ApiError::bad_request(messages::PROFILE_EXISTS));
        assert_eq!(state.users.get_profile("u1").unwrap().display_name, "Alex");
    }

    #[test]
    fn missing_profile() {
        let (_dir, state) = testing::state();
        assert_eq!(state.users.get_profile("ghost").unwrap_err(), ApiError::user_not_found());
        assert_eq!(
            state
                .users
                .update_profile("ghost", ProfileUpdate::default())
                .unwrap_err(),
            ApiError::user_not_found()
        );
    }

    #[test]
    fn update_keeps_member_records() {
        let (_dir, state) = testing::state();
        let before = testing::profile(&state, "u1", "Alex");
        let gid = testing::group(&state, "u1");

        let date = NaiveDate::from_ymd_opt(2019, 3, 14).unwrap();
        let after = state
            .users
            .update_profile(
                "u1",
                ProfileUpdate {
                    display_name: Some("Alexandra".into()),
                    recovery_date: Some(date),
                },
            )
            .unwrap();
        assert_eq!(after.display_name, "Alexandra");
        assert_eq!(after.recovery_date, Some(date));
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.home_groups, vec![gid.clone()]);

        let members = state.groups.get_group_members("u1", &gid).unwrap();
        assert_eq!(members[0].display_name, "Alex");
    }
}
