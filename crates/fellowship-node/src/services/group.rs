//! Group lifecycle, membership and the admin-role invariant.

use crate::error::{ApiError, Result};
use crate::models::{
    add_unique, Celebration, Group, GroupUpdate, GroupView, Member, NewGroup, UserProfile,
    CREATOR_POSITION,
};
use crate::paths;
use chrono::{Datelike, Months, NaiveDate, Utc};
use fellowship_store::{generate_id, DocumentStore, Transaction};
use std::cmp::Ordering;
use std::sync::Arc;

/// How far ahead celebrations are reported.
pub const CELEBRATION_WINDOW_MONTHS: u32 = 3;

/// Group lifecycle and membership.
#[derive(Clone)]
pub struct GroupService {
    store: Arc<DocumentStore>,
}

impl GroupService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a group with `user_id` as its creator and only admin.
    ///
    /// The group, the creator's member record and the creator's
    /// `homeGroups` entry are written in one transaction. A missing profile
    /// aborts it before anything is written.
    pub fn create_group(&self, user_id: &str, data: NewGroup) -> Result<GroupView> {
        let group_id = generate_id();
        let now = Utc::now();

        let group = self.store.run_transaction(|txn| -> Result<Group> {
            let mut profile: UserProfile = txn
                .get(&paths::user(user_id))?
                .ok_or_else(ApiError::user_not_found)?;

            let group = data.into_group(group_id.clone(), user_id, now);
            let creator = Member {
                uid: user_id.to_string(),
                display_name: profile.display_name.clone(),
                recovery_date: profile.recovery_date,
                joined_at: now,
                position: Some(CREATOR_POSITION.to_string()),
                is_admin: true,
                updated_at: None,
            };

            add_unique(&mut profile.home_groups, &group_id);
            profile.updated_at = now;

            txn.set(&paths::group(&group_id), &group)?;
            txn.set(&paths::member(&group_id, user_id), &creator)?;
            txn.set(&paths::user(user_id), &profile)?;
            Ok(group)
        })?;

        tracing::info!(group_id = %group.id, user_id, "group created");
        Ok(GroupView::new(group, true))
    }

    /// Fetch a group the caller belongs to, annotated with `is_admin`.
    pub fn get_group_by_id(&self, user_id: &str, group_id: &str) -> Result<GroupView> {
        let group = self.load(group_id)?;
        if !self.is_member(&group, user_id)? {
            return Err(ApiError::not_group_member());
        }
        Ok(GroupView::for_user(group, user_id))
    }

    /// Apply a partial update. Admins only.
    pub fn update_group(
        &self,
        user_id: &str,
        group_id: &str,
        update: GroupUpdate,
    ) -> Result<GroupView> {
        let now = Utc::now();
        let group = self.store.run_transaction(|txn| -> Result<Group> {
            let mut group = load_in(txn, group_id)?;
            if !group.is_admin(user_id) {
                return Err(ApiError::not_group_admin());
            }
            update.apply(&mut group, now);
            txn.set(&paths::group(group_id), &group)?;
            Ok(group)
        })?;

        Ok(GroupView::new(group, true))
    }

    /// Delete a group and everything beneath it. Admins only.
    ///
    /// Each member's `homeGroups` is cleaned up best-effort: a member whose
    /// profile is missing or unreadable is skipped with a warning.
    pub fn delete_group(&self, user_id: &str, group_id: &str) -> Result<()> {
        let now = Utc::now();
        self.store.run_transaction(|txn| -> Result<()> {
            let group = load_in(txn, group_id)?;
            if !group.is_admin(user_id) {
                return Err(ApiError::not_group_admin());
            }

            let members: Vec<Member> = txn.list(&paths::members(group_id))?;
            for member in &members {
                match txn.get::<UserProfile>(&paths::user(&member.uid)) {
                    Ok(Some(mut profile)) => {
                        profile.home_groups.retain(|id| id != group_id);
                        profile.updated_at = now;
                        txn.set(&paths::user(&member.uid), &profile)?;
                    }
                    Ok(None) => {
                        tracing::warn!(group_id, member = %member.uid, "member has no profile, skipping");
                    }
                    Err(e) => {
                        tracing::warn!(group_id, member = %member.uid, error = %e, "could not read member profile, skipping");
                    }
                }
            }

            txn.delete_tree(&paths::group(group_id))?;
            Ok(())
        })?;

        tracing::info!(group_id, user_id, "group deleted");
        Ok(())
    }

    /// Members sorted admins first, then by position, then by name.
    pub fn get_group_members(&self, user_id: &str, group_id: &str) -> Result<Vec<Member>> {
        self.get_group_by_id(user_id, group_id)?;
        let mut members: Vec<Member> = self.store.list(&paths::members(group_id))?;
        members.sort_by(member_order);
        Ok(members)
    }

    /// Join a group as a regular member. Joining twice is a no-op.
    pub fn join_group(&self, user_id: &str, group_id: &str) -> Result<Member> {
        self.add_membership(None, user_id, group_id)
    }

    /// Add `member_id` to the group on an admin's behalf.
    pub fn add_member(&self, admin_id: &str, group_id: &str, member_id: &str) -> Result<Member> {
        self.add_membership(Some(admin_id), member_id, group_id)
    }

    /// Leave a group. The last admin cannot leave.
    pub fn leave_group(&self, user_id: &str, group_id: &str) -> Result<()> {
        self.remove_membership(None, user_id, group_id)
    }

    /// Remove `member_id` from the group. Admins only; the last admin
    /// cannot be removed.
    pub fn remove_member(&self, admin_id: &str, group_id: &str, member_id: &str) -> Result<()> {
        self.remove_membership(Some(admin_id), member_id, group_id)
    }

    /// Grant or revoke admin status and optionally change the position.
    ///
    /// The member record and the group's `admins` change together. Revoking
    /// the last admin fails with BadRequest and changes nothing.
    pub fn update_member_role(
        &self,
        admin_id: &str,
        group_id: &str,
        member_id: &str,
        is_admin: bool,
        position: Option<String>,
    ) -> Result<Member> {
        let now = Utc::now();
        let member = self.store.run_transaction(|txn| -> Result<Member> {
            let mut group = load_in(txn, group_id)?;
            if !group.is_admin(admin_id) {
                return Err(ApiError::not_group_admin());
            }

            let member_path = paths::member(group_id, member_id);
            let mut member: Member = txn
                .get(&member_path)?
                .ok_or_else(ApiError::user_not_in_group)?;

            if is_admin {
                add_unique(&mut group.admins, member_id);
            } else if group.is_admin(member_id) {
                if group.admins.len() <= 1 {
                    return Err(ApiError::last_admin());
                }
                group.admins.retain(|id| id != member_id);
            }

            member.is_admin = is_admin;
            if position.is_some() {
                member.position = position;
            }
            member.updated_at = Some(now);
            group.updated_at = now;

            txn.set(&member_path, &member)?;
            txn.set(&paths::group(group_id), &group)?;
            Ok(member)
        })?;

        tracing::info!(group_id, member_id, is_admin, "member role updated");
        Ok(member)
    }

    /// Sobriety anniversaries in the next three months.
    pub fn get_group_celebrations(&self, user_id: &str, group_id: &str) -> Result<Vec<Celebration>> {
        let members = self.get_group_members(user_id, group_id)?;
        Ok(upcoming_celebrations(&members, Utc::now().date_naive()))
    }

    /// Every group listed in the user's `homeGroups`.
    pub fn get_user_groups(&self, user_id: &str) -> Result<Vec<GroupView>> {
        let profile: UserProfile = self
            .store
            .get(&paths::user(user_id))?
            .ok_or_else(ApiError::user_not_found)?;

        let mut groups = Vec::with_capacity(profile.home_groups.len());
        for group_id in &profile.home_groups {
            match self.store.get::<Group>(&paths::group(group_id))? {
                Some(group) => groups.push(GroupView::for_user(group, user_id)),
                None => tracing::debug!(user_id, group_id = %group_id, "dangling home group"),
            }
        }
        Ok(groups)
    }

    /// Every group in the store, for operator tooling.
    pub fn list_all_groups(&self) -> Result<Vec<Group>> {
        Ok(self.store.list(paths::GROUPS)?)
    }

    // --- Internals ---

    fn load(&self, group_id: &str) -> Result<Group> {
        self.store
            .get(&paths::group(group_id))?
            .ok_or_else(ApiError::group_not_found)
    }

    fn is_member(&self, group: &Group, user_id: &str) -> Result<bool> {
        if group.is_admin(user_id) {
            return Ok(true);
        }
        Ok(self.store.exists(&paths::member(&group.id, user_id))?)
    }

    fn add_membership(
        &self,
        acting_admin: Option<&str>,
        user_id: &str,
        group_id: &str,
    ) -> Result<Member> {
        let now = Utc::now();
        self.store.run_transaction(|txn| -> Result<Member> {
            let mut group = load_in(txn, group_id)?;
            if let Some(admin_id) = acting_admin {
                if !group.is_admin(admin_id) {
                    return Err(ApiError::not_group_admin());
                }
            }

            let member_path = paths::member(group_id, user_id);
            if let Some(existing) = txn.get::<Member>(&member_path)? {
                return Ok(existing);
            }

            let mut profile: UserProfile = txn
                .get(&paths::user(user_id))?
                .ok_or_else(ApiError::user_not_found)?;

            let member = Member {
                uid: user_id.to_string(),
                display_name: profile.display_name.clone(),
                recovery_date: profile.recovery_date,
                joined_at: now,
                position: None,
                is_admin: group.is_admin(user_id),
                updated_at: None,
            };

            group.member_count += 1;
            group.updated_at = now;
            add_unique(&mut profile.home_groups, group_id);
            profile.updated_at = now;

            txn.set(&member_path, &member)?;
            txn.set(&paths::group(group_id), &group)?;
            txn.set(&paths::user(user_id), &profile)?;

            tracing::info!(group_id, user_id, "member joined");
            Ok(member)
        })
    }

    fn remove_membership(
        &self,
        acting_admin: Option<&str>,
        user_id: &str,
        group_id: &str,
    ) -> Result<()> {
        let now = Utc::now();
        self.store.run_transaction(|txn| -> Result<()> {
            let mut group = load_in(txn, group_id)?;
            if let Some(admin_id) = acting_admin {
                if !group.is_admin(admin_id) {
                    return Err(ApiError::not_group_admin());
                }
            }

            let member_path = paths::member(group_id, user_id);
            let has_record = txn.get::<Member>(&member_path)?.is_some();
            if !has_record && !group.is_admin(user_id) {
                return Err(ApiError::user_not_in_group());
            }

            if group.is_admin(user_id) {
                if group.admins.len() <= 1 {
                    return Err(ApiError::last_admin());
                }
                group.admins.retain(|id| id != user_id);
            }

            if has_record {
                txn.delete(&member_path)?;
                group.member_count = group.member_count.saturating_sub(1);
            }
            group.updated_at = now;
            txn.set(&paths::group(group_id), &group)?;

            let user_path = paths::user(user_id);
            match txn.get::<UserProfile>(&user_path)? {
                Some(mut profile) => {
                    profile.home_groups.retain(|id| id != group_id);
                    profile.updated_at = now;
                    txn.set(&user_path, &profile)?;
                }
                None => tracing::warn!(group_id, user_id, "departing member has no profile"),
            }

            tracing::info!(group_id, user_id, "member left");
            Ok(())
        })
    }
}

fn load_in(txn: &Transaction<'_>, group_id: &str) -> Result<Group> {
    txn.get(&paths::group(group_id))?
        .ok_or_else(ApiError::group_not_found)
}

fn member_order(a: &Member, b: &Member) -> Ordering {
    b.is_admin
        .cmp(&a.is_admin)
        .then_with(|| match (&a.position, &b.position) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        })
}

/// Anniversary of `date` in `year`. Feb 29 falls on Feb 28 in common years.
fn anniversary_in(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
}

/// Anniversaries falling between `today` and three months later, inclusive,
/// sorted by date. A recovery date that has not yet come round once is
/// reported with `years == 0`.
pub fn upcoming_celebrations(members: &[Member], today: NaiveDate) -> Vec<Celebration> {
    let window_end = today
        .checked_add_months(Months::new(CELEBRATION_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MAX);

    let mut celebrations: Vec<Celebration> = members
        .iter()
        .filter_map(|member| {
            let recovery = member.recovery_date?;
            let mut next = anniversary_in(recovery, today.year())?;
            if next < today {
                next = anniversary_in(recovery, today.year() + 1)?;
            }
            let years = next.year() - recovery.year();
            if next > window_end {
                return None;
            }
            Some(Celebration {
                id: format!("celebration-{}", member.uid),
                member_id: member.uid.clone(),
                member_name: member.display_name.clone(),
                years,
                date: next,
            })
        })
        .collect();

    celebrations.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.member_name.cmp(&b.member_name)));
    celebrations
}
