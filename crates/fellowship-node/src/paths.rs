//! Store paths for every document kind.

pub const GROUPS: &str = "groups";

pub fn user(uid: &str) -> String {
    format!("users/{}", uid)
}

pub fn group(group_id: &str) -> String {
    format!("groups/{}", group_id)
}

pub fn members(group_id: &str) -> String {
    format!("groups/{}/members", group_id)
}

pub fn member(group_id: &str, uid: &str) -> String {
    format!("groups/{}/members/{}", group_id, uid)
}

pub fn announcements(group_id: &str) -> String {
    format!("groups/{}/announcements", group_id)
}

pub fn announcement(group_id: &str, announcement_id: &str) -> String {
    format!("groups/{}/announcements/{}", group_id, announcement_id)
}

pub fn events(group_id: &str) -> String {
    format!("groups/{}/events", group_id)
}

pub fn event(group_id: &str, event_id: &str) -> String {
    format!("groups/{}/events/{}", group_id, event_id)
}

pub fn meetings(group_id: &str) -> String {
    format!("groups/{}/meetings", group_id)
}

pub fn meeting(group_id: &str, meeting_id: &str) -> String {
    format!("groups/{}/meetings/{}", group_id, meeting_id)
}
