//! # Member Roster
//!
//! Members of a group session plus the diff produced by the last mutation.
//!
//! Every mutating operation first clears the pending diff, then applies its
//! change, then records the current state of each member it touched. Roster
//! events therefore carry only what the last operation changed, and the host
//! never has to compare full member lists.
//!
//! Join-state updates never bring back a member that has departed (Quit or
//! Rejected); only [`MemberRoster::reinvite`] does.

pub mod member;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use member::Member;

use crate::types::{MemberId, MemberStatus, VideoStats};

/// What a join-state update did to the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Known member, status changed
    Updated,
    /// New member added
    Added,
    /// Departed member or departing newcomer, nothing changed
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberRoster {
    members: IndexMap<MemberId, Member>,
    pending_diff: IndexMap<MemberId, Member>,
    /// New members start muted (PTT groups)
    mute_new_members: bool,
}

impl MemberRoster {
    pub fn new(mute_new_members: bool) -> Self {
        Self {
            members: IndexMap::new(),
            pending_diff: IndexMap::new(),
            mute_new_members,
        }
    }

    pub fn members(&self) -> &IndexMap<MemberId, Member> {
        &self.members
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> Vec<MemberId> {
        self.members.keys().cloned().collect()
    }

    /// Members touched by the last mutating operation, in their current state.
    pub fn pending_diff(&self) -> &IndexMap<MemberId, Member> {
        &self.pending_diff
    }

    pub fn diff_snapshot(&self) -> Vec<Member> {
        self.pending_diff.values().cloned().collect()
    }

    fn record(&mut self, id: &str) {
        if let Some(member) = self.members.get(id) {
            self.pending_diff.insert(id.to_string(), member.clone());
        }
    }

    /// Adds a member unless one with the same id exists. Either way the
    /// member is recorded in the diff.
    pub fn add_member(&mut self, member: Member) {
        self.pending_diff.clear();
        let id = member.id.clone();
        let muted = member.muted || self.mute_new_members;
        self.members.entry(id.clone()).or_insert_with(|| member.with_muted(muted));
        self.record(&id);
    }

    /// Adds several members as one operation.
    pub fn add_members(&mut self, members: Vec<Member>) {
        self.pending_diff.clear();
        for member in members {
            let id = member.id.clone();
            let muted = member.muted || self.mute_new_members;
            self.members.entry(id.clone()).or_insert_with(|| member.with_muted(muted));
            self.record(&id);
        }
    }

    /// Explicit host invitation: brings back departed members with the given
    /// status and adds unknown ones.
    pub fn reinvite(&mut self, members: Vec<Member>) {
        self.pending_diff.clear();
        for member in members {
            let id = member.id.clone();
            match self.members.get_mut(&id) {
                Some(existing) => {
                    if existing.status.has_departed() {
                        existing.status = member.status;
                    }
                    if !member.name.is_empty() {
                        existing.name = member.name;
                    }
                }
                None => {
                    let muted = member.muted || self.mute_new_members;
                    self.members.insert(id.clone(), member.with_muted(muted));
                }
            }
            self.record(&id);
        }
    }

    /// Add-or-update driven by a server join-state report.
    pub fn apply_join_state(&mut self, id: &str, name: &str, status: MemberStatus) -> JoinOutcome {
        self.pending_diff.clear();
        if let Some(existing) = self.members.get_mut(id) {
            if existing.status.has_departed() {
                debug!(member = id, status = ?existing.status, "ignoring join state for departed member");
                return JoinOutcome::Ignored;
            }
            existing.status = status;
            self.record(id);
            return JoinOutcome::Updated;
        }
        if status.has_departed() {
            return JoinOutcome::Ignored;
        }
        let member = Member::new(id, name, status).with_muted(self.mute_new_members);
        self.members.insert(id.to_string(), member);
        self.record(id);
        JoinOutcome::Added
    }

    /// Removes members; the diff holds their last state.
    pub fn remove_members(&mut self, ids: &[MemberId]) -> Vec<Member> {
        self.pending_diff.clear();
        let mut removed = Vec::new();
        for id in ids {
            if let Some(member) = self.members.shift_remove(id) {
                self.pending_diff.insert(id.clone(), member.clone());
                removed.push(member);
            }
        }
        removed
    }

    fn update<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Member),
    {
        self.pending_diff.clear();
        match self.members.get_mut(id) {
            Some(member) => {
                f(member);
                self.record(id);
                true
            }
            None => {
                debug!(member = id, "roster update for unknown member");
                false
            }
        }
    }

    pub fn update_status(&mut self, id: &str, status: MemberStatus) -> bool {
        self.update(id, |m| m.status = status)
    }

    pub fn update_mute(&mut self, id: &str, muted: bool) -> bool {
        self.update(id, |m| m.muted = muted)
    }

    pub fn update_speaking(&mut self, id: &str, speaking: bool) -> bool {
        self.update(id, |m| m.speaking = speaking)
    }

    pub fn update_video_stats(&mut self, id: &str, stats: VideoStats) -> bool {
        self.update(id, |m| m.video_stats = stats)
    }

    pub fn update_subscription_id(&mut self, id: &str, subscription_id: impl Into<String>) -> bool {
        let subscription_id = subscription_id.into();
        self.update(id, |m| m.subscription_id = Some(subscription_id))
    }

    /// Floor granted to `holder`: the holder is unmuted and every other
    /// member stops counting as speaking.
    pub fn grant_floor(&mut self, holder: &str) {
        self.pending_diff.clear();
        let mut touched = Vec::new();
        for (id, member) in self.members.iter_mut() {
            if id == holder {
                member.muted = false;
                touched.push(id.clone());
            } else if member.speaking {
                member.speaking = false;
                touched.push(id.clone());
            }
        }
        for id in touched {
            self.record(&id);
        }
    }

    /// Aligns the roster with a server member listing.
    ///
    /// Every id in `total` ends up Joined (if also in `online`) or Calling,
    /// including members previously marked Quit or Rejected. Members missing
    /// from `total` are left untouched.
    pub fn reconcile(&mut self, total: &[MemberId], online: &[MemberId]) {
        self.pending_diff.clear();
        for id in total {
            let status = if online.contains(id) { MemberStatus::Joined } else { MemberStatus::Calling };
            match self.members.get_mut(id) {
                Some(member) => member.status = status,
                None => {
                    let member = Member::new(id.clone(), "", status).with_muted(self.mute_new_members);
                    self.members.insert(id.clone(), member);
                }
            }
            self.record(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(list: &[&str]) -> Vec<MemberId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_roster_has_empty_diff() {
        let roster = MemberRoster::new(true);
        assert!(roster.pending_diff().is_empty());
        assert!(roster.is_empty());
    }

    #[test]
    fn test_add_member_is_idempotent() {
        let mut roster = MemberRoster::new(false);
        roster.add_member(Member::new("2001", "Unit 1", MemberStatus::Calling));
        roster.add_member(Member::new("2001", "Renamed", MemberStatus::Joined));

        assert_eq!(roster.len(), 1);
        let member = roster.member("2001").unwrap();
        assert_eq!(member.name, "Unit 1");
        assert_eq!(member.status, MemberStatus::Calling);
        assert_eq!(roster.pending_diff().len(), 1);
    }

    #[test]
    fn test_ptt_members_start_muted() {
        let mut roster = MemberRoster::new(true);
        roster.add_member(Member::new("2001", "Unit 1", MemberStatus::Joined));
        assert!(roster.member("2001").unwrap().muted);
    }

    #[test]
    fn test_diff_only_holds_last_touched_member() {
        let mut roster = MemberRoster::new(false);
        roster.add_members(vec![
            Member::new("2001", "A", MemberStatus::Calling),
            Member::new("2002", "B", MemberStatus::Calling),
        ]);
        assert_eq!(roster.pending_diff().len(), 2);

        assert!(roster.update_mute("2002", true));
        let diff: Vec<&str> = roster.pending_diff().keys().map(|k| k.as_str()).collect();
        assert_eq!(diff, vec!["2002"]);
        assert!(roster.pending_diff()["2002"].muted);
    }

    #[test]
    fn test_update_unknown_member_clears_diff() {
        let mut roster = MemberRoster::new(false);
        roster.add_member(Member::new("2001", "A", MemberStatus::Calling));
        assert!(!roster.update_status("9999", MemberStatus::Joined));
        assert!(roster.pending_diff().is_empty());
    }

    #[test]
    fn test_join_state_does_not_revive_departed_member() {
        let mut roster = MemberRoster::new(false);
        roster.add_member(Member::new("2001", "A", MemberStatus::Calling));
        roster.update_status("2001", MemberStatus::Rejected);

        assert_eq!(roster.apply_join_state("2001", "A", MemberStatus::Joined), JoinOutcome::Ignored);
        assert_eq!(roster.member("2001").unwrap().status, MemberStatus::Rejected);
        assert_eq!(roster.apply_join_state("2009", "Z", MemberStatus::Quit), JoinOutcome::Ignored);
        assert!(!roster.contains("2009"));
    }

    #[test]
    fn test_join_state_adds_and_updates() {
        let mut roster = MemberRoster::new(false);
        assert_eq!(roster.apply_join_state("2001", "A", MemberStatus::Joined), JoinOutcome::Added);
        assert_eq!(roster.apply_join_state("2001", "A", MemberStatus::Quit), JoinOutcome::Updated);
        assert_eq!(roster.pending_diff()["2001"].status, MemberStatus::Quit);
    }

    #[test]
    fn test_reinvite_revives_departed_member() {
        let mut roster = MemberRoster::new(false);
        roster.add_member(Member::new("2001", "A", MemberStatus::Joined));
        roster.update_status("2001", MemberStatus::Quit);

        roster.reinvite(vec![Member::new("2001", "", MemberStatus::Calling)]);
        let member = roster.member("2001").unwrap();
        assert_eq!(member.status, MemberStatus::Calling);
        assert_eq!(member.name, "A");
    }

    #[test]
    fn test_remove_members_records_last_state() {
        let mut roster = MemberRoster::new(false);
        roster.add_members(vec![
            Member::new("2001", "A", MemberStatus::Joined),
            Member::new("2002", "B", MemberStatus::Joined),
        ]);
        let removed = roster.remove_members(&ids(&["2002", "9999"]));
        assert_eq!(removed.len(), 1);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.pending_diff().keys().collect::<Vec<_>>(), vec!["2002"]);
    }

    #[test]
    fn test_reconcile_sets_joined_and_calling() {
        let mut roster = MemberRoster::new(false);
        roster.add_member(Member::new("D", "Dee", MemberStatus::Joined));
        roster.update_status("D", MemberStatus::Quit);

        roster.reconcile(&ids(&["A", "B", "C", "D"]), &ids(&["A", "B"]));

        assert_eq!(roster.member("A").unwrap().status, MemberStatus::Joined);
        assert_eq!(roster.member("B").unwrap().status, MemberStatus::Joined);
        assert_eq!(roster.member("C").unwrap().status, MemberStatus::Calling);
        // A departed member listed by the server is treated as still invited.
        assert_eq!(roster.member("D").unwrap().status, MemberStatus::Calling);
        assert_eq!(roster.pending_diff().len(), 4);
        assert!(roster.members().values().all(|m| !m.status.has_departed()));
    }

    #[test]
    fn test_grant_floor_touches_holder_and_speakers() {
        let mut roster = MemberRoster::new(true);
        roster.add_members(vec![
            Member::new("X", "X", MemberStatus::Joined),
            Member::new("Y", "Y", MemberStatus::Joined),
            Member::new("Z", "Z", MemberStatus::Joined),
        ]);
        roster.update_speaking("Y", true);

        roster.grant_floor("X");

        assert!(!roster.member("X").unwrap().muted);
        assert!(!roster.member("Y").unwrap().speaking);
        let touched: Vec<&str> = roster.pending_diff().keys().map(|k| k.as_str()).collect();
        assert_eq!(touched, vec!["X", "Y"]);
    }
}
