//! # Floor Control
//!
//! Who may speak in a PTT group. The floor is either free or held by one
//! member, and only server confirmations move it:
//!
//! | Signal | Meaning | Floor |
//! |--------|---------|-------|
//! | `unmute` | grab confirmed for `fromUserId` | `Held(fromUserId)` |
//! | `graback` | grab refused | unchanged |
//! | `mute` | release confirmed for `fromUserId` | `Free` |
//! | `freeack` | release refused | unchanged |
//!
//! Local grab and free requests only send frames.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rdispatch_signal_core::AckCode;

use crate::session::CallSession;
use crate::types::{ErrorInfo, MemberId, ResultCode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloorState {
    Free,
    Held(MemberId),
}

impl FloorState {
    pub fn of(session: &CallSession) -> FloorState {
        match &session.floor_holder {
            Some(holder) => FloorState::Held(holder.clone()),
            None => FloorState::Free,
        }
    }

    pub fn is_held_by(&self, member: &str) -> bool {
        matches!(self, FloorState::Held(holder) if holder == member)
    }
}

/// What a floor confirmation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloorOutcome {
    Granted { holder: MemberId },
    /// Confirmation repeated for the current holder
    Unchanged,
    /// `floor_freed` is false when someone else holds the floor
    Released { releaser: MemberId, floor_freed: bool },
}

/// Applies a confirmed grab (`unmute`) for `requester`.
pub fn confirm_grab(session: &mut CallSession, requester: &str) -> FloorOutcome {
    if FloorState::of(session).is_held_by(requester) {
        debug!(session_key = %session.session_key, requester, "duplicate grab confirmation");
        return FloorOutcome::Unchanged;
    }
    session.floor_holder = Some(requester.to_string());
    session.roster.grant_floor(requester);
    info!(session_key = %session.session_key, holder = requester, "floor granted");
    FloorOutcome::Granted { holder: requester.to_string() }
}

/// Applies a confirmed release (`mute`) by `releaser`.
pub fn confirm_free(session: &mut CallSession, releaser: &str) -> FloorOutcome {
    let floor_freed = match &session.floor_holder {
        None => true,
        Some(holder) => holder == releaser,
    };
    if floor_freed {
        session.floor_holder = None;
    }
    session.roster.update_mute(releaser, true);
    info!(session_key = %session.session_key, releaser, floor_freed, "floor released");
    FloorOutcome::Released { releaser: releaser.to_string(), floor_freed }
}

/// Error reported for a refused grab (`graback`).
pub fn grab_refused(code: &AckCode) -> ErrorInfo {
    refusal(code, ResultCode::GrabFailed)
}

/// Error reported for a refused release (`freeack`).
pub fn free_refused(code: &AckCode) -> ErrorInfo {
    refusal(code, ResultCode::FreeFailed)
}

fn refusal(code: &AckCode, fallback: ResultCode) -> ErrorInfo {
    match code {
        AckCode::Other(raw) if raw.is_empty() => fallback.into(),
        AckCode::Success => fallback.into(),
        code => ErrorInfo::from(code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Member;
    use crate::types::{CallType, MemberStatus};

    fn ptt_group() -> CallSession {
        CallSession::outgoing(CallType::Ptt, ("X", "Unit X"), "G1", "Patrol").with_members(vec![
            Member::new("X", "Unit X", MemberStatus::Joined),
            Member::new("Y", "Unit Y", MemberStatus::Joined),
        ])
    }

    #[test]
    fn test_grab_then_duplicate_is_noop() {
        let mut session = ptt_group();
        assert_eq!(confirm_grab(&mut session, "X"), FloorOutcome::Granted { holder: "X".into() });
        assert!(!session.roster.member("X").unwrap().muted);
        assert_eq!(confirm_grab(&mut session, "X"), FloorOutcome::Unchanged);
        assert_eq!(FloorState::of(&session), FloorState::Held("X".into()));
    }

    #[test]
    fn test_release_by_non_holder_keeps_floor() {
        let mut session = ptt_group();
        confirm_grab(&mut session, "X");
        let outcome = confirm_free(&mut session, "Y");
        assert_eq!(outcome, FloorOutcome::Released { releaser: "Y".into(), floor_freed: false });
        assert_eq!(FloorState::of(&session), FloorState::Held("X".into()));

        confirm_free(&mut session, "X");
        assert_eq!(FloorState::of(&session), FloorState::Free);
        assert!(session.roster.member("X").unwrap().muted);
    }

    #[test]
    fn test_refusal_prefers_server_code() {
        assert_eq!(grab_refused(&AckCode::GrabFailed).code, "100021");
        assert_eq!(grab_refused(&AckCode::Other(String::new())).code, "003");
        assert_eq!(free_refused(&AckCode::Success).code, "002");
    }
}
