//! Session key derivation.
//!
//! A session is filed under one of three key shapes:
//!
//! | Session | Key |
//! |---------|-----|
//! | video monitoring room | configured monitor room id |
//! | outgoing group call, not yet acknowledged | `<call type>@<from>` (e.g. `ptt@1001`) |
//! | outgoing single-party call, not yet acknowledged | `<from>@<to>` |
//! | everything else | server room id |
//!
//! The first two shapes exist only until the server assigns a room id, at
//! which point the store migrates the session once.

use crate::session::CallSession;
use crate::types::{CallState, CallType, Direction, SessionKey};

pub fn derive_session_key(session: &CallSession, monitor_room_id: &str) -> SessionKey {
    if session.call_type == CallType::VideoMonitor {
        return SessionKey::new(monitor_room_id);
    }

    let awaiting_room = session.direction == Direction::Outgoing
        && matches!(session.state, CallState::Idle | CallState::Ring);

    match session.room_id.as_deref() {
        Some(room_id) if !awaiting_room => SessionKey::new(room_id),
        _ => ringing_key(session.call_type, &session.from_id, &session.to_id),
    }
}

/// Key of an outgoing call the server has not yet acknowledged.
pub fn ringing_key(call_type: CallType, from_id: &str, to_id: &str) -> SessionKey {
    if call_type.is_group() {
        SessionKey::new(format!("{}@{}", call_type.as_str(), from_id))
    } else {
        SessionKey::new(format!("{}@{}", from_id, to_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITOR: &str = "999999101100";

    fn ringing(call_type: CallType) -> CallSession {
        let mut session = CallSession::outgoing(call_type, ("1001", "Dispatcher"), "2002", "Unit 2");
        session.state = CallState::Ring;
        session
    }

    #[test]
    fn test_single_party_ringing_key() {
        assert_eq!(derive_session_key(&ringing(CallType::Voice), MONITOR).as_str(), "1001@2002");
        assert_eq!(derive_session_key(&ringing(CallType::ForceInsert), MONITOR).as_str(), "1001@2002");
    }

    #[test]
    fn test_group_ringing_key_uses_call_type() {
        assert_eq!(derive_session_key(&ringing(CallType::Ptt), MONITOR).as_str(), "ptt@1001");
        assert_eq!(
            derive_session_key(&ringing(CallType::VideoConference), MONITOR).as_str(),
            "video_conference@1001"
        );
    }

    #[test]
    fn test_pre_assigned_ptt_room_still_uses_ringing_key() {
        let session = ringing(CallType::Ptt).with_room_id("G1");
        assert_eq!(derive_session_key(&session, MONITOR).as_str(), "ptt@1001");
    }

    #[test]
    fn test_room_id_after_acknowledgement() {
        let mut session = ringing(CallType::Voice).with_room_id("R1");
        session.state = CallState::WaitRingBack;
        assert_eq!(derive_session_key(&session, MONITOR).as_str(), "R1");
    }

    #[test]
    fn test_incoming_uses_room_id() {
        let mut session = CallSession::incoming(CallType::Voice, "R5", ("2002", "Unit 2"), ("1001", "Dispatcher"));
        session.state = CallState::Ring;
        assert_eq!(derive_session_key(&session, MONITOR).as_str(), "R5");
    }

    #[test]
    fn test_monitor_room_key() {
        let session = CallSession::outgoing(CallType::VideoMonitor, ("1001", "Dispatcher"), "", "");
        assert_eq!(derive_session_key(&session, MONITOR).as_str(), MONITOR);
    }
}
