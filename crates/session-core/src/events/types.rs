use serde::{Deserialize, Serialize};
use serde_json::Value;

use rdispatch_signal_core::OnlineState;

use crate::roster::Member;
use crate::session::CallSession;
use crate::types::{CallOperation, ErrorInfo, MemberId, SessionKey, VideoStats};

/// Event categories a host can subscribe to, one callback each
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventCategory {
    Connected,
    Disconnected,
    CallArrived,
    StateChanged,
    RosterUpdated,
    VideoStats,
    CallOperation,
    TerminalStatus,
    RoomIdAssigned,
    GroupActivity,
    CustomMessage,
    ErrorOccurred,
}

/// Notification delivered to the host.
///
/// Session payloads are snapshots taken when the event was raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Signaling connection opened
    Connected,
    /// Signaling connection closed or failed
    Disconnected { reason: Option<String> },
    /// Incoming call, conference or group offered
    CallArrived(CallSession),
    /// Session changed state; terminal states carry `last_error`
    StateChanged(CallSession),
    /// Members touched by the last roster operation
    RosterUpdated {
        session_key: SessionKey,
        diff: Vec<Member>,
        operation: CallOperation,
    },
    /// Inbound video figures of a call or of one member
    VideoStats {
        session_key: SessionKey,
        member_id: Option<MemberId>,
        stats: VideoStats,
    },
    /// Outcome of a call or group operation
    CallOperation {
        session_key: SessionKey,
        operation: CallOperation,
        result: Option<ErrorInfo>,
    },
    /// A terminal went on- or offline
    TerminalStatus { user_id: String, state: OnlineState },
    /// The server assigned a room id to an outgoing call
    RoomIdAssigned(CallSession),
    /// A group had activity
    GroupActivity { room_id: String },
    /// Free-form message from another user, verbatim
    CustomMessage { content: Value },
    ErrorOccurred { message: String },
}

impl Event {
    pub fn category(&self) -> EventCategory {
        match self {
            Event::Connected => EventCategory::Connected,
            Event::Disconnected { .. } => EventCategory::Disconnected,
            Event::CallArrived(_) => EventCategory::CallArrived,
            Event::StateChanged(_) => EventCategory::StateChanged,
            Event::RosterUpdated { .. } => EventCategory::RosterUpdated,
            Event::VideoStats { .. } => EventCategory::VideoStats,
            Event::CallOperation { .. } => EventCategory::CallOperation,
            Event::TerminalStatus { .. } => EventCategory::TerminalStatus,
            Event::RoomIdAssigned(_) => EventCategory::RoomIdAssigned,
            Event::GroupActivity { .. } => EventCategory::GroupActivity,
            Event::CustomMessage { .. } => EventCategory::CustomMessage,
            Event::ErrorOccurred { .. } => EventCategory::ErrorOccurred,
        }
    }

    /// The session this event is about, if any
    pub fn session_key(&self) -> Option<&SessionKey> {
        match self {
            Event::CallArrived(s) | Event::StateChanged(s) | Event::RoomIdAssigned(s) => Some(&s.session_key),
            Event::RosterUpdated { session_key, .. }
            | Event::VideoStats { session_key, .. }
            | Event::CallOperation { session_key, .. } => Some(session_key),
            _ => None,
        }
    }
}
