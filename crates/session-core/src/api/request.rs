//! Host-side request types

use serde::{Deserialize, Serialize};

use crate::roster::Member;
use crate::types::{CallType, MemberId, MemberStatus};

/// A user the host wants in a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberTarget {
    pub id: MemberId,
    pub name: String,
}

impl MemberTarget {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }

    pub(crate) fn calling(&self) -> Member {
        Member::new(self.id.as_str(), self.name.as_str(), MemberStatus::Calling)
    }
}

/// Parameters of an outgoing call.
///
/// ```rust
/// use rdispatch_session_core::{CallRequest, CallType, MemberTarget};
///
/// let request = CallRequest::new(CallType::VoiceConference, "", "Morning briefing")
///     .with_members(vec![MemberTarget::new("2002", "Unit 2"), MemberTarget::new("2003", "Unit 3")])
///     .with_conference_record(true);
/// assert_eq!(request.member_ids(), vec!["2002", "2003"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub call_type: CallType,
    /// Callee, or the group for PTT calls
    pub to_id: String,
    pub to_name: String,
    /// Invitees of a conference, temporary PTT or broadcast
    pub members: Vec<MemberTarget>,
    /// Existing room of a fixed PTT group
    pub room_id: Option<String>,
    pub conference_record: bool,
}

impl CallRequest {
    pub fn new(call_type: CallType, to_id: impl Into<String>, to_name: impl Into<String>) -> Self {
        Self {
            call_type,
            to_id: to_id.into(),
            to_name: to_name.into(),
            members: Vec::new(),
            room_id: None,
            conference_record: false,
        }
    }

    pub fn with_members(mut self, members: Vec<MemberTarget>) -> Self {
        self.members = members;
        self
    }

    pub fn with_room_id(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn with_conference_record(mut self, record: bool) -> Self {
        self.conference_record = record;
        self
    }

    pub fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }
}

/// A terminal to pull into the video monitoring room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorTarget {
    /// Terminal's call number, used as member id
    pub id: MemberId,
    pub name: String,
    /// Device identifier (IMEI) addressed by control messages
    pub devid: String,
}

impl MonitorTarget {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>, devid: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), devid: devid.into() }
    }
}

/// Where a monitored stream should be forwarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardTarget {
    /// Terminal that receives the stream
    pub target_id: String,
    /// Call number the stream is pushed to
    pub call_no: String,
    pub transport: rdispatch_signal_core::MonitorTransport,
    pub url: Option<String>,
}
