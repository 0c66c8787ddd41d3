use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rdispatch_signal_core::CallContext;

use crate::roster::{Member, MemberRoster};
use crate::types::{
    CallState, CallType, Direction, ErrorInfo, MediaTrack, MemberId, SessionKey, VideoStats,
};

/// One live call, conference, group or monitoring room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    /// Stable identity, unaffected by key migration
    pub id: Uuid,
    pub session_key: SessionKey,
    pub call_type: CallType,
    pub direction: Direction,
    pub state: CallState,
    pub room_id: Option<String>,
    pub from_id: String,
    pub from_name: String,
    pub to_id: String,
    pub to_name: String,
    pub roster: MemberRoster,
    pub floor_holder: Option<MemberId>,
    pub last_error: Option<ErrorInfo>,
    pub media: MediaTrack,
    pub conference_record: bool,
    /// Remote media subscription of a single-party call
    pub subscription_id: Option<String>,
    /// Inbound video figures of a single-party call
    pub video_stats: VideoStats,
    pub created_at: DateTime<Utc>,
}

impl CallSession {
    fn new(call_type: CallType, direction: Direction) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_key: SessionKey::default(),
            call_type,
            direction,
            state: CallState::Idle,
            room_id: None,
            from_id: String::new(),
            from_name: String::new(),
            to_id: String::new(),
            to_name: String::new(),
            roster: MemberRoster::new(call_type.is_ptt()),
            floor_holder: None,
            last_error: None,
            media: call_type.media_track(),
            conference_record: false,
            subscription_id: None,
            video_stats: VideoStats::default(),
            created_at: Utc::now(),
        }
    }

    /// A call started by the local user.
    pub fn outgoing(
        call_type: CallType,
        from: (&str, &str),
        to_id: impl Into<String>,
        to_name: impl Into<String>,
    ) -> Self {
        let mut session = Self::new(call_type, Direction::Outgoing);
        session.from_id = from.0.to_string();
        session.from_name = from.1.to_string();
        session.to_id = to_id.into();
        session.to_name = to_name.into();
        session
    }

    /// A call offered to the local user by the server.
    pub fn incoming(
        call_type: CallType,
        room_id: impl Into<String>,
        from: (&str, &str),
        to: (&str, &str),
    ) -> Self {
        let mut session = Self::new(call_type, Direction::Incoming);
        session.room_id = Some(room_id.into());
        session.from_id = from.0.to_string();
        session.from_name = from.1.to_string();
        session.to_id = to.0.to_string();
        session.to_name = to.1.to_string();
        session
    }

    pub fn with_room_id(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn with_conference_record(mut self, record: bool) -> Self {
        self.conference_record = record;
        self
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.roster.add_members(members);
        self
    }

    pub fn is_incoming(&self) -> bool {
        self.direction == Direction::Incoming
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.roster.members().values()
    }

    pub fn pending_member_diff(&self) -> Vec<Member> {
        self.roster.diff_snapshot()
    }

    /// Identifiers used when encoding requests about this session.
    pub fn context(&self) -> CallContext {
        CallContext {
            call_type: self.call_type,
            room_id: self.room_id.clone(),
            from_id: self.from_id.clone(),
            from_name: self.from_name.clone(),
            to_id: self.to_id.clone(),
            to_name: self.to_name.clone(),
            incoming: self.is_incoming(),
            conference_record: self.conference_record,
        }
    }
}
