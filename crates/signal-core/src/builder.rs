//! Envelope construction.
//!
//! [`EnvelopeBuilder`] fills the defaults every outbound frame needs (caller
//! identity, placeholder room id, `WsOpToServer` routing) and stamps the
//! frame with the server-relative time when it is built.

use chrono::Utc;

use crate::message::Envelope;
use crate::types::{CallType, HangupReason, MediaTrack, MessageKind, RawCallType, SignalType};

/// The logged-in user on whose behalf frames are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    pub user_id: String,
    pub user_name: String,
}

impl LocalIdentity {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), user_name: user_name.into() }
    }
}

/// Wall clock corrected by the known skew to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerClock {
    offset_ms: i64,
}

impl ServerClock {
    pub fn new(offset_ms: i64) -> Self {
        Self { offset_ms }
    }

    pub fn offset_ms(&self) -> i64 {
        self.offset_ms
    }

    /// Milliseconds since the epoch, as the server sees it.
    pub fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis() + self.offset_ms
    }
}

/// Fluent builder for outbound [`Envelope`]s.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    envelope: Envelope,
}

impl EnvelopeBuilder {
    pub fn new(sig: SignalType, identity: &LocalIdentity) -> Self {
        let mut envelope = Envelope::new(sig);
        envelope.uid = identity.user_id.clone();
        envelope.from_user_id = identity.user_id.clone();
        envelope.from_user_name = identity.user_name.clone();
        Self { envelope }
    }

    pub fn msg_type(mut self, kind: MessageKind) -> Self {
        self.envelope.msg_type = kind;
        self
    }

    /// Sets the server call type and media flag for a local call category.
    pub fn call_type(mut self, call_type: CallType) -> Self {
        self.envelope.call_type = call_type.raw();
        self.envelope.audio_only = call_type.media_track();
        self
    }

    pub fn raw_call_type(mut self, raw: RawCallType) -> Self {
        self.envelope.call_type = Some(raw);
        self
    }

    pub fn media(mut self, media: MediaTrack) -> Self {
        self.envelope.audio_only = media;
        self
    }

    pub fn conference_record(mut self, record: bool) -> Self {
        self.envelope.conference_record = record;
        self
    }

    pub fn to(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.envelope.to_user_id = id.into();
        self.envelope.to_user_name = name.into();
        self
    }

    /// Overrides the sender, which otherwise is the local identity.
    pub fn sender(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        let name = name.into();
        if !id.is_empty() {
            self.envelope.from_user_id = id;
        }
        if !name.is_empty() {
            self.envelope.from_user_name = name;
        }
        self
    }

    /// Sets the room id. `None` keeps the placeholder.
    pub fn room_id(mut self, room_id: Option<&str>) -> Self {
        if let Some(room_id) = room_id {
            self.envelope.room_id = room_id.to_string();
        }
        self
    }

    pub fn members(mut self, members: Vec<String>) -> Self {
        self.envelope.member_list = members;
        self
    }

    pub fn monitor_group(mut self, groups: Vec<String>) -> Self {
        self.envelope.monitor_group = groups;
        self
    }

    pub fn peer_id(mut self, peer_id: impl Into<String>) -> Self {
        self.envelope.peer_id = peer_id.into();
        self
    }

    pub fn sdp(mut self, sdp: impl Into<String>) -> Self {
        self.envelope.sdp = sdp.into();
        self
    }

    /// Sets the `type` sub-operation.
    pub fn op(mut self, op: impl std::fmt::Display) -> Self {
        self.envelope.op_type = op.to_string();
        self
    }

    pub fn reason(mut self, reason: HangupReason) -> Self {
        self.envelope.reason = Some(reason);
        self
    }

    pub fn need_call(mut self) -> Self {
        self.envelope.need_call = Some("1".to_string());
        self
    }

    pub fn build(mut self, clock: &ServerClock) -> Envelope {
        self.envelope.ts = clock.now_ms().to_string();
        self.envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_come_from_identity() {
        let me = LocalIdentity::new("1001", "Dispatcher");
        let env = EnvelopeBuilder::new(SignalType::Grab, &me).build(&ServerClock::default());
        assert_eq!(env.uid, "1001");
        assert_eq!(env.from_user_id, "1001");
        assert_eq!(env.from_user_name, "Dispatcher");
        assert_eq!(env.room_id, "000000");
        assert_eq!(env.msg_type, MessageKind::ToServer);
        assert!(!env.ts.is_empty());
    }

    #[test]
    fn test_clock_offset_is_applied() {
        let ahead = ServerClock::new(60_000);
        let local = ServerClock::default();
        assert!(ahead.now_ms() - local.now_ms() >= 59_000);
    }

    #[test]
    fn test_video_call_type_sets_media_flag() {
        let me = LocalIdentity::new("1001", "Dispatcher");
        let env = EnvelopeBuilder::new(SignalType::Create, &me)
            .call_type(CallType::Video)
            .build(&ServerClock::default());
        assert_eq!(env.call_type, Some(RawCallType::Voice));
        assert_eq!(env.audio_only, MediaTrack::AudioVideo);
    }
}
