//! Media transport seam
//!
//! Peer connections and the media SDK live outside the core. The dispatcher
//! queues [`MediaCommand`]s; the engine hands them to a [`MediaTransport`]
//! after each dispatch step. Results come back as [`MediaEvent`]s through
//! [`SessionEngine::handle_media_event`](crate::SessionEngine::handle_media_event).

use tracing::debug;

use crate::types::{MemberId, SessionKey, VideoStats};

/// Operations the core asks of the media layer. All are fire-and-forget.
pub trait MediaTransport: Send + Sync {
    fn set_remote_description(&self, _session_key: &SessionKey, _sdp: &str) {}

    /// Create receivers for the remote streams of a room
    fn subscribe(&self, _session_key: &SessionKey, _room_id: &str) {}

    /// Publish local audio to a PTT or broadcast group
    fn publish(&self, _session_key: &SessionKey, _room_id: &str) {}

    fn join_room(&self, _session_key: &SessionKey, _room_id: &str) {}

    fn leave(&self, _session_key: &SessionKey) {}

    fn close_send(&self, _session_key: &SessionKey) {}

    fn set_local_audio_muted(&self, _session_key: &SessionKey, _muted: bool) {}
}

/// Media layer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMedia;

impl MediaTransport for NoopMedia {}

/// Work queued for the media layer during a dispatch step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCommand {
    SetRemoteDescription { session_key: SessionKey, sdp: String },
    Subscribe { session_key: SessionKey, room_id: String },
    Publish { session_key: SessionKey, room_id: String },
    JoinRoom { session_key: SessionKey, room_id: String },
    Leave { session_key: SessionKey },
    CloseSend { session_key: SessionKey },
    SetLocalAudioMuted { session_key: SessionKey, muted: bool },
}

impl MediaCommand {
    pub fn execute(&self, media: &dyn MediaTransport) {
        debug!(command = ?self, "media command");
        match self {
            MediaCommand::SetRemoteDescription { session_key, sdp } => {
                media.set_remote_description(session_key, sdp)
            }
            MediaCommand::Subscribe { session_key, room_id } => media.subscribe(session_key, room_id),
            MediaCommand::Publish { session_key, room_id } => media.publish(session_key, room_id),
            MediaCommand::JoinRoom { session_key, room_id } => media.join_room(session_key, room_id),
            MediaCommand::Leave { session_key } => media.leave(session_key),
            MediaCommand::CloseSend { session_key } => media.close_send(session_key),
            MediaCommand::SetLocalAudioMuted { session_key, muted } => {
                media.set_local_audio_muted(session_key, *muted)
            }
        }
    }
}

/// What the media layer reports back
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Remote media of the session (or of one member) is being received
    Subscribed {
        member_id: Option<MemberId>,
        subscription_id: String,
    },
    SubscribeFailed { member_id: Option<MemberId> },
    /// The local user joined the room
    Joined,
    PeerLeft { member_id: Option<MemberId> },
    /// A monitored terminal started streaming
    StreamAdded { member_id: MemberId },
    AudioLevel { member_id: MemberId, speaking: bool },
    VideoStats {
        member_id: Option<MemberId>,
        stats: VideoStats,
    },
    RemoteMuteChanged { member_id: MemberId, muted: bool },
}
