//! Core value types shared across the session core.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use rdispatch_signal_core::{CallType, MediaTrack};

/// Member identifier (the member's call number)
pub type MemberId = String;

/// Key under which a session lives in the [`SessionStore`](crate::SessionStore).
///
/// Derived from the session's shape, see [`derive_session_key`](crate::session::derive_session_key).
#[derive(Debug, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SessionKey(pub String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for SessionKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Call state
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum CallState {
    Idle,
    /// Created, waiting for the far end
    Ring,
    /// Outgoing call acknowledged by the server with a room id
    WaitRingBack,
    RingBack,
    /// Media flowing
    Talking,
    /// Monitoring room with a stream assigned but not yet receiving
    LineHold,
    Rejected,
    Bye,
    /// Reserved
    Cancel,
    Failed,
}

impl CallState {
    /// Terminal states are removed from the store in the same dispatch cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Rejected | CallState::Bye | CallState::Failed)
    }

    pub fn is_ringing(&self) -> bool {
        matches!(self, CallState::Ring)
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Which side originated the call
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Status of a group member
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum MemberStatus {
    Init,
    Calling,
    Joined,
    Quit,
    Rejected,
    Failed,
}

impl MemberStatus {
    /// Quit or Rejected: the member left and is only re-added by an explicit invite.
    pub fn has_departed(&self) -> bool {
        matches!(self, MemberStatus::Quit | MemberStatus::Rejected)
    }

    /// Maps the `result` of a `joinstate` frame.
    pub fn from_join_result(result: &str) -> Option<MemberStatus> {
        match result {
            "joinfinish" => Some(MemberStatus::Joined),
            "reject" => Some(MemberStatus::Rejected),
            "leave" => Some(MemberStatus::Quit),
            _ => None,
        }
    }
}

/// Result payload attached to failures and terminal transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<ResultCode> for ErrorInfo {
    fn from(code: ResultCode) -> Self {
        ErrorInfo::new(code.code(), code.message())
    }
}

impl From<&rdispatch_signal_core::AckCode> for ErrorInfo {
    fn from(code: &rdispatch_signal_core::AckCode) -> Self {
        ErrorInfo::new(code.code(), code.message())
    }
}

/// Client-side result codes reported with operation failures
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ResultCode {
    CreateFailed,
    FreeFailed,
    GrabFailed,
    SdpFailed,
    InviteFailed,
    KickFailed,
    MuteFailed,
    PermissionDenied,
    NoDevices,
    SubscribeFailed,
    Kicked,
    PeerRejected,
    PeerTerminated,
}

impl ResultCode {
    pub fn code(&self) -> &'static str {
        match self {
            ResultCode::CreateFailed => "001",
            ResultCode::FreeFailed => "002",
            ResultCode::GrabFailed => "003",
            ResultCode::SdpFailed => "004",
            ResultCode::InviteFailed => "005",
            ResultCode::KickFailed => "006",
            ResultCode::MuteFailed => "007",
            ResultCode::PermissionDenied => "008",
            ResultCode::NoDevices => "009",
            ResultCode::SubscribeFailed => "010",
            ResultCode::Kicked => "011",
            ResultCode::PeerRejected => "012",
            ResultCode::PeerTerminated => "013",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ResultCode::CreateFailed => "Failed to create the call",
            ResultCode::FreeFailed => "Failed to release the floor",
            ResultCode::GrabFailed => "Failed to grab the floor",
            ResultCode::SdpFailed => "Media negotiation failed",
            ResultCode::InviteFailed => "Failed to invite members",
            ResultCode::KickFailed => "Failed to remove members",
            ResultCode::MuteFailed => "Failed to mute member",
            ResultCode::PermissionDenied => "Media device permission denied",
            ResultCode::NoDevices => "No media devices available",
            ResultCode::SubscribeFailed => "Failed to subscribe to remote media",
            ResultCode::Kicked => "Removed from the call",
            ResultCode::PeerRejected => "The other party declined",
            ResultCode::PeerTerminated => "The other party hung up",
        }
    }
}

/// Outcome of a call or group operation, reported with
/// [`Event::CallOperation`](crate::events::Event::CallOperation) and roster updates
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum CallOperation {
    Init,
    AddSucceeded,
    AddFailed,
    EndFailed,
    EndSucceeded,
    StartSucceeded,
    StartFailed,
    KickSucceeded,
    KickFailed,
    MuteSucceeded,
    MuteFailed,
    GrabSucceeded,
    GrabFailed,
    FreeSucceeded,
    FreeFailed,
    MemberRefused,
    SocketError,
    SdpFailed,
    SubscribeFailed,
    MemberUpdated,
    MemberAccepted,
    MemberKicked,
}

impl CallOperation {
    /// Numeric code hosts use to tell operations apart
    pub fn code(&self) -> u8 {
        match self {
            CallOperation::Init => 0,
            CallOperation::AddSucceeded => 11,
            CallOperation::AddFailed => 12,
            CallOperation::EndFailed => 13,
            CallOperation::EndSucceeded => 14,
            CallOperation::StartSucceeded => 15,
            CallOperation::StartFailed => 16,
            CallOperation::KickSucceeded => 17,
            CallOperation::KickFailed => 18,
            CallOperation::MuteSucceeded => 19,
            CallOperation::MuteFailed => 20,
            CallOperation::GrabSucceeded => 21,
            CallOperation::GrabFailed => 22,
            CallOperation::FreeSucceeded => 23,
            CallOperation::FreeFailed => 24,
            CallOperation::MemberRefused => 25,
            CallOperation::SocketError => 26,
            CallOperation::SdpFailed => 27,
            CallOperation::SubscribeFailed => 28,
            CallOperation::MemberUpdated => 29,
            CallOperation::MemberAccepted => 30,
            CallOperation::MemberKicked => 31,
        }
    }
}

/// Inbound video quality figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStats {
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub bitrate: u64,
}

/// Live sessions per call type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStatistics {
    pub voice: usize,
    pub voice_conference: usize,
    pub ptt: usize,
    pub temp_ptt: usize,
    pub broadcast: usize,
    pub video: usize,
    pub video_conference: usize,
    pub force_insert: usize,
    pub force_monitor: usize,
    pub video_monitor: usize,
}

impl CallStatistics {
    pub fn record(&mut self, call_type: CallType) {
        let slot = match call_type {
            CallType::Voice => &mut self.voice,
            CallType::VoiceConference => &mut self.voice_conference,
            CallType::Ptt => &mut self.ptt,
            CallType::TempPtt => &mut self.temp_ptt,
            CallType::Broadcast => &mut self.broadcast,
            CallType::Video => &mut self.video,
            CallType::VideoConference => &mut self.video_conference,
            CallType::ForceInsert => &mut self.force_insert,
            CallType::ForceMonitor => &mut self.force_monitor,
            CallType::VideoMonitor => &mut self.video_monitor,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.voice
            + self.voice_conference
            + self.ptt
            + self.temp_ptt
            + self.broadcast
            + self.video
            + self.video_conference
            + self.force_insert
            + self.force_monitor
            + self.video_monitor
    }

    /// Whether any call of any type is live
    pub fn is_call_exist(&self) -> bool {
        self.total() > 0
    }
}
