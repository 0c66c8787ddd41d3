//! Sub-operation and flag values used inside envelopes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

wire_enum! {
    /// Routing hint in `msgType`.
    pub enum MessageKind: "message kind" {
        /// Request handled by the server itself (default)
        ToServer => "WsOpToServer",
        /// Server-originated notification to one client
        ToClient => "WsOpToClient",
        /// Relayed by the server to the addressed peer
        RelayToClient => "WsOpServerDoToClient",
        /// Remote control command for a terminal
        Control => "WsOpServerToClient",
    }
}

impl Default for MessageKind {
    fn default() -> Self {
        MessageKind::ToServer
    }
}

wire_enum! {
    /// The `type` field of `groupopt` and `updateopt`.
    pub enum GroupOperation: "group operation" {
        Add => "add",
        Delete => "delete",
        Mute => "mute",
        Unmute => "unmute",
        Cancel => "cancel",
        ChangeAudio => "changaudio",
        Query => "query",
        AddGroup => "addgroup",
        DeleteGroup => "deletegroup",
        Online => "online",
    }
}

wire_enum! {
    /// The `type` field of `callopt`.
    pub enum CallOperationKind: "call operation" {
        ForceInsert => "forceinterposecall",
        ForceMonitor => "forcemonitorcall",
        ForceBreak => "forceremovecall",
    }
}

wire_enum! {
    /// The `type` field of `monitor`.
    pub enum MonitorOperation: "monitor operation" {
        PublishVoice => "publishvoice",
        UnpublishVoice => "unpublishvoice",
    }
}

wire_enum! {
    /// Stream transport requested in a control message.
    pub enum MonitorTransport: "monitor transport" {
        WebRtc => "webrtc",
        Rtmp => "rtmp",
    }
}

wire_enum! {
    /// The `type` field of `notifyweb`.
    pub enum NotifyType: "notify type" {
        OnlineState => "onlinestate",
        GroupActive => "groupactive",
    }
}

wire_enum! {
    pub enum OnlineState: "online state" {
        Online => "online",
        Offline => "offline",
    }
}

wire_enum! {
    /// `callOut` on `newpeer`: whether this client originated the call.
    pub enum CallDirection: "call direction" {
        Outgoing => "1",
        Incoming => "0",
    }
}

wire_enum! {
    /// `audioOnly` flag.
    pub enum MediaTrack: "media track" {
        AudioOnly => "1",
        AudioVideo => "0",
    }
}

impl Default for MediaTrack {
    fn default() -> Self {
        MediaTrack::AudioOnly
    }
}

/// Numeric `reason` code sent with `reject` and `leave`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HangupReason {
    Busy,
    SignalError,
    PeerSignalError,
    HangUp,
    MediaError,
    PeerHangUp,
    CameraError,
    Timeout,
    Transfer,
    Kicked,
    Dissolved,
}

impl HangupReason {
    pub fn code(&self) -> u8 {
        match self {
            HangupReason::Busy => 0,
            HangupReason::SignalError => 1,
            HangupReason::PeerSignalError => 2,
            HangupReason::HangUp => 3,
            HangupReason::MediaError => 4,
            HangupReason::PeerHangUp => 5,
            HangupReason::CameraError => 6,
            HangupReason::Timeout => 7,
            HangupReason::Transfer => 8,
            HangupReason::Kicked => 9,
            HangupReason::Dissolved => 10,
        }
    }

    pub fn from_code(code: u8) -> Option<HangupReason> {
        Some(match code {
            0 => HangupReason::Busy,
            1 => HangupReason::SignalError,
            2 => HangupReason::PeerSignalError,
            3 => HangupReason::HangUp,
            4 => HangupReason::MediaError,
            5 => HangupReason::PeerHangUp,
            6 => HangupReason::CameraError,
            7 => HangupReason::Timeout,
            8 => HangupReason::Transfer,
            9 => HangupReason::Kicked,
            10 => HangupReason::Dissolved,
            _ => return None,
        })
    }
}

impl std::str::FromStr for HangupReason {
    type Err = crate::error::CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(HangupReason::from_code)
            .ok_or_else(|| crate::error::CodecError::invalid_value("hangup reason", s))
    }
}

impl Serialize for HangupReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for HangupReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        HangupReason::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown hangup reason {code}")))
    }
}
