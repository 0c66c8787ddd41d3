//! Call categories.
//!
//! The server only knows five raw call types (`voice`, `conference`, `ptt`,
//! `tempptt`, `shout`) and tells audio from video through the `audioOnly`
//! flag. The client works with the richer [`CallType`]; the two mappings
//! below are the only place where one turns into the other.

use crate::types::ops::MediaTrack;

wire_enum! {
    /// Call categories as the server names them in `callType`.
    pub enum RawCallType: "raw call type" {
        Voice => "voice",
        Conference => "conference",
        Ptt => "ptt",
        TempPtt => "tempptt",
        Shout => "shout",
    }
}

wire_enum! {
    /// Call categories as the client distinguishes them.
    ///
    /// The wire string is the local name used in session keys
    /// (`ptt@1001`, `voice_conference@1001`, ...).
    pub enum CallType: "call type" {
        Voice => "voice",
        VoiceConference => "voice_conference",
        TempPtt => "tempptt",
        Ptt => "ptt",
        Broadcast => "shout",
        Video => "video",
        VideoConference => "video_conference",
        VideoMonitor => "video_monitor",
        ForceInsert => "force_insert",
        ForceMonitor => "force_monitor",
    }
}

impl CallType {
    /// Maps a server call type plus media flag to the local category.
    ///
    /// Returns `None` for combinations the server never produces
    /// (video PTT, video shout).
    pub fn from_raw(raw: RawCallType, media: MediaTrack) -> Option<CallType> {
        match (raw, media) {
            (RawCallType::Voice, MediaTrack::AudioOnly) => Some(CallType::Voice),
            (RawCallType::Voice, MediaTrack::AudioVideo) => Some(CallType::Video),
            (RawCallType::Conference, MediaTrack::AudioOnly) => Some(CallType::VoiceConference),
            (RawCallType::Conference, MediaTrack::AudioVideo) => Some(CallType::VideoConference),
            (RawCallType::Ptt, MediaTrack::AudioOnly) => Some(CallType::Ptt),
            (RawCallType::TempPtt, MediaTrack::AudioOnly) => Some(CallType::TempPtt),
            (RawCallType::Shout, MediaTrack::AudioOnly) => Some(CallType::Broadcast),
            _ => None,
        }
    }

    /// The server call type used when encoding requests for this category.
    ///
    /// Supervisory calls ride on plain `voice`. The monitoring room is driven
    /// by control messages and has no server call type.
    pub fn raw(&self) -> Option<RawCallType> {
        match self {
            CallType::Voice | CallType::Video | CallType::ForceInsert | CallType::ForceMonitor => {
                Some(RawCallType::Voice)
            }
            CallType::VoiceConference | CallType::VideoConference => Some(RawCallType::Conference),
            CallType::Ptt => Some(RawCallType::Ptt),
            CallType::TempPtt => Some(RawCallType::TempPtt),
            CallType::Broadcast => Some(RawCallType::Shout),
            CallType::VideoMonitor => None,
        }
    }

    /// The media flag sent alongside this category.
    pub fn media_track(&self) -> MediaTrack {
        match self {
            CallType::Video | CallType::VideoConference | CallType::VideoMonitor => MediaTrack::AudioVideo,
            _ => MediaTrack::AudioOnly,
        }
    }

    /// Multi-party categories whose sessions carry a member roster.
    pub fn is_group(&self) -> bool {
        matches!(
            self,
            CallType::VoiceConference
                | CallType::VideoConference
                | CallType::Ptt
                | CallType::TempPtt
                | CallType::Broadcast
        )
    }

    pub fn is_conference(&self) -> bool {
        matches!(self, CallType::VoiceConference | CallType::VideoConference)
    }

    /// Push-to-talk categories, which have floor control.
    pub fn is_ptt(&self) -> bool {
        matches!(self, CallType::Ptt | CallType::TempPtt)
    }

    pub fn is_supervisory(&self) -> bool {
        matches!(self, CallType::ForceInsert | CallType::ForceMonitor)
    }

    pub fn is_video(&self) -> bool {
        self.media_track() == MediaTrack::AudioVideo
    }
}
