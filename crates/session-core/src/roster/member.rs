use serde::{Deserialize, Serialize};

use crate::types::{MemberId, MemberStatus, VideoStats};

/// A participant of a group session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub status: MemberStatus,
    pub muted: bool,
    pub speaking: bool,
    pub is_host: bool,
    pub video_stats: VideoStats,
    /// Media subscription carrying this member's stream
    pub subscription_id: Option<String>,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>, status: MemberStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            muted: false,
            speaking: false,
            is_host: false,
            video_stats: VideoStats::default(),
            subscription_id: None,
        }
    }

    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    pub fn with_host(mut self, is_host: bool) -> Self {
        self.is_host = is_host;
        self
    }
}
