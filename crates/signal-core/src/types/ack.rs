//! Server acknowledgement codes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Result code carried in the `code` field of `*ack` signals and `newpeer`.
///
/// Unknown codes are preserved verbatim so that a newer server never breaks
/// decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AckCode {
    Success,
    UserIdIllegal,
    UserNotFound,
    ConnectionExists,
    RingCreationFailed,
    PublicSourceFailed,
    GroupMissingOrEmpty,
    AlreadyJoined,
    SdpNegotiationFailed,
    TargetOffline,
    GrabFailed,
    GrabGroupMissing,
    FreeGroupMissing,
    Other(String),
}

impl AckCode {
    /// The six-digit wire code
    pub fn code(&self) -> &str {
        match self {
            AckCode::Success => "000000",
            AckCode::UserIdIllegal => "100001",
            AckCode::UserNotFound => "100002",
            AckCode::ConnectionExists => "100003",
            AckCode::RingCreationFailed => "100004",
            AckCode::PublicSourceFailed => "100011",
            AckCode::GroupMissingOrEmpty => "100012",
            AckCode::AlreadyJoined => "100013",
            AckCode::SdpNegotiationFailed => "100014",
            AckCode::TargetOffline => "100015",
            AckCode::GrabFailed => "100021",
            AckCode::GrabGroupMissing => "100022",
            AckCode::FreeGroupMissing => "100031",
            AckCode::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> AckCode {
        match code {
            "000000" => AckCode::Success,
            "100001" => AckCode::UserIdIllegal,
            "100002" => AckCode::UserNotFound,
            "100003" => AckCode::ConnectionExists,
            "100004" => AckCode::RingCreationFailed,
            "100011" => AckCode::PublicSourceFailed,
            "100012" => AckCode::GroupMissingOrEmpty,
            "100013" => AckCode::AlreadyJoined,
            "100014" => AckCode::SdpNegotiationFailed,
            "100015" => AckCode::TargetOffline,
            "100021" => AckCode::GrabFailed,
            "100022" => AckCode::GrabGroupMissing,
            "100031" => AckCode::FreeGroupMissing,
            other => AckCode::Other(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AckCode::Success)
    }

    /// Stable human readable text for the code
    pub fn message(&self) -> &'static str {
        match self {
            AckCode::Success => "Success",
            AckCode::UserIdIllegal => "User id is illegal",
            AckCode::UserNotFound => "User does not exist",
            AckCode::ConnectionExists => "Connection already exists",
            AckCode::RingCreationFailed => "Failed to create ring",
            AckCode::PublicSourceFailed => "Failed to create public source",
            AckCode::GroupMissingOrEmpty => "Group or conference does not exist or has no members",
            AckCode::AlreadyJoined => "Already joined",
            AckCode::SdpNegotiationFailed => "SDP negotiation failed",
            AckCode::TargetOffline => "Target is not online",
            AckCode::GrabFailed => "Failed to grab the floor",
            AckCode::GrabGroupMissing => "Grab target group does not exist",
            AckCode::FreeGroupMissing => "Free target group does not exist",
            AckCode::Other(_) => "Unknown server error",
        }
    }
}

impl Default for AckCode {
    fn default() -> Self {
        AckCode::Success
    }
}

impl std::str::FromStr for AckCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AckCode::from_code(s))
    }
}

impl fmt::Display for AckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.message())
    }
}

impl Serialize for AckCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for AckCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AckCode::from_code(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_code_is_preserved() {
        let code = AckCode::from_code("199999");
        assert_eq!(code, AckCode::Other("199999".into()));
        assert_eq!(code.code(), "199999");
        assert!(!code.is_success());
    }

    #[test]
    fn test_known_codes() {
        assert!(AckCode::from_code("000000").is_success());
        assert_eq!(AckCode::from_code("100014"), AckCode::SdpNegotiationFailed);
        assert_eq!(AckCode::FreeGroupMissing.code(), "100031");
    }
}
