//! # Signaling Envelopes
//!
//! Every frame exchanged with the dispatch server is one flat JSON object.
//! Call signaling uses [`Envelope`]; remote control of terminals uses
//! [`ControlMessage`]; free-form messages between users use
//! [`CustomMessage`]. The latter two both travel with `sig = "message"`.
//!
//! Decoding is lenient: fields the client does not know are dropped, and
//! enumerated values the client cannot parse fall back to their default
//! rather than rejecting the whole frame. Only `sig` is mandatory.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::types::{
    AckCode, CallDirection, ChildMessageType, GroupOperation, HangupReason, MediaTrack,
    MessageKind, MonitorOperation, MonitorTransport, NotifyType, OnlineState, RawCallType,
    SignalType,
};

/// Room id sent before the server has assigned one.
pub const PLACEHOLDER_ROOM_ID: &str = "000000";

/// A call signaling frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub sig: SignalType,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub msg_type: MessageKind,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub audio_only: MediaTrack,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub call_type: Option<RawCallType>,

    #[serde(default, with = "flag")]
    pub conference_record: bool,

    #[serde(default)]
    pub from_user_id: String,

    #[serde(default)]
    pub from_user_name: String,

    #[serde(default)]
    pub to_user_id: String,

    #[serde(default)]
    pub to_user_name: String,

    #[serde(default)]
    pub member_list: Vec<String>,

    #[serde(default)]
    pub monitor_group: Vec<String>,

    #[serde(default)]
    pub peer_id: String,

    #[serde(default)]
    pub room_id: String,

    #[serde(default)]
    pub sdp: String,

    /// Server-relative milliseconds; inbound relays may carry a number
    #[serde(default, deserialize_with = "string_or_number")]
    pub ts: String,

    /// Sub-operation; its meaning depends on `sig`
    #[serde(rename = "type", default)]
    pub op_type: String,

    #[serde(default)]
    pub uid: String,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub reason: Option<HangupReason>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_call: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub code: Option<AckCode>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub call_out: Option<CallDirection>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub total_member_list: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub online_member_list: Vec<String>,

    /// Outcome carried by `joinstate` (a signal name) and stream responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub online_state: Option<OnlineState>,
}

impl Envelope {
    /// An envelope with every field at its wire default.
    pub fn new(sig: SignalType) -> Self {
        Self {
            sig,
            msg_type: MessageKind::ToServer,
            audio_only: MediaTrack::AudioOnly,
            call_type: None,
            conference_record: false,
            from_user_id: String::new(),
            from_user_name: String::new(),
            to_user_id: String::new(),
            to_user_name: String::new(),
            member_list: Vec::new(),
            monitor_group: Vec::new(),
            peer_id: String::new(),
            room_id: PLACEHOLDER_ROOM_ID.to_string(),
            sdp: String::new(),
            ts: String::new(),
            op_type: String::new(),
            uid: String::new(),
            reason: None,
            need_call: None,
            code: None,
            call_out: None,
            total_member_list: Vec::new(),
            online_member_list: Vec::new(),
            result: None,
            online_state: None,
        }
    }

    /// Whether the ack code is success. A missing code counts as failure.
    pub fn is_success(&self) -> bool {
        self.code.as_ref().map(AckCode::is_success).unwrap_or(false)
    }

    /// The ack code, treating a missing code as an unknown failure.
    pub fn ack_code(&self) -> AckCode {
        self.code.clone().unwrap_or_else(|| AckCode::Other(String::new()))
    }

    pub fn group_operation(&self) -> Option<GroupOperation> {
        self.op_type.parse().ok()
    }

    pub fn monitor_operation(&self) -> Option<MonitorOperation> {
        self.op_type.parse().ok()
    }

    pub fn notify_type(&self) -> Option<NotifyType> {
        self.op_type.parse().ok()
    }

    /// Whether this client originated the call (`callOut == "1"`).
    pub fn is_call_out(&self) -> bool {
        self.call_out == Some(CallDirection::Outgoing)
    }

    /// The room id, or `None` while it is empty or still the default placeholder.
    pub fn assigned_room_id(&self) -> Option<&str> {
        self.room_id_unless(PLACEHOLDER_ROOM_ID)
    }

    /// The room id, or `None` while it is empty or equal to `placeholder`.
    pub fn room_id_unless(&self, placeholder: &str) -> Option<&str> {
        match self.room_id.as_str() {
            "" => None,
            id if id == placeholder => None,
            id => Some(id),
        }
    }
}

/// Remote control command addressed to a terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlMessage {
    pub sig: SignalType,
    pub msg_type: MessageKind,
    pub child_msg_type: ChildMessageType,
    pub dest_id: String,
    pub devid: String,
    pub rtmp_dest: String,
    pub src_id: String,
    pub ts: i64,
    #[serde(rename = "type")]
    pub transport: MonitorTransport,
    /// Command specific fields, merged into the top level object
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ControlMessage {
    pub fn new(child_msg_type: ChildMessageType, dest_id: impl Into<String>) -> Self {
        Self {
            sig: SignalType::Message,
            msg_type: MessageKind::Control,
            child_msg_type,
            dest_id: dest_id.into(),
            devid: String::new(),
            rtmp_dest: String::new(),
            src_id: String::new(),
            ts: 0,
            transport: MonitorTransport::WebRtc,
            extra: Map::new(),
        }
    }
}

/// Free-form message relayed to another user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMessage {
    pub sig: SignalType,
    pub msg_type: MessageKind,
    pub content: Value,
    pub dest_id: String,
    pub src_id: String,
    pub ts: i64,
}

impl CustomMessage {
    pub fn new(dest_id: impl Into<String>, content: Value) -> Self {
        Self {
            sig: SignalType::Message,
            msg_type: MessageKind::RelayToClient,
            content,
            dest_id: dest_id.into(),
            src_id: String::new(),
            ts: 0,
        }
    }
}

/// Fields of an inbound `message` frame that the client acts on.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundControl {
    #[serde(default)]
    pub child_msg_type: Option<ChildMessageType>,
    #[serde(default)]
    pub src_id: String,
    #[serde(default)]
    pub result: Option<String>,
}

/// Deserializes a string (or number) into `T`, yielding `None` when the value
/// is absent, null or not a valid `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s.parse().ok(),
        Some(Value::Number(n)) => n.to_string().parse().ok(),
        Some(Value::Bool(b)) => b.to_string().parse().ok(),
        _ => None,
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// `"1"` / `"0"` string flags.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "1" } else { "0" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::Bool(b)) => b,
            _ => false,
        })
    }
}
