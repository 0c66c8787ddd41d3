//! # Frame Codec
//!
//! Text frames in, typed messages out, and back. Decoding first reads the
//! `sig` so that a frame with an unknown signal is reported as such rather
//! than as a generic shape error.

use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::error::{CodecError, Result};
use crate::message::{Envelope, InboundControl};
use crate::types::SignalType;

/// An inbound frame after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub signal: SignalType,
    pub envelope: Envelope,
    /// The untouched frame, kept only for `message` so it can be forwarded
    /// to the host verbatim
    pub payload: Option<Value>,
}

impl DecodedMessage {
    /// Control fields of a `message` frame. Empty for any other signal.
    pub fn control(&self) -> InboundControl {
        self.payload
            .as_ref()
            .and_then(|raw| serde_json::from_value(raw.clone()).ok())
            .unwrap_or_default()
    }
}

/// Decodes one text frame.
pub fn decode(frame: &str) -> Result<DecodedMessage> {
    let raw: Value = serde_json::from_str(frame)?;
    decode_value(raw)
}

/// Decodes an already parsed JSON frame.
pub fn decode_value(raw: Value) -> Result<DecodedMessage> {
    let sig = raw
        .get("sig")
        .and_then(Value::as_str)
        .ok_or(CodecError::MissingSignal)?;
    let signal: SignalType = sig
        .parse()
        .map_err(|_| CodecError::UnknownSignal(sig.to_string()))?;

    let payload = (signal == SignalType::Message).then(|| raw.clone());
    let envelope: Envelope = serde_json::from_value(raw)?;
    trace!(signal = %signal, room_id = %envelope.room_id, "decoded frame");

    Ok(DecodedMessage { signal, envelope, payload })
}

/// Encodes any outbound frame to its text form.
pub fn encode<T: Serialize>(message: &T) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_signal() {
        assert!(matches!(decode(r#"{"roomId":"R1"}"#), Err(CodecError::MissingSignal)));
    }

    #[test]
    fn test_unknown_signal() {
        match decode(r#"{"sig":"teleport"}"#) {
            Err(CodecError::UnknownSignal(sig)) => assert_eq!(sig, "teleport"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(decode("{not json"), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_payload_only_kept_for_messages() {
        let call = decode(r#"{"sig":"ring","roomId":"R1"}"#).unwrap();
        assert!(call.payload.is_none());

        let msg = decode(r#"{"sig":"message","childMsgType":"DaRtmpSResp","srcId":"2002","result":"1"}"#).unwrap();
        let control = msg.control();
        assert_eq!(control.src_id, "2002");
        assert_eq!(control.result.as_deref(), Some("1"));
    }
}
