//! # rdispatch-signal-core
//!
//! Wire model of the dispatch signaling protocol: signal names, enumerated
//! field values, envelopes, outbound request constructors and the JSON codec.
//!
//! The crate has no knowledge of sessions. It turns typed requests into
//! frames and frames into typed messages; everything stateful lives in
//! `rdispatch-session-core`.
//!
//! ```rust
//! use rdispatch_signal_core::prelude::*;
//!
//! let encoder = RequestEncoder::new(LocalIdentity::new("1001", "Dispatcher"), ServerClock::default());
//! let ctx = CallContext::new(CallType::Voice, "2002", "Unit 2");
//! let frame = encode(&encoder.create(&ctx, &[]).unwrap()).unwrap();
//!
//! let decoded = decode(&frame).unwrap();
//! assert_eq!(decoded.signal, SignalType::Create);
//! assert_eq!(decoded.envelope.to_user_id, "2002");
//! ```

pub mod builder;
pub mod codec;
pub mod error;
pub mod message;
pub mod request;
pub mod types;

pub use builder::{EnvelopeBuilder, LocalIdentity, ServerClock};
pub use codec::{decode, decode_value, encode, DecodedMessage};
pub use error::{CodecError, Result};
pub use message::{ControlMessage, CustomMessage, Envelope, InboundControl, PLACEHOLDER_ROOM_ID};
pub use request::{CallContext, RequestEncoder};
pub use types::*;

pub mod prelude {
    pub use crate::builder::{EnvelopeBuilder, LocalIdentity, ServerClock};
    pub use crate::codec::{decode, encode, DecodedMessage};
    pub use crate::error::CodecError;
    pub use crate::message::{ControlMessage, CustomMessage, Envelope};
    pub use crate::request::{CallContext, RequestEncoder};
    pub use crate::types::*;
}
