//! # Wire Types
//!
//! Typed forms of every enumerated value that travels inside a signaling
//! envelope. Each type serializes to the exact string the dispatch server
//! expects and parses back from it.
//!
//! - [`SignalType`]: the `sig` field, one variant per protocol signal
//! - [`CallType`] / [`RawCallType`]: local call categories and their wire names
//! - [`AckCode`]: server acknowledgement codes with stable messages
//! - [`GroupOperation`], [`CallOperationKind`], [`MonitorOperation`]: the `type`
//!   field of `groupopt`/`updateopt`, `callopt` and `monitor`
//! - [`ChildMessageType`]: remote control message kinds

/// Declares a string-valued wire enum with `as_str`, `FromStr`, `Display`
/// and serde impls that go through the wire string.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The exact wire string for this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::CodecError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err($crate::error::CodecError::invalid_value($kind, other)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse::<$name>().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub mod ack;
pub mod call_type;
pub mod control;
pub mod ops;
pub mod signal;

pub use ack::AckCode;
pub use call_type::{CallType, RawCallType};
pub use control::ChildMessageType;
pub use ops::{
    CallDirection, CallOperationKind, GroupOperation, HangupReason, MediaTrack, MessageKind,
    MonitorOperation, MonitorTransport, NotifyType, OnlineState,
};
pub use signal::SignalType;
