//! # rdispatch-session-core
//!
//! Client-side session and signaling core for multi-modal dispatch: voice
//! and video calls, conferences, push-to-talk groups, broadcasts,
//! supervisory calls and a video monitoring room, all driven by one JSON
//! signaling connection.
//!
//! ## Architecture
//!
//! ```text
//! transport frames ──► signal-core decode ──► dispatcher ──► state table
//!                                                 │              │
//!                          media events ──────────┤         actions / events
//!                                                 ▼              ▼
//! host requests ─────► SessionEngine ─────► SessionStore    EventEmitter ──► host
//!                            │
//!                            └──► SignalTransport / MediaTransport
//! ```
//!
//! - [`SessionEngine`] owns every session and is mutated through `&mut self`.
//! - [`dispatcher`] routes each inbound signal to one handler.
//! - [`state_table`] holds every legal call state transition, keyed by
//!   topology, state and event.
//! - [`roster`] keeps group members and the diff of the last change.
//! - [`floor`] applies server-confirmed PTT floor changes.
//! - [`runtime`] runs the engine in a tokio task for multi-task hosts.
//!
//! Nothing in this crate opens sockets or touches media devices: hosts plug
//! in a [`SignalTransport`] and a [`MediaTransport`] and feed their events
//! back in.

pub mod adapters;
pub mod api;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod floor;
pub mod logging;
pub mod roster;
pub mod runtime;
pub mod session;
pub mod session_store;
pub mod state_machine;
pub mod state_table;
pub mod types;

pub use adapters::{
    MediaCommand, MediaEvent, MediaTransport, MemoryTransport, NoopMedia, SignalTransport, TransportEvent,
};
pub use api::{CallRequest, ForwardTarget, MemberTarget, MonitorTarget, SessionEngine};
pub use config::SessionConfig;
pub use errors::{Result, SessionError, TransportError};
pub use events::{Event, EventCategory, EventEmitter};
pub use floor::FloorState;
pub use roster::{Member, MemberRoster};
pub use runtime::{EngineHandle, EngineRuntime};
pub use session::CallSession;
pub use session_store::SessionStore;
pub use types::{
    CallOperation, CallState, CallStatistics, CallType, Direction, ErrorInfo, MemberId, MemberStatus,
    ResultCode, SessionKey, VideoStats,
};

pub use rdispatch_signal_core as signal;

pub mod prelude {
    pub use crate::adapters::{MediaEvent, MediaTransport, MemoryTransport, NoopMedia, SignalTransport, TransportEvent};
    pub use crate::api::{CallRequest, ForwardTarget, MemberTarget, MonitorTarget, SessionEngine};
    pub use crate::config::SessionConfig;
    pub use crate::errors::{Result, SessionError};
    pub use crate::events::{Event, EventCategory};
    pub use crate::runtime::{EngineHandle, EngineRuntime};
    pub use crate::session::CallSession;
    pub use crate::types::{CallOperation, CallState, CallType, MemberStatus, SessionKey};
}
