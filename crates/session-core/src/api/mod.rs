//! # Host API
//!
//! [`SessionEngine`] is the single entry point for a host application:
//! it takes transport and media events in, exposes call operations, and
//! reports everything back through the event emitter.
//!
//! ```rust
//! use std::sync::Arc;
//! use rdispatch_session_core::prelude::*;
//!
//! let transport = MemoryTransport::new();
//! let mut engine = SessionEngine::new(
//!     SessionConfig::new("1001", "Dispatcher"),
//!     Arc::new(transport.clone()),
//!     Arc::new(NoopMedia),
//! )
//! .unwrap();
//!
//! let key = engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).unwrap();
//! assert_eq!(key.as_str(), "1001@2002");
//! assert_eq!(transport.frames().len(), 1);
//! ```

mod control;
pub mod engine;
mod monitor;
pub mod request;

pub use engine::SessionEngine;
pub use request::{CallRequest, ForwardTarget, MemberTarget, MonitorTarget};
