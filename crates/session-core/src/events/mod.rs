//! Events delivered to the host

pub mod emitter;
pub mod types;

pub use emitter::{EventCallback, EventEmitter};
pub use types::{Event, EventCategory};
