//! Adapters to the transports the engine drives

pub mod media_adapter;
pub mod signal_adapter;

pub use media_adapter::{MediaCommand, MediaEvent, MediaTransport, NoopMedia};
pub use signal_adapter::{MemoryTransport, SignalTransport, TransportEvent};
