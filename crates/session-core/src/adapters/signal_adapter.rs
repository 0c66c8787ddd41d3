//! Signaling transport seam
//!
//! The engine never owns a socket. Outbound frames go through
//! [`SignalTransport::send`]; inbound traffic is fed back with
//! [`SessionEngine::handle_transport_event`](crate::SessionEngine::handle_transport_event).

use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::TransportError;

/// Sends encoded frames to the dispatch server
pub trait SignalTransport: Send + Sync {
    fn send(&self, frame: &str) -> Result<(), TransportError>;
}

/// What the signaling connection reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Closed,
    Error(String),
    /// One text frame
    Message(String),
}

/// Transport that keeps every frame in memory.
///
/// Useful for loopback setups and tests; `fail_sends` makes every send fail
/// with [`TransportError::NotConnected`].
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    frames: Arc<Mutex<Vec<String>>>,
    fail_sends: Arc<Mutex<bool>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_sends(&self, fail: bool) {
        *self.fail_sends.lock() = fail;
    }

    /// Frames sent so far
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().clone()
    }

    /// Removes and returns the frames sent so far
    pub fn take_frames(&self) -> Vec<String> {
        std::mem::take(&mut *self.frames.lock())
    }
}

impl SignalTransport for MemoryTransport {
    fn send(&self, frame: &str) -> Result<(), TransportError> {
        if *self.fail_sends.lock() {
            return Err(TransportError::NotConnected);
        }
        self.frames.lock().push(frame.to_string());
        Ok(())
    }
}
