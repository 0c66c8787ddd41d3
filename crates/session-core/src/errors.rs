//! Error types for the session core

use thiserror::Error;

use rdispatch_signal_core::CodecError;

/// Result type for session core operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Failure reported by a [`SignalTransport`](crate::adapters::SignalTransport)
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// No socket is open
    #[error("Transport not connected")]
    NotConnected,

    /// The socket rejected the frame
    #[error("Send failed: {message}")]
    SendFailed { message: String },
}

/// Errors that can occur in the session core
#[derive(Debug, Error)]
pub enum SessionError {
    /// Encoding or decoding a frame failed
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// The outbound transport refused a frame
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// No session under this key
    #[error("Session not found: {key}")]
    SessionNotFound { key: String },

    /// Operation does not apply to the session in its current shape
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// The host passed a request that cannot be encoded
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The engine task has stopped
    #[error("Engine runtime closed")]
    RuntimeClosed,
}

impl SessionError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState { message: message.into() }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    pub fn session_not_found(key: impl Into<String>) -> Self {
        Self::SessionNotFound { key: key.into() }
    }
}
