use thiserror::Error;

/// A type alias for handling `Result`s with `CodecError`
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised while encoding or decoding signaling envelopes
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is not valid JSON or does not fit the envelope shape
    #[error("Malformed envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope carries no `sig` field
    #[error("Envelope has no signal type")]
    MissingSignal,

    /// The `sig` field holds a value this client does not know
    #[error("Unknown signal type: {0}")]
    UnknownSignal(String),

    /// A wire value could not be parsed into its typed form
    #[error("Invalid {kind} value: {value}")]
    InvalidValue { kind: &'static str, value: String },
}

impl CodecError {
    pub fn invalid_value(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue { kind, value: value.into() }
    }
}
