//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding events.
///
/// A decode failure is never fatal to a connection — the dispatcher
/// logs the frame and moves on.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed (turning bytes into an event).
    /// Common causes: malformed JSON, missing fields, unknown tags.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
