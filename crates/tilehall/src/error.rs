//! Unified error type for the Tilehall server.

use tilehall_protocol::ProtocolError;
use tilehall_transport::TransportError;

/// Top-level error wrapping the layer-specific errors the server can
/// surface. Table-layer rejections never appear here — they are wire
/// outcomes (a null seat, a missing result event), not server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode/decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
