//! Transport abstraction layer for Tilehall.
//!
//! Provides the [`Transport`] and [`Connection`] traits that abstract
//! over the network protocol, plus the WebSocket implementation used in
//! production.
//!
//! There is no authentication layer in Tilehall, so the connection
//! identity assigned here ([`ClientId`]) is *the* player identity: the
//! table binds seats to it and the lobby indexes rooms by it.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Identity of one connected client, unique for the life of the process.
///
/// Assigned by the transport when the connection is accepted and never
/// reused. Everything above the transport — seats, lobby index,
/// broadcast targets — keys on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    /// Creates a `ClientId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Gracefully shuts down the transport, stopping new connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// A single connection that can send and receive event frames.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the identity of this connection.
    fn id(&self) -> ClientId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_new_and_into_inner() {
        let id = ClientId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_client_id_display() {
        let id = ClientId::new(7);
        assert_eq!(id.to_string(), "C-7");
    }

    #[test]
    fn test_client_id_equality() {
        let a = ClientId::new(1);
        let b = ClientId::new(1);
        let c = ClientId::new(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_client_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ClientId::new(1), "east");
        map.insert(ClientId::new(2), "south");
        assert_eq!(map[&ClientId::new(1)], "east");
    }
}
