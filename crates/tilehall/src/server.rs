//! `TilehallServer` builder and accept loop.
//!
//! This is the entry point for running the server. It ties the layers
//! together: transport → protocol → lobby/tables, with one dispatcher
//! task per connection.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tilehall_protocol::{JsonCodec, Seat, TableId};
use tilehall_table::Lobby;
use tilehall_transport::{ClientId, Transport, WebSocketTransport};
use tokio::sync::{mpsc, Mutex};

use crate::dispatcher::handle_connection;
use crate::ServerError;

/// How long the server holds a pending deal waiting for all four
/// seats to acknowledge `startPending` before tearing the table down.
pub const DEFAULT_START_ACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Outbound queue feeding one connection's writer task.
pub(crate) type PeerSender = mpsc::UnboundedSender<Vec<u8>>;

/// Shared server state passed to each connection task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks; the
/// tables themselves carry their own guards, so these mutexes only
/// protect the registries around them.
pub(crate) struct ServerState {
    /// The table registry. Single owned instance — every lookup and
    /// lifecycle change funnels through here.
    pub(crate) lobby: Mutex<Lobby>,
    /// The broadcast layer: one outbound queue per connected client.
    pub(crate) peers: Mutex<HashMap<ClientId, PeerSender>>,
    /// Tables whose fourth seat just filled, keyed to the seats that
    /// have acknowledged `startPending` so far.
    pub(crate) pending_starts: Mutex<HashMap<TableId, HashSet<Seat>>>,
    pub(crate) codec: JsonCodec,
    pub(crate) start_ack_timeout: Duration,
}

/// Builder for configuring and starting a Tilehall server.
pub struct TilehallServerBuilder {
    bind_addr: String,
    start_ack_timeout: Duration,
}

impl TilehallServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:9876".to_string(),
            start_ack_timeout: DEFAULT_START_ACK_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how long to wait for start acknowledgments before treating
    /// the handshake as failed and terminating the table.
    pub fn start_ack_timeout(mut self, timeout: Duration) -> Self {
        self.start_ack_timeout = timeout;
        self
    }

    /// Binds the transport and builds the server.
    pub async fn build(self) -> Result<TilehallServer, ServerError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            lobby: Mutex::new(Lobby::new()),
            peers: Mutex::new(HashMap::new()),
            pending_starts: Mutex::new(HashMap::new()),
            codec: JsonCodec,
            start_ack_timeout: self.start_ack_timeout,
        });

        Ok(TilehallServer { transport, state })
    }
}

impl Default for TilehallServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Tilehall server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TilehallServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl TilehallServer {
    /// Creates a new builder.
    pub fn builder() -> TilehallServerBuilder {
        TilehallServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop: each accepted connection gets its own
    /// dispatcher task. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Tilehall server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(handle_connection(conn, state));
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
