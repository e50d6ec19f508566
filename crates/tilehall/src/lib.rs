//! # Tilehall
//!
//! Coordination server for four-seat, turn-based tile games.
//!
//! Tilehall arbitrates which of four independently connected clients
//! may act at any instant, deals and tracks a shared 136-tile deck, and
//! runs many tables concurrently in one process. It is rules-agnostic:
//! clients judge melds and scores, the server judges *turn order*.
//!
//! The layers, bottom up:
//!
//! - [`tilehall_transport`] — WebSocket connections and client identity
//! - [`tilehall_protocol`] — the JSON event surface and codec
//! - [`tilehall_table`] — the table state machine and lobby registry
//! - this crate — the dispatcher tying inbound events to table
//!   operations and fanning results back out
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tilehall::TilehallServer;
//!
//! # async fn run() -> Result<(), tilehall::ServerError> {
//! let server = TilehallServer::builder()
//!     .bind("0.0.0.0:9876")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod dispatcher;
mod error;
mod server;

pub use error::ServerError;
pub use server::{TilehallServer, TilehallServerBuilder};
