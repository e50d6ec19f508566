//! Error types for the table layer.

use tilehall_protocol::TableId;
use tilehall_transport::ClientId;

/// Capacity and lifecycle errors. Surfaced to the caller as a failed
/// join; never fatal to the table or the process.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// All four seats are taken.
    #[error("table {0} is full")]
    TableFull(TableId),

    /// The game has already started; seats are locked.
    #[error("table {0} has already started")]
    AlreadyStarted(TableId),

    /// The client already holds a seat at this table.
    #[error("client {0} is already seated at table {1}")]
    AlreadySeated(ClientId, TableId),
}

/// Why a turn operation did not happen. Both variants leave the table
/// untouched; neither produces a broadcast — the caller reads the
/// absence of a result event as rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The table guard was held by a concurrent call. This is how a
    /// lost claim race looks: the winner mutated, the loser got this.
    #[error("table guard is contended")]
    Busy,

    /// The turn state or turn ownership didn't allow the operation.
    #[error("action is not legal in the current turn state")]
    Rejected,
}
