//! The event surface: everything a client may send and everything the
//! server may emit.
//!
//! Both enums use internally tagged JSON (`{"type": "joinTable", ...}`)
//! with camelCase names, which is what the browser client parses.
//! Rejected or contended actions produce NO event at all — a client
//! infers rejection from the absence of the matching result broadcast.

use serde::{Deserialize, Serialize};

use crate::{Seat, TableId, TableSummary, TileId};

/// A seat's end-of-round hand: concealed tiles plus declared combos.
///
/// The combos are opaque JSON — the server collects and forwards them
/// but never inspects or validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSubmission {
    /// Concealed tiles remaining in the hand.
    pub tiles: Vec<TileId>,
    /// Declared melds, in whatever shape the client uses.
    pub combos: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// ClientEvent — inbound
// ---------------------------------------------------------------------------

/// An action request from a client.
///
/// Seat-carrying variants name the seat the client claims to act as;
/// the table checks it against the turn pointer where the operation
/// requires ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Open a new table, unless the newest table is still empty.
    CreateTable,

    /// Take the lowest free seat at the given table.
    JoinTable { table: TableId },

    /// Request the lobby listing (sent only to the requester).
    ListTables,

    /// Acknowledge receipt of `startPending`. The deal is held until
    /// all four seats have acknowledged.
    StartAck,

    /// Discard a tile from the hand. Only meaningful for the seat that
    /// currently holds the turn.
    Drop { tile: TileId },

    /// Draw the next tile from the wall.
    Draw { seat: Seat },

    /// Claim the live discard for an exposed combo (pong or kong).
    ClaimCombo {
        key: String,
        seat: Seat,
        added_tile: TileId,
        is_kong: bool,
    },

    /// Claim the live discard for a chi (run).
    DeclareChi { seat: Seat },

    /// Reveal a concealed kong from the hand.
    DeclareConcealedKong { seat: Seat },

    /// Declare a winning hand.
    DeclareWin {
        seat: Seat,
        combos: Vec<serde_json::Value>,
    },

    /// Submit the final hand for end-of-round collection.
    SubmitHand {
        seat: Seat,
        tiles: Vec<TileId>,
        combos: Vec<serde_json::Value>,
    },

    /// Give up the seat (pre-start only) and return to the lobby.
    ResetSeat,

    /// Redeal and begin a fresh round at the same table.
    RestartRound,
}

// ---------------------------------------------------------------------------
// ServerEvent — outbound
// ---------------------------------------------------------------------------

/// An event emitted by the server, either to one client or fanned out
/// to a table or the whole lobby.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// The lobby listing, in table-creation order.
    TableList { tables: Vec<TableSummary> },

    /// `createTable` was refused because the newest table is still empty.
    NotCreated,

    /// Outcome of a join: the assigned seat, or `None` when the table
    /// was full, already started, or unknown.
    JoinResult { seat: Option<Seat> },

    /// All four seats are filled; the deal is held until every seat
    /// replies with `startAck`.
    StartPending,

    /// A round begins: all four hands (13 tiles each, 14 for the
    /// starting seat) indexed by seat, and who discards first.
    Start {
        hands: Vec<Vec<TileId>>,
        starting_seat: Seat,
    },

    /// A discard was accepted.
    DropResult { tile: TileId },

    /// A draw was accepted. `None` means the wall is exhausted.
    DrawResult { tile: Option<TileId> },

    /// An exposed combo claim was accepted.
    ComboResult {
        key: String,
        seat: Seat,
        added_tile: TileId,
    },

    /// A chi claim was accepted.
    ChiResult,

    /// A concealed kong was accepted.
    HiddenKongResult,

    /// A win declaration was accepted.
    WinResult {
        seat: Seat,
        combos: Vec<serde_json::Value>,
    },

    /// Every occupied seat has submitted a hand; the full collection,
    /// in seat order.
    HandsCollected { hands: Vec<HandSubmission> },

    /// The caller's seat was released.
    ResetAck,

    /// The table was torn down (a player disconnected mid-game, or the
    /// start handshake timed out).
    Terminated,
}

// =========================================================================
// Tests
// =========================================================================
