//! Identifier types and table-wide constants.
//!
//! Everything here is a newtype over a small integer. The wrappers keep
//! the id spaces apart at compile time — a `Seat` can never be passed
//! where a `TileId` is expected, even though both are tiny integers —
//! and `#[serde(transparent)]` keeps them plain numbers on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of tiles in a full deck. Tile ids are `0..TOTAL_TILES`.
pub const TOTAL_TILES: usize = 136;

/// Tiles dealt to each seat at the start of a round (the starting seat
/// receives one extra).
pub const HAND_SIZE: usize = 13;

/// Seats at a table. Exactly four, always.
pub const SEATS: usize = 4;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a table (one game room).
///
/// Ids are small, unique among live tables, and recycled after a table
/// is destroyed — the lobby hands the lowest freed id out first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

/// One of the four fixed player slots at a table, `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seat(pub u8);

impl Seat {
    /// All four seats in order. Useful for iteration in seat order.
    pub const ALL: [Seat; SEATS] = [Seat(0), Seat(1), Seat(2), Seat(3)];

    /// The seat after this one in turn order, wrapping `3 → 0`.
    pub fn next(self) -> Seat {
        Seat((self.0 + 1) % SEATS as u8)
    }

    /// This seat as an array index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat-{}", self.0)
    }
}

/// A tile identity, `0..=135`. Each id appears exactly once per deal.
///
/// The server never interprets tile ids — suits, ranks, and meld
/// legality are entirely the client's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u8);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TableSummary
// ---------------------------------------------------------------------------

/// One entry in the lobby listing: a table and how many seats are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    /// The table's id.
    pub id: TableId,
    /// Occupied seats, `0..=4`.
    pub occupancy: u8,
}

// =========================================================================
// Tests
// =========================================================================
