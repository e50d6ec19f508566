//! Wire protocol for Tilehall.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`TableId`], [`Seat`], [`TileId`], [`TableSummary`]) —
//!   the identifiers and summaries that travel on the wire.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — the full inbound and
//!   outbound event surface of the server.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer sits between transport (raw bytes) and the table
//! layer (game state). It doesn't know about connections or tables — it
//! only knows how to describe and serialize events.

mod codec;
mod error;
mod events;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use events::{ClientEvent, HandSubmission, ServerEvent};
pub use types::{
    Seat, TableId, TableSummary, TileId, HAND_SIZE, SEATS, TOTAL_TILES,
};
