//! Table lifecycle and turn arbitration for Tilehall.
//!
//! This crate is the core of the server: it decides which of four
//! racing connections may act at any instant, and keeps the deck, the
//! turn pointer, and the legal-action set consistent while doing so.
//!
//! # Key types
//!
//! - [`Table`] — one game room: seats, deck, turn state machine, and
//!   the exclusive guard that serializes mutation
//! - [`Lobby`] — creates, lists, recycles, and destroys tables; maps
//!   connections to the table they joined
//! - [`Deck`] — an unbiased permutation of the 136 tile ids, consumed
//!   front to back
//! - [`TurnState`] / [`Reason`] — the turn state machine and the single
//!   intent tag that drives its transitions
//!
//! # Concurrency model
//!
//! Each table owns exactly one guard. Turn operations *try* to take it
//! and fail fast with [`ActionError::Busy`] when it's contended — that
//! failure is the mechanism that resolves simultaneous claims on the
//! same discard (one winner, everyone else rejected, nobody queued).
//! Seat changes, dealing, and hand submission block instead: they are
//! not subject to the multi-claimant race and must settle
//! deterministically. Tables never block on each other.

mod deck;
mod error;
mod lobby;
mod table;
mod turn;

pub use deck::Deck;
pub use error::{ActionError, TableError};
pub use lobby::Lobby;
pub use table::{RoundStart, Table};
pub use turn::{transition, Reason, TurnState};
