//! The deck: a shuffled sequence of the 136 tile ids.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use tilehall_protocol::{TileId, TOTAL_TILES};

/// An ordered deck of tile ids, consumed from the front.
///
/// A fresh deck is an unbiased permutation of `0..136`; every draw
/// shortens it and nothing ever puts a tile back. An exhausted deck is
/// not an error — [`draw`](Deck::draw) just starts returning `None` and
/// the round is expected to end by other means.
#[derive(Debug, Default)]
pub struct Deck {
    tiles: VecDeque<TileId>,
}

impl Deck {
    /// Builds a full deck as a uniformly random permutation of the
    /// 136 tile ids.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut tiles: Vec<TileId> =
            (0..TOTAL_TILES as u8).map(TileId).collect();
        tiles.shuffle(rng);
        Self {
            tiles: tiles.into(),
        }
    }

    /// Removes and returns the front tile, or `None` when exhausted.
    pub fn draw(&mut self) -> Option<TileId> {
        self.tiles.pop_front()
    }

    /// Tiles left in the deck.
    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }

    /// Returns `true` when no tiles are left.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
