//! The turn state machine.
//!
//! One state per table, advanced only through [`transition`]. The
//! machine tracks *whose action window is open*, not what the tiles
//! mean — ReadyToDiscard is the holder's discard obligation,
//! ClaimWindow is the interval in which any seat may claim the live
//! discard, and so on.

use std::fmt;

/// The table-wide turn state. Exactly one value at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// The turn holder must discard a tile.
    ReadyToDiscard,
    /// A discard is live; any seat may claim it.
    ClaimWindow,
    /// A meld was revealed (chi or concealed kong); the claimant must
    /// follow up with a combo claim or a discard.
    MeldRevealed,
    /// A kong was completed; the claimant must draw a replacement tile.
    AwaitingDraw,
    /// The round is over. Terminal — only a redeal leaves it.
    Finished,
}

impl TurnState {
    /// Returns `true` for the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadyToDiscard => write!(f, "ReadyToDiscard"),
            Self::ClaimWindow => write!(f, "ClaimWindow"),
            Self::MeldRevealed => write!(f, "MeldRevealed"),
            Self::AwaitingDraw => write!(f, "AwaitingDraw"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

/// The single declared intent accompanying a state-mutating call.
///
/// At most one reason per call — the tag makes the old "four
/// independent boolean flags" combinations unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Plain progression (a discard, a draw, a non-kong combo claim).
    None,
    /// A concealed kong revealed from the hand.
    ConcealedKong,
    /// A winning hand declared.
    Win,
    /// The live discard claimed for a chi.
    ChiClaim,
    /// The live discard claimed for a kong.
    KongClaim,
}

/// The transition table. Returns `None` for undefined cells — the
/// callers gate on allowed states first, so a `None` here means the
/// call was not legal and nothing may change.
///
/// Finished absorbs every reason; nothing but a redeal leaves it.
pub fn transition(state: TurnState, reason: Reason) -> Option<TurnState> {
    use TurnState::*;

    match (state, reason) {
        (ReadyToDiscard, Reason::None) => Some(ClaimWindow),
        (ReadyToDiscard, Reason::ConcealedKong) => Some(MeldRevealed),
        (ReadyToDiscard, Reason::Win) => Some(Finished),

        (ClaimWindow, Reason::None) => Some(ReadyToDiscard),
        (ClaimWindow, Reason::ChiClaim) => Some(MeldRevealed),
        (ClaimWindow, Reason::KongClaim) => Some(AwaitingDraw),
        (ClaimWindow, Reason::Win) => Some(Finished),

        (MeldRevealed, Reason::None) => Some(ReadyToDiscard),
        (MeldRevealed, Reason::KongClaim) => Some(AwaitingDraw),

        (AwaitingDraw, Reason::None) => Some(ReadyToDiscard),

        (Finished, _) => Some(Finished),

        _ => None,
    }
}

// =========================================================================
// Tests
// =========================================================================
