//! One table: four seats, a deck, and the turn arbitration guard.
//!
//! All mutable game state lives behind a single mutex. Turn operations
//! take it with `try_lock` and fail fast — when four connections race
//! to claim the same discard, exactly one acquisition succeeds and the
//! rest observe [`ActionError::Busy`] without queuing. Seat changes,
//! dealing, and hand submission take the guard blocking: they are not
//! part of the claim race and must settle deterministically.
//!
//! The critical sections are short, CPU-only, and never await, so a
//! `std::sync::Mutex` is the right guard even though callers are async.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use rand::Rng;
use tilehall_protocol::{
    HandSubmission, Seat, TableId, TableSummary, TileId, HAND_SIZE, SEATS,
};
use tilehall_transport::ClientId;

use crate::deck::Deck;
use crate::error::{ActionError, TableError};
use crate::turn::{transition, Reason, TurnState};

/// The payload of a fresh deal: all four hands (indexed by seat; 13
/// tiles each, 14 for the starting seat) and who discards first.
#[derive(Debug, Clone)]
pub struct RoundStart {
    pub hands: Vec<Vec<TileId>>,
    pub starting_seat: Seat,
}

/// One game room. Owns its deck, seat table, and turn state
/// exclusively — the lobby never reaches inside, and no two tables
/// ever block on each other.
pub struct Table {
    id: TableId,
    /// Occupied-seat count, readable without the guard (lobby
    /// summaries poll this on every listing).
    occupancy: AtomicU8,
    /// Flips to `true` exactly once, via `can_start`. Never reverts
    /// for the life of the table; redeals don't touch it.
    started: AtomicBool,
    inner: Mutex<TableInner>,
}

struct TableInner {
    free_seats: BTreeSet<Seat>,
    /// Bijection onto the occupied seats: one client per seat, one
    /// seat per client.
    seats: HashMap<ClientId, Seat>,
    deck: Deck,
    turn: Seat,
    state: TurnState,
    submissions: [Option<HandSubmission>; SEATS],
}

impl TableInner {
    /// Applies `reason` if the current state is one of `allowed`;
    /// rejects without touching anything otherwise.
    fn advance(
        &mut self,
        allowed: &[TurnState],
        reason: Reason,
    ) -> Result<(), ActionError> {
        if !allowed.contains(&self.state) {
            return Err(ActionError::Rejected);
        }
        match transition(self.state, reason) {
            Some(next) => {
                self.state = next;
                Ok(())
            }
            None => Err(ActionError::Rejected),
        }
    }
}

impl Table {
    /// Creates an empty, unstarted table.
    pub fn new(id: TableId) -> Self {
        Self {
            id,
            occupancy: AtomicU8::new(0),
            started: AtomicBool::new(false),
            inner: Mutex::new(TableInner {
                free_seats: Seat::ALL.into_iter().collect(),
                seats: HashMap::new(),
                deck: Deck::default(),
                turn: Seat(0),
                state: TurnState::ReadyToDiscard,
                submissions: Default::default(),
            }),
        }
    }

    /// Blocking guard acquisition. A poisoned guard is recovered, not
    /// propagated — no invariant here spans a panic point.
    fn guard(&self) -> MutexGuard<'_, TableInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Non-blocking guard acquisition; `None` means another call holds
    /// the guard right now.
    fn try_guard(&self) -> Option<MutexGuard<'_, TableInner>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    // -----------------------------------------------------------------
    // Seat management
    // -----------------------------------------------------------------

    /// Seats a client on the lowest free seat.
    pub fn join(&self, client: ClientId) -> Result<Seat, TableError> {
        let mut inner = self.guard();

        if self.started.load(Ordering::Relaxed) {
            return Err(TableError::AlreadyStarted(self.id));
        }
        if inner.seats.contains_key(&client) {
            return Err(TableError::AlreadySeated(client, self.id));
        }
        let Some(seat) = inner.free_seats.pop_first() else {
            return Err(TableError::TableFull(self.id));
        };

        inner.seats.insert(client, seat);
        self.occupancy
            .store(inner.seats.len() as u8, Ordering::Relaxed);

        tracing::info!(
            table = %self.id,
            %client,
            %seat,
            occupancy = inner.seats.len(),
            "client seated"
        );
        Ok(seat)
    }

    /// Frees the client's seat. No-op for clients without a seat here;
    /// returns the freed seat otherwise.
    pub fn leave(&self, client: ClientId) -> Option<Seat> {
        let mut inner = self.guard();

        let seat = inner.seats.remove(&client)?;
        inner.free_seats.insert(seat);
        self.occupancy
            .store(inner.seats.len() as u8, Ordering::Relaxed);

        tracing::info!(
            table = %self.id,
            %client,
            %seat,
            occupancy = inner.seats.len(),
            "client left"
        );
        Some(seat)
    }

    /// Single-use start gate: `true` exactly when all four seats are
    /// occupied and the game has not started, and flipping `started`
    /// as a side effect. Of all callers racing on the fourth join,
    /// exactly one observes `true` and gets to run the deal.
    pub fn can_start(&self) -> bool {
        let inner = self.guard();
        let ready =
            inner.seats.len() == SEATS && !self.started.load(Ordering::Relaxed);
        if ready {
            self.started.store(true, Ordering::Relaxed);
        }
        ready
    }

    // -----------------------------------------------------------------
    // Dealing
    // -----------------------------------------------------------------

    /// Deals a fresh round: new shuffled deck, 13 tiles per occupied
    /// seat in seat order, one extra to a uniformly chosen starting
    /// seat. Resets the turn pointer, the turn state, and the hand
    /// submissions. Also serves as the restart inside a running table.
    pub fn deal(&self) -> RoundStart {
        let mut inner = self.guard();
        let mut rng = rand::rng();

        let occupied: Vec<Seat> = Seat::ALL
            .into_iter()
            .filter(|s| !inner.free_seats.contains(s))
            .collect();
        debug_assert_eq!(occupied.len(), SEATS, "deal on a non-full table");

        // 4×13 + 1 = 53 draws from a 136-tile deck cannot exhaust it.
        let mut deck = Deck::shuffled(&mut rng);
        let mut hands: Vec<Vec<TileId>> = vec![Vec::new(); SEATS];
        for &seat in &occupied {
            for _ in 0..HAND_SIZE {
                let tile =
                    deck.draw().expect("fresh deck covers the full deal");
                hands[seat.index()].push(tile);
            }
        }
        let starting_seat = occupied[rng.random_range(0..occupied.len())];
        let extra = deck.draw().expect("fresh deck covers the full deal");
        hands[starting_seat.index()].push(extra);

        inner.deck = deck;
        inner.turn = starting_seat;
        inner.state = TurnState::ReadyToDiscard;
        inner.submissions = Default::default();

        tracing::info!(
            table = %self.id,
            %starting_seat,
            wall = inner.deck.remaining(),
            "round dealt"
        );
        RoundStart {
            hands,
            starting_seat,
        }
    }

    // -----------------------------------------------------------------
    // Turn operations (try-lock, fail-fast)
    // -----------------------------------------------------------------

    /// Draws the next wall tile for the turn holder. `Ok(None)` means
    /// the wall is exhausted — the transition still applies and the
    /// round is expected to end by other means.
    pub fn draw(&self, seat: Seat) -> Result<Option<TileId>, ActionError> {
        let mut inner = self.try_guard().ok_or(ActionError::Busy)?;
        if inner.turn != seat {
            return Err(ActionError::Rejected);
        }
        inner.advance(
            &[TurnState::AwaitingDraw, TurnState::ClaimWindow],
            Reason::None,
        )?;
        Ok(inner.deck.draw())
    }

    /// Discards a tile. The caller is implicitly the turn holder; the
    /// pointer advances to the next seat and the claim window opens.
    pub fn discard(&self) -> Result<(), ActionError> {
        let mut inner = self.try_guard().ok_or(ActionError::Busy)?;
        inner.advance(&[TurnState::ReadyToDiscard], Reason::None)?;
        inner.turn = inner.turn.next();
        Ok(())
    }

    /// Reveals a concealed kong from the turn holder's hand.
    pub fn declare_concealed_kong(&self, seat: Seat) -> Result<(), ActionError> {
        let mut inner = self.try_guard().ok_or(ActionError::Busy)?;
        if inner.turn != seat {
            return Err(ActionError::Rejected);
        }
        inner.advance(&[TurnState::ReadyToDiscard], Reason::ConcealedKong)
    }

    /// Claims the live discard for a chi. The turn pointer does NOT
    /// move — that asymmetry with `claim_combo` is deliberate and
    /// pinned by regression test.
    pub fn declare_chi(&self, seat: Seat) -> Result<(), ActionError> {
        let mut inner = self.try_guard().ok_or(ActionError::Busy)?;
        if inner.turn != seat {
            return Err(ActionError::Rejected);
        }
        inner.advance(&[TurnState::ClaimWindow], Reason::ChiClaim)
    }

    /// Claims the live discard (or completes a revealed meld) for an
    /// exposed combo. Any seat may claim; the turn moves to the
    /// claimant.
    pub fn claim_combo(
        &self,
        seat: Seat,
        is_kong: bool,
    ) -> Result<(), ActionError> {
        let mut inner = self.try_guard().ok_or(ActionError::Busy)?;
        let reason = if is_kong {
            Reason::KongClaim
        } else {
            Reason::None
        };
        inner.advance(
            &[TurnState::ClaimWindow, TurnState::MeldRevealed],
            reason,
        )?;
        inner.turn = seat;
        Ok(())
    }

    /// Declares a win: by the turn holder on their own discard window,
    /// or by any claimant while a discard is live. The turn moves to
    /// the winner and the table reaches its terminal state.
    pub fn declare_win(&self, seat: Seat) -> Result<(), ActionError> {
        let mut inner = self.try_guard().ok_or(ActionError::Busy)?;
        if inner.turn == seat && inner.state == TurnState::ReadyToDiscard {
            inner.advance(&[TurnState::ReadyToDiscard], Reason::Win)?;
        } else {
            inner.advance(&[TurnState::ClaimWindow], Reason::Win)?;
        }
        inner.turn = seat;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Hand collection
    // -----------------------------------------------------------------

    /// Records a seat's end-of-round hand. Returns the full collection
    /// (seat order) once every occupied seat has submitted, `None`
    /// until then. A seat re-submitting before the round completes
    /// replaces its earlier payload.
    pub fn submit_hand(
        &self,
        seat: Seat,
        submission: HandSubmission,
    ) -> Option<Vec<HandSubmission>> {
        let mut inner = self.guard();
        inner.submissions[seat.index()] = Some(submission);

        let occupied: Vec<usize> = Seat::ALL
            .into_iter()
            .filter(|s| !inner.free_seats.contains(s))
            .map(Seat::index)
            .collect();
        if occupied
            .iter()
            .all(|&i| inner.submissions[i].is_some())
        {
            Some(
                occupied
                    .iter()
                    .filter_map(|&i| inner.submissions[i].clone())
                    .collect(),
            )
        } else {
            None
        }
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// The table's id.
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Occupied-seat count. Lock-free.
    pub fn occupancy(&self) -> u8 {
        self.occupancy.load(Ordering::Relaxed)
    }

    /// `true` when no seat is occupied. Lock-free.
    pub fn is_empty(&self) -> bool {
        self.occupancy() == 0
    }

    /// Whether the game has ever started. Lock-free.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }

    /// Lobby-listing entry for this table.
    pub fn summary(&self) -> TableSummary {
        TableSummary {
            id: self.id,
            occupancy: self.occupancy(),
        }
    }

    /// The clients currently seated, in no particular order.
    pub fn clients(&self) -> Vec<ClientId> {
        self.guard().seats.keys().copied().collect()
    }

    /// The seat a client occupies here, if any.
    pub fn seat_of(&self, client: ClientId) -> Option<Seat> {
        self.guard().seats.get(&client).copied()
    }

    /// The current turn state.
    pub fn turn_state(&self) -> TurnState {
        self.guard().state
    }

    /// The seat whose action window is logically open.
    pub fn turn(&self) -> Seat {
        self.guard().turn
    }

    /// Tiles left in the wall.
    pub fn wall_remaining(&self) -> usize {
        self.guard().deck.remaining()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn cid(id: u64) -> ClientId {
        ClientId::new(id)
    }

    /// A table with all four seats occupied by clients 0..4.
    fn full_table() -> Table {
        let table = Table::new(TableId(0));
        for n in 0..4 {
            table.join(cid(n)).expect("seat should be free");
        }
        table
    }

    /// A full table with a dealt round; returns the starting seat.
    fn dealt_table() -> (Table, Seat) {
        let table = full_table();
        assert!(table.can_start());
        let round = table.deal();
        let starting = round.starting_seat;
        (table, starting)
    }

    // =====================================================================
    // join() / leave()
    // =====================================================================

    #[test]
    fn test_join_assigns_lowest_free_seat_in_order() {
        let table = Table::new(TableId(0));
        for n in 0..4 {
            let seat = table.join(cid(n)).expect("seat should be free");
            assert_eq!(seat, Seat(n as u8));
        }
        assert_eq!(table.occupancy(), 4);
    }

    #[test]
    fn test_join_full_table_returns_table_full() {
        let table = full_table();
        let result = table.join(cid(99));
        assert!(matches!(result, Err(TableError::TableFull(_))));
        assert_eq!(table.occupancy(), 4);
    }

    #[test]
    fn test_join_after_start_returns_already_started() {
        let table = full_table();
        assert!(table.can_start());
        table.leave(cid(0));

        // A seat is free, but the game is running — no late joins.
        let result = table.join(cid(99));
        assert!(matches!(result, Err(TableError::AlreadyStarted(_))));
    }

    #[test]
    fn test_join_twice_returns_already_seated() {
        let table = Table::new(TableId(0));
        table.join(cid(1)).unwrap();
        let result = table.join(cid(1));
        assert!(matches!(result, Err(TableError::AlreadySeated(..))));
        assert_eq!(table.occupancy(), 1);
    }

    #[test]
    fn test_leave_frees_seat_for_reassignment_lowest_first() {
        let table = Table::new(TableId(0));
        table.join(cid(0)).unwrap(); // seat 0
        table.join(cid(1)).unwrap(); // seat 1
        table.join(cid(2)).unwrap(); // seat 2

        assert_eq!(table.leave(cid(1)), Some(Seat(1)));
        assert_eq!(table.occupancy(), 2);

        // Seat 1 is now the lowest free seat and goes out next.
        assert_eq!(table.join(cid(3)).unwrap(), Seat(1));
    }

    #[test]
    fn test_leave_unknown_client_is_noop() {
        let table = Table::new(TableId(0));
        table.join(cid(0)).unwrap();

        assert_eq!(table.leave(cid(42)), None);
        assert_eq!(table.occupancy(), 1);
    }

    #[test]
    fn test_seats_stay_unique_across_churn() {
        let table = Table::new(TableId(0));
        table.join(cid(0)).unwrap();
        table.join(cid(1)).unwrap();
        table.leave(cid(0));
        table.join(cid(2)).unwrap();
        table.join(cid(3)).unwrap();
        table.join(cid(4)).unwrap();

        let seats: HashSet<Seat> = [cid(1), cid(2), cid(3), cid(4)]
            .into_iter()
            .filter_map(|c| table.seat_of(c))
            .collect();
        assert_eq!(seats.len(), 4, "every occupant holds a distinct seat");
    }

    // =====================================================================
    // can_start()
    // =====================================================================

    #[test]
    fn test_can_start_false_below_four_occupants() {
        let table = Table::new(TableId(0));
        for n in 0..3 {
            table.join(cid(n)).unwrap();
            assert!(!table.can_start());
        }
        assert!(!table.is_started());
    }

    #[test]
    fn test_can_start_true_exactly_once() {
        let table = full_table();

        assert!(table.can_start(), "first caller wins the gate");
        assert!(table.is_started());
        assert!(!table.can_start(), "the gate is single-use");
        assert!(table.is_started(), "started never reverts");
    }

    // =====================================================================
    // deal()
    // =====================================================================

    #[test]
    fn test_deal_partitions_the_tile_space() {
        use tilehall_protocol::TOTAL_TILES;

        let (table, _) = dealt_table();
        let round = table.deal(); // redeal; same invariants

        let mut seen = HashSet::new();
        for hand in &round.hands {
            for tile in hand {
                assert!((tile.0 as usize) < TOTAL_TILES);
                assert!(seen.insert(*tile), "tile {tile} dealt twice");
            }
        }
        assert_eq!(seen.len(), 4 * HAND_SIZE + 1);

        // 13 tiles per seat, 14 for the starting seat.
        for (index, hand) in round.hands.iter().enumerate() {
            let expected = if Seat(index as u8) == round.starting_seat {
                HAND_SIZE + 1
            } else {
                HAND_SIZE
            };
            assert_eq!(hand.len(), expected, "hand size for seat {index}");
        }
    }

    #[test]
    fn test_deal_leaves_83_wall_tiles_and_opens_on_starting_seat() {
        let (table, starting) = dealt_table();

        assert_eq!(table.wall_remaining(), 136 - (4 * 13 + 1));
        assert_eq!(table.turn_state(), TurnState::ReadyToDiscard);
        assert_eq!(table.turn(), starting);
    }

    #[test]
    fn test_redeal_resets_terminal_state_and_submissions() {
        let (table, starting) = dealt_table();
        table.declare_win(starting).unwrap();
        assert_eq!(table.turn_state(), TurnState::Finished);
        assert!(table
            .submit_hand(Seat(0), submission(&[1]))
            .is_none());

        let round = table.deal();

        assert_eq!(table.turn_state(), TurnState::ReadyToDiscard);
        assert_eq!(table.turn(), round.starting_seat);
        assert!(table.is_started(), "redeal does not re-flip started");

        // Submissions were cleared: three fresh ones don't complete.
        for n in 0..3 {
            assert!(table
                .submit_hand(Seat(n), submission(&[n as u8]))
                .is_none());
        }
    }

    // =====================================================================
    // Turn operations
    // =====================================================================

    #[test]
    fn test_discard_opens_claim_window_and_advances_pointer() {
        let (table, starting) = dealt_table();

        table.discard().expect("discard from ReadyToDiscard");

        assert_eq!(table.turn_state(), TurnState::ClaimWindow);
        assert_eq!(table.turn(), starting.next());
    }

    #[test]
    fn test_second_discard_is_rejected_and_changes_nothing() {
        let (table, starting) = dealt_table();
        table.discard().unwrap();

        assert_eq!(table.discard(), Err(ActionError::Rejected));
        assert_eq!(table.turn_state(), TurnState::ClaimWindow);
        assert_eq!(table.turn(), starting.next());
    }

    #[test]
    fn test_draw_allowed_from_claim_window() {
        // `draw` is legal from ClaimWindow as well as AwaitingDraw.
        // Regression pin: preserve this exactly, do not "fix" it.
        let (table, _) = dealt_table();
        table.discard().unwrap();

        let holder = table.turn();
        let tile = table.draw(holder).expect("draw from ClaimWindow");

        assert!(tile.is_some());
        assert_eq!(table.turn_state(), TurnState::ReadyToDiscard);
        assert_eq!(table.turn(), holder, "draw does not move the pointer");
    }

    #[test]
    fn test_draw_by_non_holder_is_rejected() {
        let (table, _) = dealt_table();
        table.discard().unwrap();

        let holder = table.turn();
        let other = holder.next();
        assert_eq!(table.draw(other), Err(ActionError::Rejected));
        assert_eq!(table.turn_state(), TurnState::ClaimWindow);
    }

    #[test]
    fn test_draw_allowed_after_kong_claim() {
        let (table, _) = dealt_table();
        table.discard().unwrap();

        let claimant = Seat(2);
        table.claim_combo(claimant, true).unwrap();
        assert_eq!(table.turn_state(), TurnState::AwaitingDraw);

        let tile = table.draw(claimant).expect("replacement draw");
        assert!(tile.is_some());
        assert_eq!(table.turn_state(), TurnState::ReadyToDiscard);
    }

    #[test]
    fn test_draw_from_ready_to_discard_is_rejected() {
        let (table, starting) = dealt_table();
        assert_eq!(table.draw(starting), Err(ActionError::Rejected));
        assert_eq!(table.turn_state(), TurnState::ReadyToDiscard);
    }

    #[test]
    fn test_exhausted_wall_returns_none_and_still_transitions() {
        let (table, _) = dealt_table();

        // Walk discard/draw cycles until the 83-tile wall is gone.
        for _ in 0..83 {
            table.discard().unwrap();
            let holder = table.turn();
            assert!(table.draw(holder).unwrap().is_some());
        }

        table.discard().unwrap();
        let holder = table.turn();
        assert_eq!(table.draw(holder), Ok(None), "wall is exhausted");
        assert_eq!(
            table.turn_state(),
            TurnState::ReadyToDiscard,
            "the transition applies even with no tile"
        );
    }

    #[test]
    fn test_concealed_kong_reveals_meld_without_moving_pointer() {
        let (table, starting) = dealt_table();

        table.declare_concealed_kong(starting).unwrap();

        assert_eq!(table.turn_state(), TurnState::MeldRevealed);
        assert_eq!(table.turn(), starting);
    }

    #[test]
    fn test_concealed_kong_by_non_holder_is_rejected() {
        let (table, starting) = dealt_table();

        let result = table.declare_concealed_kong(starting.next());

        assert_eq!(result, Err(ActionError::Rejected));
        assert_eq!(table.turn_state(), TurnState::ReadyToDiscard);
    }

    #[test]
    fn test_declare_chi_does_not_move_turn_pointer() {
        // Chi leaves the pointer where the discard put it, while
        // claim_combo moves it. The asymmetry is deliberate — pinned
        // here, not "fixed".
        let (table, starting) = dealt_table();
        table.discard().unwrap();
        let holder = table.turn();
        assert_eq!(holder, starting.next());

        table.declare_chi(holder).unwrap();

        assert_eq!(table.turn_state(), TurnState::MeldRevealed);
        assert_eq!(table.turn(), holder, "chi must not move the pointer");
    }

    #[test]
    fn test_declare_chi_by_non_holder_is_rejected() {
        let (table, _) = dealt_table();
        table.discard().unwrap();

        let other = table.turn().next();
        assert_eq!(table.declare_chi(other), Err(ActionError::Rejected));
        assert_eq!(table.turn_state(), TurnState::ClaimWindow);
    }

    #[test]
    fn test_kong_claim_moves_pointer_to_claimant() {
        // From ClaimWindow, a kong claim always lands in AwaitingDraw
        // with the pointer on the claimant, whoever held it before.
        for claimant in Seat::ALL {
            let (table, _) = dealt_table();
            table.discard().unwrap();

            table.claim_combo(claimant, true).unwrap();

            assert_eq!(table.turn_state(), TurnState::AwaitingDraw);
            assert_eq!(table.turn(), claimant);
        }
    }

    #[test]
    fn test_plain_combo_claim_returns_to_discard_on_claimant() {
        let (table, _) = dealt_table();
        table.discard().unwrap();

        let claimant = Seat(3);
        table.claim_combo(claimant, false).unwrap();

        assert_eq!(table.turn_state(), TurnState::ReadyToDiscard);
        assert_eq!(table.turn(), claimant);
    }

    #[test]
    fn test_combo_claim_completes_revealed_meld() {
        let (table, starting) = dealt_table();
        table.declare_concealed_kong(starting).unwrap();
        assert_eq!(table.turn_state(), TurnState::MeldRevealed);

        table.claim_combo(starting, true).unwrap();

        assert_eq!(table.turn_state(), TurnState::AwaitingDraw);
        assert_eq!(table.turn(), starting);
    }

    #[test]
    fn test_combo_claim_outside_window_is_rejected() {
        let (table, _) = dealt_table();
        // State is ReadyToDiscard — no discard is live.
        assert_eq!(
            table.claim_combo(Seat(1), true),
            Err(ActionError::Rejected)
        );
        assert_eq!(table.turn_state(), TurnState::ReadyToDiscard);
    }

    #[test]
    fn test_win_by_holder_on_own_discard_window() {
        let (table, starting) = dealt_table();

        table.declare_win(starting).unwrap();

        assert_eq!(table.turn_state(), TurnState::Finished);
        assert_eq!(table.turn(), starting);
    }

    #[test]
    fn test_win_by_claimant_during_claim_window() {
        let (table, _) = dealt_table();
        table.discard().unwrap();

        // Any seat may win off the live discard, holder or not.
        let claimant = table.turn().next().next();
        table.declare_win(claimant).unwrap();

        assert_eq!(table.turn_state(), TurnState::Finished);
        assert_eq!(table.turn(), claimant);
    }

    #[test]
    fn test_win_by_non_holder_outside_claim_window_is_rejected() {
        let (table, starting) = dealt_table();

        let result = table.declare_win(starting.next());

        assert_eq!(result, Err(ActionError::Rejected));
        assert_eq!(table.turn_state(), TurnState::ReadyToDiscard);
    }

    #[test]
    fn test_finished_rejects_every_turn_operation() {
        let (table, starting) = dealt_table();
        table.declare_win(starting).unwrap();

        assert_eq!(table.discard(), Err(ActionError::Rejected));
        assert_eq!(table.draw(starting), Err(ActionError::Rejected));
        assert_eq!(
            table.declare_concealed_kong(starting),
            Err(ActionError::Rejected)
        );
        assert_eq!(table.declare_chi(starting), Err(ActionError::Rejected));
        assert_eq!(
            table.claim_combo(starting, true),
            Err(ActionError::Rejected)
        );
        assert_eq!(table.declare_win(starting), Err(ActionError::Rejected));

        assert_eq!(table.turn_state(), TurnState::Finished);
        assert_eq!(table.turn(), starting);
    }

    #[test]
    fn test_contended_guard_fails_fast_with_busy() {
        let (table, starting) = dealt_table();

        // Hold the guard the way a concurrent winner would.
        let _held = table.inner.try_lock().expect("uncontended");

        assert_eq!(table.discard(), Err(ActionError::Busy));
        assert_eq!(table.draw(starting), Err(ActionError::Busy));
        assert_eq!(table.declare_chi(starting), Err(ActionError::Busy));
        assert_eq!(
            table.claim_combo(starting, false),
            Err(ActionError::Busy)
        );
        assert_eq!(table.declare_win(starting), Err(ActionError::Busy));
        assert_eq!(
            table.declare_concealed_kong(starting),
            Err(ActionError::Busy)
        );
    }

    // =====================================================================
    // submit_hand()
    // =====================================================================

    fn submission(tiles: &[u8]) -> HandSubmission {
        HandSubmission {
            tiles: tiles.iter().copied().map(TileId).collect(),
            combos: Vec::new(),
        }
    }

    #[test]
    fn test_submit_hand_incomplete_until_all_four() {
        let (table, _) = dealt_table();

        for n in 0..3 {
            assert!(
                table.submit_hand(Seat(n), submission(&[n as u8])).is_none(),
                "round incomplete after {} submissions",
                n + 1
            );
        }

        let collected = table
            .submit_hand(Seat(3), submission(&[3]))
            .expect("fourth submission completes the round");
        assert_eq!(collected.len(), 4);
        // Seat order, not submission order.
        for (index, hand) in collected.iter().enumerate() {
            assert_eq!(hand.tiles, vec![TileId(index as u8)]);
        }
    }

    #[test]
    fn test_submit_hand_resubmission_replaces_earlier_payload() {
        let (table, _) = dealt_table();

        table.submit_hand(Seat(0), submission(&[1]));
        table.submit_hand(Seat(0), submission(&[2]));
        table.submit_hand(Seat(1), submission(&[10]));
        table.submit_hand(Seat(2), submission(&[20]));

        let collected = table
            .submit_hand(Seat(3), submission(&[30]))
            .expect("complete");
        assert_eq!(collected[0].tiles, vec![TileId(2)], "last payload wins");
    }

    // =====================================================================
    // Queries
    // =====================================================================

    #[test]
    fn test_summary_reflects_occupancy() {
        let table = Table::new(TableId(7));
        assert_eq!(table.summary().id, TableId(7));
        assert_eq!(table.summary().occupancy, 0);
        assert!(table.is_empty());

        table.join(cid(1)).unwrap();
        assert_eq!(table.summary().occupancy, 1);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_clients_and_seat_of_track_occupants() {
        let table = Table::new(TableId(0));
        table.join(cid(10)).unwrap();
        table.join(cid(20)).unwrap();

        let clients: HashSet<ClientId> =
            table.clients().into_iter().collect();
        assert_eq!(clients, HashSet::from([cid(10), cid(20)]));
        assert_eq!(table.seat_of(cid(10)), Some(Seat(0)));
        assert_eq!(table.seat_of(cid(20)), Some(Seat(1)));
        assert_eq!(table.seat_of(cid(99)), None);
    }
}
