//! Stack'em engine: dealing, placement, scoring and winnings.
//!
//! ## Phases
//!
//! ```text
//! Idle --deal--> Holding --place--> Holding | Idle
//!                   |
//!                   +--place Ace---> AwaitingAceChoice --choose_ace--> Holding | Idle
//!                   +--place Wild--> AwaitingWildChoice --choose_wild--> Holding | Idle
//! Idle --deal (deck spent)--> Exhausted
//! ```
//!
//! Every operation returns `Err` without touching state when it is not
//! legal, so a host can ignore refusals.

use std::time::Instant;

use im::Vector;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info};

use super::grid::{Grid, SlotIndex};
use super::layout::Point;
use super::scoring::{score_placement, PlacementScore, TARGET};
use crate::cards::{build_deck_excluding, Card, CardId, CardKind, Rank, Suit};
use crate::core::{GameError, GameRng, GameRngState, LevelChange, Session, StackemConfig};
use crate::persistence::GameKey;

/// Values an Ace may take.
pub const ACE_VALUES: [u8; 2] = [1, 11];

/// Cards in hand. Index 0 is the top card, the only one that can be placed.
pub type Hand = SmallVec<[Card; 4]>;

/// Wild card value choices.
pub type WildOptions = SmallVec<[u8; 11]>;

/// Where the engine is in its turn cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Hand empty; waiting for a deal.
    Idle,
    /// Cards in hand.
    Holding,
    /// An Ace was dropped on `slot`; waiting for 1 or 11.
    AwaitingAceChoice { card: Card, slot: SlotIndex },
    /// A Wild was dropped on `slot`; waiting for one of `options`.
    AwaitingWildChoice {
        card: Card,
        slot: SlotIndex,
        options: WildOptions,
    },
    /// No more deals this game.
    Exhausted,
}

/// Result of a deal request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DealOutcome {
    /// Cards moved into hand, possibly from a fresh deck.
    Dealt { cards: Hand, reshuffled: bool },
    /// Reshuffle limit reached; the game is over.
    Exhausted,
}

/// A card locked onto the board and the line results it produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub card: Card,
    pub slot: SlotIndex,
    pub score: PlacementScore,
    /// Chips added to session winnings by this placement.
    pub won: u64,
    /// Session winnings wiped by a bust.
    pub forfeited: u64,
}

/// Result of a placement request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed(Placement),
    AwaitingAce { slot: SlotIndex },
    AwaitingWild { slot: SlotIndex, options: WildOptions },
    /// A swap card replaced `displaced`, which is now the top of the hand.
    Swapped { slot: SlotIndex, displaced: Card },
}

/// Summary returned when a game is abandoned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndGameSummary {
    /// Uncollected session winnings that were lost.
    pub forfeited: u64,
    pub cards_placed: usize,
    /// Level change applied from a pending level check, if any.
    pub level_change: Option<LevelChange>,
}

/// Serializable engine state, excluding the session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StackemSnapshot {
    config: StackemConfig,
    rng: GameRngState,
    deck: Vector<Card>,
    hand: Hand,
    grid: Grid,
    phase: Phase,
    session_winnings: u64,
    ante_locked: bool,
    reshuffles: u32,
    next_card_id: u32,
    level_check_pending: bool,
}

impl StackemSnapshot {
    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GameError> {
        bincode::serialize(self).map_err(|e| GameError::Snapshot(e.to_string()))
    }

    /// Decode from bincode.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GameError> {
        bincode::deserialize(bytes).map_err(|e| GameError::Snapshot(e.to_string()))
    }
}

/// The Stack'em game engine.
pub struct StackemEngine {
    config: StackemConfig,
    session: Session,
    rng: GameRng,
    /// Current deck in deal order, dealt cards flagged in place.
    deck: Vector<Card>,
    hand: Hand,
    grid: Grid,
    phase: Phase,
    session_winnings: u64,
    ante_locked: bool,
    reshuffles: u32,
    next_card_id: u32,
    level_check_due: Option<Instant>,
}

impl StackemEngine {
    /// Start a game: build the deck and seed the board for the difficulty.
    pub fn new(config: StackemConfig, session: Session, seed: u64) -> Result<Self, GameError> {
        config.validate()?;

        let mut engine = Self {
            config,
            session,
            rng: GameRng::new(seed).for_context("stackem"),
            deck: Vector::new(),
            hand: Hand::new(),
            grid: Grid::new(),
            phase: Phase::Idle,
            session_winnings: 0,
            ante_locked: false,
            reshuffles: 0,
            next_card_id: 0,
            level_check_due: None,
        };
        engine.start_board();
        Ok(engine)
    }

    /// Rebuild an engine from a snapshot. A level check that was pending
    /// when the snapshot was taken is rescheduled relative to `now`.
    pub fn restore(snapshot: StackemSnapshot, session: Session, now: Instant) -> Result<Self, GameError> {
        snapshot.config.validate()?;
        let level_check_due = snapshot
            .level_check_pending
            .then(|| now + snapshot.config.level_check_delay);

        Ok(Self {
            rng: GameRng::from_state(&snapshot.rng),
            config: snapshot.config,
            session,
            deck: snapshot.deck,
            hand: snapshot.hand,
            grid: snapshot.grid,
            phase: snapshot.phase,
            session_winnings: snapshot.session_winnings,
            ante_locked: snapshot.ante_locked,
            reshuffles: snapshot.reshuffles,
            next_card_id: snapshot.next_card_id,
            level_check_due,
        })
    }

    /// Capture engine state.
    #[must_use]
    pub fn snapshot(&self) -> StackemSnapshot {
        StackemSnapshot {
            config: self.config.clone(),
            rng: self.rng.state(),
            deck: self.deck.clone(),
            hand: self.hand.clone(),
            grid: self.grid.clone(),
            phase: self.phase.clone(),
            session_winnings: self.session_winnings,
            ante_locked: self.ante_locked,
            reshuffles: self.reshuffles,
            next_card_id: self.next_card_id,
            level_check_pending: self.level_check_due.is_some(),
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &StackemConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Hand the session back when the screen unmounts.
    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn ante(&self) -> u64 {
        self.config.ante
    }

    #[must_use]
    pub fn is_ante_locked(&self) -> bool {
        self.ante_locked
    }

    #[must_use]
    pub fn session_winnings(&self) -> u64 {
        self.session_winnings
    }

    /// Fresh decks used so far.
    #[must_use]
    pub fn reshuffles(&self) -> u32 {
        self.reshuffles
    }

    /// Cards of the current deck not yet dealt.
    #[must_use]
    pub fn undealt_count(&self) -> usize {
        self.deck.iter().filter(|c| !c.is_dealt).count()
    }

    /// The current deck in deal order.
    pub fn deck(&self) -> impl Iterator<Item = &Card> {
        self.deck.iter()
    }

    /// True once a level check is scheduled but not yet applied.
    #[must_use]
    pub fn level_check_pending(&self) -> bool {
        self.level_check_due.is_some()
    }

    // === Actions ===

    /// Change the ante. Only allowed before the first deal.
    pub fn set_ante(&mut self, ante: u64) -> Result<(), GameError> {
        if self.ante_locked {
            return Err(GameError::invalid("ante is locked"));
        }
        if ante == 0 {
            return Err(GameError::invalid("ante must be positive"));
        }
        self.config.ante = ante;
        Ok(())
    }

    /// Deal the next cards into an empty hand, reshuffling if the deck
    /// runs low.
    pub fn deal(&mut self) -> Result<DealOutcome, GameError> {
        match self.phase {
            Phase::Idle => {}
            Phase::Exhausted => return Err(GameError::invalid("deck exhausted")),
            _ => return Err(GameError::invalid("hand is not empty")),
        }

        let hand_size = self.config.hand_size;
        let mut reshuffled = false;

        if self.undealt_count() < hand_size {
            if self.reshuffles >= self.config.max_reshuffles {
                info!(reshuffles = self.reshuffles, "stackem deck exhausted");
                self.phase = Phase::Exhausted;
                return Ok(DealOutcome::Exhausted);
            }
            self.reshuffle();
            reshuffled = true;
        }

        let mut cards = Hand::new();
        for card in self.deck.iter_mut().filter(|c| !c.is_dealt).take(hand_size) {
            card.is_dealt = true;
            cards.push(*card);
        }
        self.hand = cards.clone();
        self.ante_locked = true;
        self.phase = Phase::Holding;

        debug!(
            dealt = cards.len(),
            undealt = self.undealt_count(),
            reshuffled,
            "stackem deal"
        );
        Ok(DealOutcome::Dealt { cards, reshuffled })
    }

    /// Drop `card` at a board point; the nearest slot within the drop
    /// threshold receives it.
    pub fn drop_card(&mut self, card: CardId, point: Point) -> Result<PlaceOutcome, GameError> {
        let slot = self
            .config
            .layout
            .nearest_slot(point, self.config.drop_threshold)
            .ok_or(GameError::invalid("no slot near drop point"))?;
        self.place(card, slot)
    }

    /// Place the top card of the hand on `slot`.
    pub fn place(&mut self, card_id: CardId, slot: SlotIndex) -> Result<PlaceOutcome, GameError> {
        if self.phase != Phase::Holding {
            return Err(GameError::invalid("no card to place"));
        }
        let card = match self.hand.first() {
            Some(top) if top.id == card_id => *top,
            _ => return Err(GameError::invalid("only the top card can be placed")),
        };
        if !slot.is_playable() {
            return Err(GameError::invalid("slot is reserved for totals"));
        }
        self.check_ante()?;

        match card.kind {
            CardKind::Swap => self.swap(card, slot),
            _ if !self.grid.is_open(slot) => Err(GameError::invalid("slot is occupied")),
            CardKind::Wild => {
                let options = self.wild_options();
                self.hand.remove(0);
                self.phase = Phase::AwaitingWildChoice {
                    card,
                    slot,
                    options: options.clone(),
                };
                Ok(PlaceOutcome::AwaitingWild { slot, options })
            }
            CardKind::Standard if card.is_ace() => {
                self.hand.remove(0);
                self.phase = Phase::AwaitingAceChoice { card, slot };
                Ok(PlaceOutcome::AwaitingAce { slot })
            }
            CardKind::Standard => {
                let placement = self.lock(card, slot)?;
                self.hand.remove(0);
                self.settle_phase();
                Ok(PlaceOutcome::Placed(placement))
            }
        }
    }

    /// Resolve a pending Ace as 1 or 11.
    pub fn choose_ace(&mut self, value: u8) -> Result<Placement, GameError> {
        let Phase::AwaitingAceChoice { mut card, slot } = self.phase.clone() else {
            return Err(GameError::invalid("no ace awaiting a value"));
        };
        if !ACE_VALUES.contains(&value) {
            return Err(GameError::invalid("ace must be 1 or 11"));
        }

        card.value = value;
        let placement = self.lock(card, slot)?;
        self.settle_phase();
        Ok(placement)
    }

    /// Resolve a pending Wild with one of the offered values. One undealt
    /// standard card of that value is taken out of the deck.
    pub fn choose_wild(&mut self, value: u8) -> Result<Placement, GameError> {
        let Phase::AwaitingWildChoice { mut card, slot, options } = self.phase.clone() else {
            return Err(GameError::invalid("no wild awaiting a value"));
        };
        if !options.contains(&value) {
            return Err(GameError::invalid("value not offered"));
        }

        card.value = value;
        let placement = self.lock(card, slot)?;
        if let Some(consumed) = self
            .deck
            .iter_mut()
            .find(|c| c.is_standard() && !c.is_dealt && c.value == value)
        {
            consumed.is_dealt = true;
            debug!(card = %consumed, "wild consumed deck card");
        }
        self.settle_phase();
        Ok(placement)
    }

    /// Abandon a pending Ace or Wild placement; the card returns to the
    /// top of the hand.
    pub fn cancel_choice(&mut self) -> Result<(), GameError> {
        let mut card = match &self.phase {
            Phase::AwaitingAceChoice { card, .. } | Phase::AwaitingWildChoice { card, .. } => *card,
            _ => return Err(GameError::invalid("no pending choice")),
        };
        card.reset_value();
        self.hand.insert(0, card);
        self.phase = Phase::Holding;
        Ok(())
    }

    /// Move session winnings into the wallet. Winnings also count as
    /// experience; the level is re-evaluated once `poll` passes the
    /// configured delay. Returns the amount collected.
    pub fn collect(&mut self, now: Instant) -> u64 {
        let amount = std::mem::take(&mut self.session_winnings);
        if amount == 0 {
            return 0;
        }

        self.session.credit(amount);
        self.session.add_experience(amount);
        self.level_check_due = Some(now + self.config.level_check_delay);

        info!(amount, chips = self.session.chips(), "stackem winnings collected");
        amount
    }

    /// Run the deferred level check if it is due.
    pub fn poll(&mut self, now: Instant) -> Option<LevelChange> {
        match self.level_check_due {
            Some(due) if due <= now => {
                self.level_check_due = None;
                Some(self.apply_level_check())
            }
            _ => None,
        }
    }

    /// Abandon the game, forfeiting uncollected winnings, and hand the
    /// session back. A pending level check is applied immediately.
    pub fn end_game(mut self) -> (EndGameSummary, Session) {
        let forfeited = std::mem::take(&mut self.session_winnings);
        let level_change = self.level_check_due.take().map(|_| self.apply_level_check());
        if forfeited > 0 {
            info!(forfeited, "stackem game ended with uncollected winnings");
        }

        let summary = EndGameSummary {
            forfeited,
            cards_placed: self.grid.placed_count(),
            level_change,
        };
        (summary, self.session)
    }

    /// Start over with a fresh deck and board. Uncollected winnings are
    /// forfeited; the amount is returned.
    pub fn play_again(&mut self) -> u64 {
        let forfeited = std::mem::take(&mut self.session_winnings);
        self.hand.clear();
        self.grid = Grid::new();
        self.phase = Phase::Idle;
        self.ante_locked = false;
        self.reshuffles = 0;
        self.start_board();
        debug!(forfeited, "stackem restarted");
        forfeited
    }

    // === Internals ===

    fn check_ante(&self) -> Result<(), GameError> {
        let ante = self.config.ante;
        if self.session.chips() < ante {
            return Err(GameError::InsufficientFunds {
                needed: ante,
                available: self.session.chips(),
            });
        }
        Ok(())
    }

    /// Charge the ante, lock `card` into `slot` and score both lines.
    fn lock(&mut self, card: Card, slot: SlotIndex) -> Result<Placement, GameError> {
        if !self.grid.is_open(slot) {
            return Err(GameError::invalid("slot is occupied"));
        }
        self.session.debit(self.config.ante)?;
        self.grid.place(slot, card);

        let score = score_placement(&self.grid, slot, self.config.ante);
        let mut placement = Placement {
            card,
            slot,
            score,
            won: 0,
            forfeited: 0,
        };

        if score.is_bust() {
            placement.forfeited = std::mem::take(&mut self.session_winnings);
            self.session.record_result(GameKey::Stackem, false);
            info!(%slot, forfeited = placement.forfeited, "stackem bust");
        } else if score.is_win() {
            placement.won = score.award();
            self.session_winnings += placement.won;
            self.session.record_result(GameKey::Stackem, true);
            info!(%slot, won = placement.won, winnings = self.session_winnings, "stackem line hit 21");
        }

        Ok(placement)
    }

    fn swap(&mut self, swap_card: Card, slot: SlotIndex) -> Result<PlaceOutcome, GameError> {
        if self.grid.get(slot).is_none() {
            return Err(GameError::invalid("swap card needs an occupied slot"));
        }
        self.session.debit(self.config.ante)?;

        self.hand.remove(0);
        let mut displaced = self
            .grid
            .swap_in(slot, swap_card)
            .ok_or(GameError::invalid("swap card needs an occupied slot"))?;
        displaced.reset_value();
        self.hand.insert(0, displaced);

        debug!(%slot, displaced = %displaced, "stackem swap");
        Ok(PlaceOutcome::Swapped { slot, displaced })
    }

    /// Distinct values of undealt standard cards, ascending. Falls back to
    /// every value when none are left.
    fn wild_options(&self) -> WildOptions {
        let mut options: WildOptions = self
            .deck
            .iter()
            .filter(|c| c.is_standard() && !c.is_dealt)
            .map(|c| c.value)
            .collect();
        options.sort_unstable();
        options.dedup();
        if options.is_empty() {
            options.extend(1..=11);
        }
        options
    }

    fn settle_phase(&mut self) {
        self.phase = if self.hand.is_empty() {
            Phase::Idle
        } else {
            Phase::Holding
        };
    }

    fn apply_level_check(&mut self) -> LevelChange {
        let change = self
            .session
            .apply_level_ups(self.config.level_curve, self.config.level_bonus_chips);
        if change.levels_gained() > 0 {
            info!(from = change.from, to = change.to, bonus = change.bonus_chips, "stackem level up");
        }
        change
    }

    /// Replace the deck with a fresh one, minus standard cards on the board.
    fn reshuffle(&mut self) {
        let on_board: FxHashSet<_> = self
            .grid
            .placed()
            .filter(|(_, c)| c.is_standard())
            .map(|(_, c)| (c.suit, c.rank))
            .collect();
        self.deck = self.fresh_deck(&on_board);
        self.reshuffles += 1;
        debug!(reshuffles = self.reshuffles, size = self.deck.len(), "stackem reshuffle");
    }

    fn fresh_deck(&mut self, exclude: &FxHashSet<(Suit, Rank)>) -> Vector<Card> {
        let cards = build_deck_excluding(&mut self.rng, CardId(self.next_card_id), exclude);
        self.next_card_id += cards.len() as u32;
        cards.into_iter().collect()
    }

    /// New deck plus the difficulty's pre-placed cards. Pre-placed cards
    /// are standard non-Ace cards put where no line reaches 21.
    fn start_board(&mut self) {
        self.deck = self.fresh_deck(&FxHashSet::default());

        let wanted = self.config.difficulty.preplaced_cards();
        let mut placed = 0;
        for index in 0..self.deck.len() {
            if placed == wanted {
                break;
            }
            let card = self.deck[index];
            if !card.is_standard() || card.is_ace() {
                continue;
            }

            let fits: Vec<SlotIndex> = self
                .grid
                .open_slots()
                .filter(|s| {
                    s.lines()
                        .iter()
                        .all(|&l| self.grid.line_total(l) + u32::from(card.value) < TARGET)
                })
                .collect();
            let Some(&slot) = self.rng.choose(&fits) else {
                break;
            };

            if let Some(c) = self.deck.get_mut(index) {
                c.is_dealt = true;
            }
            self.grid.place(slot, Card { is_dealt: true, ..card });
            placed += 1;
        }

        debug!(
            difficulty = ?self.config.difficulty,
            preplaced = placed,
            "stackem board ready"
        );
    }
}
