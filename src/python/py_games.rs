//! Game bindings for Python.
//!
//! Python hosts have no access to `Instant`, so every timed call reads the
//! clock at the moment it is made.

use std::time::Instant;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::cards::CardId;
use crate::core::{CrashConfig, Difficulty, GameRng, Session, StackemConfig};
use crate::crash::{CrashEngine, CrashPhase, TickOutcome};
use crate::persistence::Wallet;
use crate::stackem::{DealOutcome, Phase, PlaceOutcome, Point, SlotIndex, StackemEngine};

use super::py_core::PyCard;

fn session(user_id: &str, chips: u64, level: u32, experience: u64) -> Session {
    Session::new(user_id, Wallet {
        chips,
        level,
        experience,
    })
}

/// An explicit seed replays a game; without one every game is fresh.
fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| GameRng::from_entropy().seed())
}

fn place_kind(outcome: &PlaceOutcome) -> &'static str {
    match outcome {
        PlaceOutcome::Placed(_) => "placed",
        PlaceOutcome::AwaitingAce { .. } => "awaiting_ace",
        PlaceOutcome::AwaitingWild { .. } => "awaiting_wild",
        PlaceOutcome::Swapped { .. } => "swapped",
    }
}

/// Python wrapper for the Stack'em engine.
#[pyclass(name = "StackemGame")]
pub struct PyStackemGame {
    engine: StackemEngine,
}

#[pymethods]
impl PyStackemGame {
    /// Create a new Stack'em game.
    ///
    /// # Arguments
    /// - user_id: Wallet owner
    /// - chips: Starting chip balance
    /// - difficulty: "easy", "medium" or "hard"
    /// - ante: Chips charged per placement
    /// - seed: RNG seed for a replayable game, or None for a random one
    #[new]
    #[pyo3(signature = (
        user_id = "guest",
        chips = 1000,
        level = 1,
        experience = 0,
        difficulty = "easy",
        ante = 10,
        seed = None
    ))]
    fn new(
        user_id: &str,
        chips: u64,
        level: u32,
        experience: u64,
        difficulty: &str,
        ante: u64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let difficulty = match difficulty {
            "easy" => Difficulty::Easy,
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            other => return Err(PyValueError::new_err(format!("unknown difficulty: {other}"))),
        };
        let config = StackemConfig::default()
            .with_difficulty(difficulty)
            .with_ante(ante);
        let engine = StackemEngine::new(config, session(user_id, chips, level, experience), resolve_seed(seed))?;
        Ok(Self { engine })
    }

    /// Deal a new hand. Returns False once the deck is exhausted.
    fn deal(&mut self) -> PyResult<bool> {
        Ok(matches!(self.engine.deal()?, DealOutcome::Dealt { .. }))
    }

    fn set_ante(&mut self, ante: u64) -> PyResult<()> {
        Ok(self.engine.set_ante(ante)?)
    }

    /// Place the top card on (row, col).
    fn place(&mut self, card_id: u32, row: usize, col: usize) -> PyResult<&'static str> {
        let slot = SlotIndex::new(row, col).ok_or_else(|| PyValueError::new_err("slot off the board"))?;
        let outcome = self.engine.place(CardId(card_id), slot)?;
        Ok(place_kind(&outcome))
    }

    /// Drop the top card at a board pixel position.
    fn drop_card(&mut self, card_id: u32, x: f32, y: f32) -> PyResult<&'static str> {
        let outcome = self.engine.drop_card(CardId(card_id), Point::new(x, y))?;
        Ok(place_kind(&outcome))
    }

    /// Resolve a pending Ace. Returns chips won.
    fn choose_ace(&mut self, value: u8) -> PyResult<u64> {
        Ok(self.engine.choose_ace(value)?.won)
    }

    /// Resolve a pending Wild. Returns chips won.
    fn choose_wild(&mut self, value: u8) -> PyResult<u64> {
        Ok(self.engine.choose_wild(value)?.won)
    }

    fn cancel_choice(&mut self) -> PyResult<()> {
        Ok(self.engine.cancel_choice()?)
    }

    /// Move session winnings into the wallet.
    fn collect(&mut self) -> u64 {
        self.engine.collect(Instant::now())
    }

    /// Apply a due level check. Returns the new level if one was applied.
    fn poll(&mut self) -> Option<u32> {
        self.engine.poll(Instant::now()).map(|c| c.to)
    }

    /// Start over. Returns forfeited winnings.
    fn play_again(&mut self) -> u64 {
        self.engine.play_again()
    }

    #[getter]
    fn hand(&self) -> Vec<PyCard> {
        self.engine.hand().iter().copied().map(PyCard).collect()
    }

    /// Card on (row, col), if any.
    fn card_at(&self, row: usize, col: usize) -> Option<PyCard> {
        let slot = SlotIndex::new(row, col)?;
        self.engine.grid().get(slot).copied().map(PyCard)
    }

    /// Total shown in a reserved slot.
    fn total_at(&self, row: usize, col: usize) -> Option<u32> {
        self.engine.grid().total_at(SlotIndex::new(row, col)?)
    }

    #[getter]
    fn wild_options(&self) -> Vec<u8> {
        match self.engine.phase() {
            Phase::AwaitingWildChoice { options, .. } => options.to_vec(),
            _ => Vec::new(),
        }
    }

    #[getter]
    fn phase(&self) -> &'static str {
        match self.engine.phase() {
            Phase::Idle => "idle",
            Phase::Holding => "holding",
            Phase::AwaitingAceChoice { .. } => "awaiting_ace",
            Phase::AwaitingWildChoice { .. } => "awaiting_wild",
            Phase::Exhausted => "exhausted",
        }
    }

    #[getter]
    fn chips(&self) -> u64 {
        self.engine.session().chips()
    }

    #[getter]
    fn level(&self) -> u32 {
        self.engine.session().wallet().level
    }

    #[getter]
    fn session_winnings(&self) -> u64 {
        self.engine.session_winnings()
    }

    #[getter]
    fn ante(&self) -> u64 {
        self.engine.ante()
    }

    #[getter]
    fn undealt(&self) -> usize {
        self.engine.undealt_count()
    }

    fn __repr__(&self) -> String {
        format!(
            "StackemGame(phase={}, chips={}, winnings={})",
            self.phase(),
            self.chips(),
            self.session_winnings()
        )
    }
}

/// Python wrapper for the Space Crash engine.
#[pyclass(name = "CrashGame")]
pub struct PyCrashGame {
    engine: CrashEngine,
}

#[pymethods]
impl PyCrashGame {
    #[new]
    #[pyo3(signature = (user_id = "guest", chips = 1000, level = 1, experience = 0, seed = None))]
    fn new(user_id: &str, chips: u64, level: u32, experience: u64, seed: Option<u64>) -> PyResult<Self> {
        let engine = CrashEngine::new(
            CrashConfig::default(),
            session(user_id, chips, level, experience),
            resolve_seed(seed),
        )?;
        Ok(Self { engine })
    }

    fn launch(&mut self, bet: u64) -> PyResult<()> {
        self.engine.launch(bet, Instant::now())?;
        Ok(())
    }

    /// Advance the round. Returns "idle", "running", "cashed_out",
    /// "exploded" on the tick the rocket blows up, then "crashed".
    fn tick(&mut self) -> &'static str {
        match self.engine.tick(Instant::now()) {
            TickOutcome::Idle => "idle",
            TickOutcome::Running { .. } => "running",
            TickOutcome::CashedOut(_) => "cashed_out",
            TickOutcome::Crashed { explosion: true, .. } => "exploded",
            TickOutcome::Crashed { .. } => "crashed",
        }
    }

    /// Cash out now. Returns the payout.
    fn cash_out(&mut self) -> PyResult<u64> {
        Ok(self.engine.cash_out(Instant::now())?.payout)
    }

    #[pyo3(signature = (target = None))]
    fn set_auto_cash_out(&mut self, target: Option<f64>) -> PyResult<()> {
        Ok(self.engine.set_auto_cash_out(target)?)
    }

    /// Return to idle. Returns the level after any level-ups.
    fn reset(&mut self) -> PyResult<u32> {
        Ok(self.engine.reset()?.to)
    }

    #[getter]
    fn multiplier(&self) -> f64 {
        self.engine.multiplier()
    }

    #[getter]
    fn history(&self) -> Vec<f64> {
        self.engine.history().collect()
    }

    #[getter]
    fn running(&self) -> bool {
        matches!(self.engine.phase(), CrashPhase::Running(_))
    }

    #[getter]
    fn chips(&self) -> u64 {
        self.engine.session().chips()
    }

    #[getter]
    fn level(&self) -> u32 {
        self.engine.session().wallet().level
    }

    fn __repr__(&self) -> String {
        format!(
            "CrashGame(multiplier={:.2}, chips={}, running={})",
            self.multiplier(),
            self.chips(),
            self.running()
        )
    }
}
