//! Space Crash round loop.
//!
//! The host drives the loop by calling [`CrashEngine::tick`] once per
//! frame with the current instant. The multiplier is always computed from
//! the instant captured at launch, never from the number of ticks.
//!
//! Within one tick the auto-cash-out target is checked before the crash
//! point, so a round whose target is reached on the same frame as the
//! crash pays out.

use std::time::Instant;

use im::Vector;
use tracing::{debug, info};

use super::point::{generate_crash_point, multiplier_at};
use crate::core::{CrashConfig, GameError, GameRng, LevelChange, Session};
use crate::persistence::GameKey;

/// A bet in the recent bets feed.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveBet {
    pub id: u64,
    pub user_id: String,
    pub amount: u64,
    /// Realized multiplier; 0 until the bet is cashed out.
    pub multiplier: f64,
    pub placed_at: Instant,
}

/// A round in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Round {
    pub bet_id: u64,
    pub bet: u64,
    pub crash_point: f64,
    pub started: Instant,
    /// Multiplier as of the last tick.
    pub multiplier: f64,
}

/// A round that ended with a payout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CashOut {
    pub bet: u64,
    pub multiplier: f64,
    pub payout: u64,
    pub crash_point: f64,
    /// True when the auto-cash-out target triggered it.
    pub auto: bool,
}

/// A round lost to the crash.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crash {
    pub bet: u64,
    pub crash_point: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CrashPhase {
    Idle,
    Running(Round),
    CashedOut(CashOut),
    Crashed(Crash),
}

impl CrashPhase {
    fn outcome(&self) -> TickOutcome {
        match self {
            CrashPhase::Idle => TickOutcome::Idle,
            CrashPhase::Running(round) => TickOutcome::Running {
                multiplier: round.multiplier,
            },
            CrashPhase::CashedOut(c) => TickOutcome::CashedOut(*c),
            CrashPhase::Crashed(c) => TickOutcome::Crashed {
                crash: *c,
                explosion: false,
            },
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, CrashPhase::Running(_))
    }
}

/// What a tick observed. Terminal outcomes repeat on every tick until
/// [`CrashEngine::reset`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    Idle,
    Running { multiplier: f64 },
    CashedOut(CashOut),
    /// `explosion` is set only on the tick that resolved the crash.
    Crashed { crash: Crash, explosion: bool },
}

/// The Space Crash engine.
pub struct CrashEngine {
    config: CrashConfig,
    session: Session,
    rng: GameRng,
    phase: CrashPhase,
    auto_cash_out: Option<f64>,
    /// Crash points, newest first.
    history: Vector<f64>,
    /// Bets, newest first.
    recent_bets: Vector<LiveBet>,
    next_bet_id: u64,
}

impl CrashEngine {
    pub fn new(config: CrashConfig, session: Session, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            session,
            rng: GameRng::new(seed).for_context("space_crash"),
            phase: CrashPhase::Idle,
            auto_cash_out: None,
            history: Vector::new(),
            recent_bets: Vector::new(),
            next_bet_id: 1,
        })
    }

    // === Accessors ===

    #[must_use]
    pub fn config(&self) -> &CrashConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }

    #[must_use]
    pub fn phase(&self) -> &CrashPhase {
        &self.phase
    }

    /// Multiplier to display: live while running, final once resolved.
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        match &self.phase {
            CrashPhase::Idle => 1.0,
            CrashPhase::Running(round) => round.multiplier,
            CrashPhase::CashedOut(c) => c.multiplier,
            CrashPhase::Crashed(c) => c.crash_point,
        }
    }

    #[must_use]
    pub fn auto_cash_out(&self) -> Option<f64> {
        self.auto_cash_out
    }

    /// Recent crash points, newest first.
    pub fn history(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.iter().copied()
    }

    /// Recent bets, newest first.
    pub fn recent_bets(&self) -> impl Iterator<Item = &LiveBet> {
        self.recent_bets.iter()
    }

    // === Actions ===

    /// Enable auto-cash-out at `target`, or disable it with `None`. The
    /// target is fixed for the duration of a round.
    pub fn set_auto_cash_out(&mut self, target: Option<f64>) -> Result<(), GameError> {
        if self.phase.is_running() {
            return Err(GameError::invalid("auto cash-out is locked while a round runs"));
        }
        if let Some(t) = target {
            if !t.is_finite() || t <= 1.0 {
                return Err(GameError::invalid("auto cash-out target must exceed 1.0"));
            }
        }
        self.auto_cash_out = target;
        Ok(())
    }

    /// Start a round with a freshly drawn crash point.
    pub fn launch(&mut self, bet: u64, now: Instant) -> Result<TickOutcome, GameError> {
        self.check_launch(bet)?;
        let crash_point = generate_crash_point(&mut self.rng, &self.config.tiers);
        self.start_round(bet, crash_point, now)
    }

    /// Start a round with a known crash point.
    pub fn launch_with_crash_point(
        &mut self,
        bet: u64,
        crash_point: f64,
        now: Instant,
    ) -> Result<TickOutcome, GameError> {
        if !crash_point.is_finite() || crash_point < 1.0 {
            return Err(GameError::invalid("crash point must be at least 1.0"));
        }
        self.check_launch(bet)?;
        self.start_round(bet, crash_point, now)
    }

    /// Advance the round to `now`.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let scaling = self.config.scaling;
        let round = match &mut self.phase {
            CrashPhase::Running(round) => {
                let elapsed = now.saturating_duration_since(round.started);
                round.multiplier = multiplier_at(elapsed, scaling, round.crash_point);
                *round
            }
            _ => return self.phase.outcome(),
        };

        if let Some(target) = self.auto_cash_out {
            if round.multiplier >= target {
                return TickOutcome::CashedOut(self.settle_cash_out(round, target, true));
            }
        }
        if round.multiplier >= round.crash_point {
            return TickOutcome::Crashed {
                crash: self.settle_crash(round),
                explosion: true,
            };
        }
        TickOutcome::Running {
            multiplier: round.multiplier,
        }
    }

    /// Cash out at the multiplier reached by `now`. Refused if the round
    /// resolved on its own by then.
    pub fn cash_out(&mut self, now: Instant) -> Result<CashOut, GameError> {
        if !self.phase.is_running() {
            return Err(GameError::invalid("no round running"));
        }
        match self.tick(now) {
            TickOutcome::Running { .. } => {}
            _ => return Err(GameError::invalid("round already resolved")),
        }
        let CrashPhase::Running(round) = self.phase else {
            return Err(GameError::invalid("no round running"));
        };
        Ok(self.settle_cash_out(round, round.multiplier, false))
    }

    /// Leave a resolved round: back to idle, with flat experience and any
    /// level-up bonuses.
    pub fn reset(&mut self) -> Result<LevelChange, GameError> {
        match self.phase {
            CrashPhase::CashedOut(_) | CrashPhase::Crashed(_) => {}
            CrashPhase::Running(_) => return Err(GameError::invalid("round still running")),
            CrashPhase::Idle => return Err(GameError::invalid("nothing to reset")),
        }

        self.phase = CrashPhase::Idle;
        self.session.add_experience(self.config.xp_per_round);
        let change = self
            .session
            .apply_level_ups(self.config.level_curve, self.config.level_bonus_chips);

        if change.levels_gained() > 0 {
            info!(from = change.from, to = change.to, bonus = change.bonus_chips, "crash level up");
        } else {
            debug!(xp = self.session.wallet().experience, "crash round reset");
        }
        Ok(change)
    }

    // === Internals ===

    fn check_launch(&self, bet: u64) -> Result<(), GameError> {
        if !matches!(self.phase, CrashPhase::Idle) {
            return Err(GameError::invalid("round not idle"));
        }
        if bet < self.config.min_bet {
            return Err(GameError::invalid("bet below minimum"));
        }
        if bet > self.session.chips() {
            return Err(GameError::InsufficientFunds {
                needed: bet,
                available: self.session.chips(),
            });
        }
        Ok(())
    }

    fn start_round(&mut self, bet: u64, crash_point: f64, now: Instant) -> Result<TickOutcome, GameError> {
        self.session.debit(bet)?;

        let bet_id = self.next_bet_id;
        self.next_bet_id += 1;
        self.recent_bets.push_front(LiveBet {
            id: bet_id,
            user_id: self.session.user_id().to_owned(),
            amount: bet,
            multiplier: 0.0,
            placed_at: now,
        });
        cap_front(&mut self.recent_bets, self.config.recent_bets_len);

        let round = Round {
            bet_id,
            bet,
            crash_point,
            started: now,
            multiplier: 1.0,
        };
        self.phase = CrashPhase::Running(round);

        info!(bet, bet_id, chips = self.session.chips(), "crash round launched");
        Ok(self.phase.outcome())
    }

    fn settle_cash_out(&mut self, round: Round, multiplier: f64, auto: bool) -> CashOut {
        let payout = (round.bet as f64 * multiplier).floor() as u64;
        self.session.credit(payout);
        self.session.record_result(GameKey::SpaceCrash, true);

        if let Some(bet) = self.recent_bets.iter_mut().find(|b| b.id == round.bet_id) {
            bet.multiplier = multiplier;
        }

        let cash_out = CashOut {
            bet: round.bet,
            multiplier,
            payout,
            crash_point: round.crash_point,
            auto,
        };
        self.phase = CrashPhase::CashedOut(cash_out);

        info!(bet = round.bet, multiplier, payout, auto, "crash cashed out");
        cash_out
    }

    fn settle_crash(&mut self, round: Round) -> Crash {
        self.session.record_result(GameKey::SpaceCrash, false);
        self.history.push_front(round.crash_point);
        cap_front(&mut self.history, self.config.history_len);

        let crash = Crash {
            bet: round.bet,
            crash_point: round.crash_point,
        };
        self.phase = CrashPhase::Crashed(crash);

        info!(bet = round.bet, crash_point = round.crash_point, "crash");
        crash
    }
}

/// Drop entries past `cap` from the back of a newest-first feed.
fn cap_front<T: Clone>(feed: &mut Vector<T>, cap: usize) {
    if feed.len() > cap {
        feed.truncate(cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Wallet;
    use std::time::Duration;

    fn engine(chips: u64) -> CrashEngine {
        let session = Session::new("pilot", Wallet {
            chips,
            level: 1,
            experience: 0,
        });
        CrashEngine::new(CrashConfig::default(), session, 3).unwrap()
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_launch_deducts_bet() {
        let mut e = engine(100);
        let t0 = Instant::now();
        assert_eq!(e.launch(40, t0).unwrap(), TickOutcome::Running { multiplier: 1.0 });
        assert_eq!(e.session().chips(), 60);
        assert!(e.phase().is_running());

        let bet = e.recent_bets().next().unwrap();
        assert_eq!(bet.amount, 40);
        assert_eq!(bet.multiplier, 0.0);
    }

    #[test]
    fn test_launch_refusals() {
        let mut e = engine(100);
        let t0 = Instant::now();
        assert!(e.launch(0, t0).is_err());
        assert!(matches!(
            e.launch(101, t0),
            Err(GameError::InsufficientFunds { .. })
        ));
        e.launch(10, t0).unwrap();
        assert!(e.launch(10, t0).is_err());
        assert_eq!(e.session().chips(), 90);
    }

    #[test]
    fn test_auto_cash_out_beats_crash() {
        let mut e = engine(100);
        let t0 = Instant::now();
        e.set_auto_cash_out(Some(2.0)).unwrap();
        e.launch_with_crash_point(100, 3.0, t0).unwrap();

        let TickOutcome::CashedOut(c) = e.tick(t0 + secs(6.0)) else {
            panic!("expected cash-out");
        };
        assert!(c.auto);
        assert_eq!(c.multiplier, 2.0);
        assert_eq!(c.payout, 200);
        assert_eq!(e.session().chips(), 200);
        assert_eq!(e.history().count(), 0);
    }

    #[test]
    fn test_crash_before_auto_target() {
        let mut e = engine(100);
        let t0 = Instant::now();
        e.set_auto_cash_out(Some(2.0)).unwrap();
        e.launch_with_crash_point(100, 1.5, t0).unwrap();

        assert!(matches!(e.tick(t0 + secs(1.0)), TickOutcome::Running { .. }));
        let outcome = e.tick(t0 + secs(6.0));
        assert_eq!(
            outcome,
            TickOutcome::Crashed {
                crash: Crash {
                    bet: 100,
                    crash_point: 1.5
                },
                explosion: true,
            }
        );
        assert_eq!(e.multiplier(), 1.5);
        assert_eq!(e.session().chips(), 0);
        assert_eq!(e.history().collect::<Vec<_>>(), vec![1.5]);
    }

    #[test]
    fn test_manual_cash_out() {
        let mut e = engine(100);
        let t0 = Instant::now();
        e.launch_with_crash_point(50, 10.0, t0).unwrap();

        let c = e.cash_out(t0 + secs(1.0)).unwrap();
        assert!(!c.auto);
        assert!((c.multiplier - 1.1).abs() < 1e-9);
        assert_eq!(c.payout, 55);
        assert_eq!(e.session().chips(), 105);
        assert_eq!(e.recent_bets().next().unwrap().multiplier, c.multiplier);

        assert!(e.cash_out(t0 + secs(2.0)).is_err());
        assert_eq!(e.session().chips(), 105);
    }

    #[test]
    fn test_cash_out_after_crash_is_refused() {
        let mut e = engine(100);
        let t0 = Instant::now();
        e.launch_with_crash_point(50, 1.2, t0).unwrap();

        assert!(e.cash_out(t0 + secs(30.0)).is_err());
        assert!(matches!(e.phase(), CrashPhase::Crashed(_)));
        assert_eq!(e.session().chips(), 50);
    }

    #[test]
    fn test_terminal_is_sticky() {
        let mut e = engine(100);
        let t0 = Instant::now();
        e.launch_with_crash_point(10, 1.2, t0).unwrap();
        let TickOutcome::Crashed { crash: first, explosion: true } = e.tick(t0 + secs(30.0)) else {
            panic!("expected exploding crash");
        };
        let TickOutcome::Crashed { crash: again, explosion: false } = e.tick(t0 + secs(60.0)) else {
            panic!("explosion repeated");
        };
        assert_eq!(first, again);
        assert_eq!(e.history().count(), 1);
        assert_eq!(e.session().chips(), 90);
    }

    #[test]
    fn test_auto_target_locked_while_running() {
        let mut e = engine(100);
        let t0 = Instant::now();
        e.set_auto_cash_out(Some(5.0)).unwrap();
        e.launch_with_crash_point(50, 40.0, t0).unwrap();

        let TickOutcome::Running { multiplier } = e.tick(t0 + secs(10.0)) else {
            panic!("round ended early");
        };
        assert!(multiplier > 2.0);
        assert!(e.set_auto_cash_out(Some(1.5)).is_err());
        assert!(e.set_auto_cash_out(None).is_err());
        assert_eq!(e.auto_cash_out(), Some(5.0));

        let TickOutcome::CashedOut(c) = e.tick(t0 + secs(60.0)) else {
            panic!("expected cash-out");
        };
        assert_eq!(c.multiplier, 5.0);
        assert_eq!(c.payout, 250);
        e.reset().unwrap();
        e.set_auto_cash_out(Some(1.5)).unwrap();
    }

    #[test]
    fn test_recent_bets_capped() {
        let mut e = engine(1000);
        let t0 = Instant::now();
        for _ in 0..25 {
            e.launch_with_crash_point(1, 1.1, t0).unwrap();
            e.tick(t0 + secs(60.0));
            e.reset().unwrap();
        }
        let ids: Vec<u64> = e.recent_bets().map(|b| b.id).collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(ids[0], 25);
        assert_eq!(ids[19], 6);
    }

    #[test]
    fn test_history_capped() {
        let mut e = engine(1000);
        let t0 = Instant::now();
        for i in 0..12 {
            let point = 1.1 + f64::from(i) / 100.0;
            e.launch_with_crash_point(1, point, t0).unwrap();
            e.tick(t0 + secs(60.0));
            e.reset().unwrap();
        }
        let history: Vec<f64> = e.history().collect();
        assert_eq!(history.len(), 10);
        assert!((history[0] - 1.21).abs() < 1e-9);
    }

    #[test]
    fn test_reset_grants_xp() {
        let mut e = engine(100);
        let t0 = Instant::now();
        assert!(e.reset().is_err());

        e.launch_with_crash_point(10, 1.2, t0).unwrap();
        assert!(e.reset().is_err());
        e.tick(t0 + secs(30.0));

        let change = e.reset().unwrap();
        assert_eq!(change.levels_gained(), 0);
        assert_eq!(e.session().wallet().experience, 10);
        assert_eq!(e.phase(), &CrashPhase::Idle);
    }

    #[test]
    fn test_auto_cash_out_target_validation() {
        let mut e = engine(100);
        assert!(e.set_auto_cash_out(Some(1.0)).is_err());
        assert!(e.set_auto_cash_out(Some(f64::NAN)).is_err());
        e.set_auto_cash_out(Some(1.5)).unwrap();
        e.set_auto_cash_out(None).unwrap();
        assert_eq!(e.auto_cash_out(), None);
    }
}
