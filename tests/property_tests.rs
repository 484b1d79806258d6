//! Property tests for deck composition, placement accounting, scoring and
//! crash resolution.

use std::time::{Duration, Instant};

use proptest::prelude::*;
use rustc_hash::FxHashSet;

use minigame_hub::cards::{build_deck, CardId, CardKind, DECK_SIZE, STANDARD_CARDS};
use minigame_hub::core::{CrashConfig, GameRng, Session, StackemConfig};
use minigame_hub::crash::{CrashEngine, TickOutcome};
use minigame_hub::persistence::Wallet;
use minigame_hub::stackem::{line_award, PlaceOutcome, SlotIndex, StackemEngine};

fn session(chips: u64) -> Session {
    Session::new("prop", Wallet {
        chips,
        level: 1,
        experience: 0,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Generators
// ─────────────────────────────────────────────────────────────────────────────

/// Crash points and targets on the two-decimal grid the game uses.
fn arb_multiplier() -> impl Strategy<Value = f64> {
    (101u32..5000).prop_map(|hundredths| f64::from(hundredths) / 100.0)
}

/// Playable slot indices.
fn arb_slot() -> impl Strategy<Value = SlotIndex> {
    (1usize..6, 1usize..6).prop_map(|(r, c)| SlotIndex::new(r, c).unwrap())
}

proptest! {
    #[test]
    fn prop_deck_composition(seed in any::<u64>(), first in 0u32..10_000) {
        let mut rng = GameRng::new(seed);
        let deck = build_deck(&mut rng, CardId(first));

        prop_assert_eq!(deck.len(), DECK_SIZE);

        let ids: FxHashSet<_> = deck.iter().map(|c| c.id).collect();
        prop_assert_eq!(ids.len(), DECK_SIZE);
        prop_assert!(ids.iter().all(|id| (first..first + DECK_SIZE as u32).contains(&id.raw())));

        let identities: FxHashSet<_> = deck
            .iter()
            .filter(|c| c.kind == CardKind::Standard)
            .map(|c| (c.suit, c.rank))
            .collect();
        prop_assert_eq!(identities.len(), STANDARD_CARDS);
        prop_assert_eq!(deck.iter().filter(|c| c.is_swap_card()).count(), 2);
        prop_assert_eq!(deck.iter().filter(|c| c.is_wild_card()).count(), 2);
        prop_assert!(deck.iter().all(|c| !c.is_dealt));
    }

    #[test]
    fn prop_line_award_formula(ante in 1u64..10_000, filled in 0usize..8) {
        let expected = match filled {
            2 => Some(ante * 3),
            3 => Some(ante * 6),
            4 => Some(ante * 10),
            5 => Some(ante * 15),
            _ => None,
        };
        prop_assert_eq!(line_award(ante, filled), expected);
    }

    /// Chips drop by exactly one ante per accepted placement and never
    /// move on a refused one.
    #[test]
    fn prop_ante_charged_once_per_placement(
        seed in any::<u64>(),
        ante in 1u64..20,
        drops in prop::collection::vec((arb_slot(), 0usize..2), 1..40),
    ) {
        let config = StackemConfig::default().with_ante(ante);
        let mut engine = StackemEngine::new(config, session(10_000), seed).unwrap();

        for (slot, choice) in drops {
            if engine.hand().is_empty() && engine.deal().is_err() {
                break;
            }
            let Some(card) = engine.hand().first().copied() else {
                break;
            };
            let before = engine.session().chips();

            let charged = match engine.place(card.id, slot) {
                Err(_) => false,
                Ok(PlaceOutcome::AwaitingAce { .. }) => {
                    engine.choose_ace([1, 11][choice]).is_ok()
                }
                Ok(PlaceOutcome::AwaitingWild { options, .. }) => {
                    engine.choose_wild(options[choice.min(options.len() - 1)]).is_ok()
                }
                Ok(_) => true,
            };

            let expected = if charged { before - ante } else { before };
            prop_assert_eq!(engine.session().chips(), expected);
            prop_assert!(engine.session_winnings() == 0 || engine.grid().placed_count() >= 2);
        }
    }

    /// Collecting twice in a row only pays once.
    #[test]
    fn prop_collect_idempotent(seed in any::<u64>(), placements in 1usize..25) {
        let mut engine = StackemEngine::new(StackemConfig::default(), session(10_000), seed).unwrap();
        for slot in SlotIndex::playable().take(placements) {
            if engine.hand().is_empty() && engine.deal().is_err() {
                break;
            }
            let card = engine.hand()[0];
            match engine.place(card.id, slot) {
                Ok(PlaceOutcome::AwaitingAce { .. }) => { engine.choose_ace(11).unwrap(); }
                Ok(PlaceOutcome::AwaitingWild { options, .. }) => { engine.choose_wild(options[0]).unwrap(); }
                _ => {}
            }
        }

        let now = Instant::now();
        let winnings = engine.session_winnings();
        let chips = engine.session().chips();
        prop_assert_eq!(engine.collect(now), winnings);
        prop_assert_eq!(engine.collect(now), 0);
        prop_assert_eq!(engine.session().chips(), chips + winnings);
        prop_assert_eq!(engine.session_winnings(), 0);
    }

    /// A round pays at the auto target when the target is reachable, and
    /// crashes at the crash point otherwise.
    #[test]
    fn prop_auto_cash_out_races_crash(
        crash_point in arb_multiplier(),
        target in arb_multiplier(),
        bet in 1u64..500,
        frame_ms in 10u64..100,
    ) {
        let mut engine = CrashEngine::new(CrashConfig::default(), session(1000), 0).unwrap();
        engine.set_auto_cash_out(Some(target)).unwrap();
        let t0 = Instant::now();
        engine.launch_with_crash_point(bet, crash_point, t0).unwrap();

        let mut now = t0;
        let outcome = loop {
            now += Duration::from_millis(frame_ms);
            match engine.tick(now) {
                TickOutcome::Running { multiplier } => prop_assert!(multiplier < crash_point),
                outcome => break outcome,
            }
        };

        match outcome {
            TickOutcome::CashedOut(c) => {
                prop_assert!(target <= crash_point);
                prop_assert_eq!(c.multiplier, target);
                prop_assert_eq!(c.payout, (bet as f64 * target).floor() as u64);
                prop_assert_eq!(engine.session().chips(), 1000 - bet + c.payout);
            }
            TickOutcome::Crashed { crash: c, explosion } => {
                prop_assert!(explosion);
                prop_assert!(target > crash_point);
                prop_assert_eq!(c.crash_point, crash_point);
                prop_assert_eq!(engine.session().chips(), 1000 - bet);
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }
}
