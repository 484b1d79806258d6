//! Stack'em integration tests driving the engine through its public API.

use std::time::{Duration, Instant};

use minigame_hub::cards::CardKind;
use minigame_hub::core::{Difficulty, GameError, Session, StackemConfig};
use minigame_hub::persistence::{GameKey, MemoryStore, OutboxConfig, Wallet, WalletStore};
use minigame_hub::stackem::{
    DealOutcome, Phase, PlaceOutcome, SlotIndex, StackemEngine, StackemSnapshot,
};

fn session(chips: u64) -> Session {
    Session::new("player-1", Wallet {
        chips,
        level: 1,
        experience: 0,
    })
}

/// Place the top card somewhere legal, resolving Ace and Wild choices.
/// Returns false if no legal placement exists.
fn play_top_card(engine: &mut StackemEngine) -> bool {
    let Some(card) = engine.hand().first().copied() else {
        return false;
    };

    let target = if card.kind == CardKind::Swap {
        engine.grid().placed().map(|(slot, _)| slot).next()
    } else {
        engine.grid().open_slots().next()
    };
    let Some(slot) = target else {
        return false;
    };

    match engine.place(card.id, slot).unwrap() {
        PlaceOutcome::AwaitingAce { .. } => {
            engine.choose_ace(1).unwrap();
        }
        PlaceOutcome::AwaitingWild { options, .. } => {
            engine.choose_wild(options[0]).unwrap();
        }
        PlaceOutcome::Placed(_) | PlaceOutcome::Swapped { .. } => {}
    }
    true
}

/// Engine after its first deal, skipping seeds whose top card is a swap
/// (a swap needs an occupied slot).
fn dealt_engine(config: &StackemConfig, mut make_session: impl FnMut() -> Session) -> StackemEngine {
    (0..)
        .map(|seed| {
            let mut engine = StackemEngine::new(config.clone(), make_session(), seed).unwrap();
            engine.deal().unwrap();
            engine
        })
        .find(|e| e.hand()[0].kind != CardKind::Swap)
        .unwrap()
}

// =============================================================================
// Dealing
// =============================================================================

#[test]
fn test_first_deal_fills_hand() {
    let mut engine = StackemEngine::new(StackemConfig::default(), session(500), 42).unwrap();
    assert_eq!(engine.phase(), &Phase::Idle);

    let DealOutcome::Dealt { cards, .. } = engine.deal().unwrap() else {
        panic!("expected a deal");
    };
    assert_eq!(cards.len(), 3);
    assert_eq!(engine.hand(), cards.as_slice());
    assert!(engine.hand().iter().all(|c| c.is_dealt));
    assert_eq!(engine.undealt_count(), 53);
}

#[test]
fn test_ante_locked_after_first_deal() {
    let mut engine = StackemEngine::new(StackemConfig::default(), session(500), 42).unwrap();
    engine.set_ante(25).unwrap();
    engine.deal().unwrap();

    assert!(matches!(engine.set_ante(5), Err(GameError::InvalidAction { .. })));
    assert_eq!(engine.ante(), 25);
}

#[test]
fn test_same_seed_same_deal() {
    let mut a = StackemEngine::new(StackemConfig::default(), session(500), 99).unwrap();
    let mut b = StackemEngine::new(StackemConfig::default(), session(500), 99).unwrap();

    assert_eq!(a.deal().unwrap(), b.deal().unwrap());
}

// =============================================================================
// Placement
// =============================================================================

#[test]
fn test_each_placement_costs_one_ante() {
    let config = StackemConfig::default().with_ante(5);
    let mut total = 0;

    for seed in 0..5 {
        let mut engine = StackemEngine::new(config.clone(), session(1000), seed).unwrap();
        let mut placements: u64 = 0;
        'game: for _ in 0..20 {
            if engine.deal().is_err() {
                break;
            }
            while !engine.hand().is_empty() {
                if !play_top_card(&mut engine) {
                    break 'game;
                }
                placements += 1;
            }
        }

        assert_eq!(engine.session().chips(), 1000 - 5 * placements);
        total += placements;
    }
    assert!(total > 0);
}

#[test]
fn test_broke_player_cannot_place() {
    let config = StackemConfig::default().with_ante(50);
    let mut engine = StackemEngine::new(config, session(40), 3).unwrap();
    engine.deal().unwrap();

    let card = engine.hand()[0];
    let slot = SlotIndex::new(1, 1).unwrap();
    assert_eq!(
        engine.place(card.id, slot),
        Err(GameError::InsufficientFunds {
            needed: 50,
            available: 40
        })
    );
    assert_eq!(engine.hand().len(), 3);
    assert_eq!(engine.session().chips(), 40);
}

#[test]
fn test_hard_board_has_no_preset_21() {
    for seed in 0..20 {
        let config = StackemConfig::default().with_difficulty(Difficulty::Hard);
        let engine = StackemEngine::new(config, session(100), seed).unwrap();
        for slot in SlotIndex::playable() {
            for line in slot.lines() {
                assert!(engine.grid().line_total(line) < 21);
            }
        }
    }
}

// =============================================================================
// Winnings and leveling
// =============================================================================

#[test]
fn test_collect_is_idempotent() {
    let mut engine = StackemEngine::new(StackemConfig::default(), session(100), 1).unwrap();
    let now = Instant::now();

    assert_eq!(engine.collect(now), 0);
    assert_eq!(engine.collect(now), 0);
    assert!(!engine.level_check_pending());
    assert_eq!(engine.session().chips(), 100);
}

#[test]
fn test_poll_before_delay_does_nothing() {
    let config = StackemConfig::default().with_level_check_delay(Duration::from_secs(2));
    let mut engine = StackemEngine::new(config, session(100), 1).unwrap();
    assert_eq!(engine.poll(Instant::now()), None);
}

// =============================================================================
// Session hand-off
// =============================================================================

#[test]
fn test_session_writes_reach_store() {
    let mut store = MemoryStore::new();
    store.insert_user("player-1", Wallet {
        chips: 300,
        level: 1,
        experience: 0,
    });
    let mut engine = dealt_engine(&StackemConfig::default(), || {
        Session::load(&store, "player-1", OutboxConfig::default()).unwrap()
    });
    assert!(play_top_card(&mut engine));
    engine.session_mut().mark_tutorial_seen(GameKey::Stackem);

    let (summary, mut session) = engine.end_game();
    assert_eq!(summary.cards_placed, 1);

    let report = session.flush(&mut store);
    assert!(report.is_clean());
    assert_eq!(store.get_wallet("player-1").unwrap().chips, 290);
    assert!(store
        .get_preferences("player-1")
        .unwrap()
        .flag(&GameKey::Stackem.tutorial_flag()));
}

#[test]
fn test_snapshot_restore_continues_game() {
    let mut engine = dealt_engine(&StackemConfig::default(), || session(500));
    assert!(play_top_card(&mut engine));

    let bytes = engine.snapshot().to_bytes().unwrap();
    let snapshot = StackemSnapshot::from_bytes(&bytes).unwrap();
    let mut restored = StackemEngine::restore(snapshot, session(500), Instant::now()).unwrap();

    assert_eq!(restored.hand(), engine.hand());
    assert_eq!(restored.grid(), engine.grid());
    assert!(play_top_card(&mut restored));
    assert!(play_top_card(&mut engine));
    assert_eq!(restored.grid(), engine.grid());
}

#[test]
fn test_corrupt_snapshot_rejected() {
    assert!(matches!(
        StackemSnapshot::from_bytes(&[1, 2, 3]),
        Err(GameError::Snapshot(_))
    ));
}
