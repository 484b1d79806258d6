//! Deck construction for Stack'em.
//!
//! A full deck is the 52 standard cards plus four specials:
//! - 2 Swap cards with a random suit and rank
//! - 1 Wild card copying the identity of a random standard card
//! - 1 Wild card with a random suit and rank
//!
//! The result is shuffled with a uniform permutation. Reshuffles build the
//! same deck minus the standard cards already locked on the board.

use rustc_hash::FxHashSet;

use super::card::{Card, CardId, Rank, Suit};
use crate::core::GameRng;

/// Standard cards in a full deck.
pub const STANDARD_CARDS: usize = 52;

/// Swap cards added to each deck.
pub const SWAP_CARDS: usize = 2;

/// Wild cards added to each deck.
pub const WILD_CARDS: usize = 2;

/// Cards in a full deck.
pub const DECK_SIZE: usize = STANDARD_CARDS + SWAP_CARDS + WILD_CARDS;

/// Build a full shuffled deck with ids starting at `first_id`.
pub fn build_deck(rng: &mut GameRng, first_id: CardId) -> Vec<Card> {
    build_deck_excluding(rng, first_id, &FxHashSet::default())
}

/// Build a shuffled deck that omits standard cards whose suit and rank are
/// in `exclude`. Specials are always included. Ids are assigned
/// sequentially from `first_id` before shuffling.
pub fn build_deck_excluding(
    rng: &mut GameRng,
    first_id: CardId,
    exclude: &FxHashSet<(Suit, Rank)>,
) -> Vec<Card> {
    let mut next = first_id.raw();
    let mut alloc = || {
        let id = CardId(next);
        next += 1;
        id
    };

    let mut cards = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            if !exclude.contains(&(suit, rank)) {
                cards.push(Card::standard(alloc(), suit, rank));
            }
        }
    }

    for _ in 0..SWAP_CARDS {
        let (suit, rank) = random_identity(rng);
        cards.push(Card::swap(alloc(), suit, rank));
    }

    let (suit, rank) = match rng.choose(&cards[..cards.len() - SWAP_CARDS]) {
        Some(card) => (card.suit, card.rank),
        None => random_identity(rng),
    };
    cards.push(Card::wild(alloc(), suit, rank));

    let (suit, rank) = random_identity(rng);
    cards.push(Card::wild(alloc(), suit, rank));

    rng.shuffle(&mut cards);
    cards
}

fn random_identity(rng: &mut GameRng) -> (Suit, Rank) {
    let suit = Suit::ALL[rng.gen_range_usize(0..Suit::ALL.len())];
    let rank = Rank::ALL[rng.gen_range_usize(0..Rank::ALL.len())];
    (suit, rank)
}
