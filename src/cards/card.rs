//! Playing cards for Stack'em.
//!
//! Standard cards carry blackjack values. Aces default to 11 and Wild
//! cards to 0 until the player picks a value at placement time; Swap cards
//! never count towards a line.

use serde::{Deserialize, Serialize};

/// Identifier of a card within one session. Unique across reshuffles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
            Suit::Spades => '♠',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Blackjack value; Ace counts 11 until resolved.
    #[must_use]
    pub const fn default_value(self) -> u8 {
        match self {
            Rank::Ace => 11,
            Rank::Jack | Rank::Queen | Rank::King => 10,
            _ => self as u8,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

/// What a card does when placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Standard,
    /// Exchanges places with a card already on the board.
    Swap,
    /// Takes any value still available in the deck.
    Wild,
}

/// A single card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub suit: Suit,
    pub rank: Rank,
    /// Value counted on the board.
    pub value: u8,
    /// Taken out of the deck (into hand, onto the board, or consumed by a wild).
    pub is_dealt: bool,
    pub kind: CardKind,
}

impl Card {
    /// A standard card with its blackjack value.
    #[must_use]
    pub fn standard(id: CardId, suit: Suit, rank: Rank) -> Self {
        Self {
            id,
            suit,
            rank,
            value: rank.default_value(),
            is_dealt: false,
            kind: CardKind::Standard,
        }
    }

    #[must_use]
    pub fn swap(id: CardId, suit: Suit, rank: Rank) -> Self {
        Self {
            value: 0,
            kind: CardKind::Swap,
            ..Self::standard(id, suit, rank)
        }
    }

    #[must_use]
    pub fn wild(id: CardId, suit: Suit, rank: Rank) -> Self {
        Self {
            value: 0,
            kind: CardKind::Wild,
            ..Self::standard(id, suit, rank)
        }
    }

    #[must_use]
    pub fn is_standard(&self) -> bool {
        self.kind == CardKind::Standard
    }

    #[must_use]
    pub fn is_swap_card(&self) -> bool {
        self.kind == CardKind::Swap
    }

    #[must_use]
    pub fn is_wild_card(&self) -> bool {
        self.kind == CardKind::Wild
    }

    /// A standard Ace, whose value is picked at placement.
    #[must_use]
    pub fn is_ace(&self) -> bool {
        self.is_standard() && self.rank == Rank::Ace
    }

    /// Restore the value a card had before any placement choice.
    pub fn reset_value(&mut self) {
        self.value = match self.kind {
            CardKind::Standard => self.rank.default_value(),
            CardKind::Swap | CardKind::Wild => 0,
        };
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            CardKind::Standard => write!(f, "{}{}", self.rank.label(), self.suit.symbol()),
            CardKind::Swap => f.write_str("SWAP"),
            CardKind::Wild => f.write_str("WILD"),
        }
    }
}
