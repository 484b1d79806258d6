//! Error types shared by the engines and the persistence layer.
//!
//! Engine errors never represent a fatal condition: an `Err` from any
//! engine operation means the action was refused and no state changed.
//! Hosts that mirror the "ignore invalid input" behavior of the UI can
//! simply drop the error.

use thiserror::Error;

/// A refused engine action.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// The action is not legal in the current phase (deal while holding
    /// cards, cash-out while idle, drop onto an illegal slot, ...).
    #[error("invalid action: {reason}")]
    InvalidAction { reason: &'static str },

    /// The bet or ante exceeds the chip balance.
    #[error("insufficient funds (needed={needed}, available={available})")]
    InsufficientFunds { needed: u64, available: u64 },

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// An engine snapshot could not be encoded or decoded.
    #[error("snapshot codec error: {0}")]
    Snapshot(String),
}

impl GameError {
    pub(crate) const fn invalid(reason: &'static str) -> Self {
        Self::InvalidAction { reason }
    }
}

/// A failed call against the external wallet/preferences store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("unknown user {0}")]
    UnknownUser(String),

    #[error("write rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = GameError::InsufficientFunds {
            needed: 50,
            available: 10,
        };
        assert_eq!(err.to_string(), "insufficient funds (needed=50, available=10)");

        let err = GameError::invalid("deck exhausted");
        assert_eq!(err.to_string(), "invalid action: deck exhausted");

        let err = StoreError::UnknownUser("u1".into());
        assert_eq!(err.to_string(), "unknown user u1");
    }
}
