use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("not a card: {0:?}")]
    BadCard(String),
    #[error("deck exhausted")]
    DeckExhausted,
    #[error("hand already complete")]
    HandAlreadyComplete,
    #[error("it's not seat {actual}'s turn (expected seat {expected})")]
    NotSeatsTurn { expected: usize, actual: usize },
    #[error("no decision pending")]
    NoDecisionPending,
    #[error("action {action:?} is not legal here")]
    IllegalAction { action: String },
    #[error("seat {0} is not in the hand")]
    UnknownSeat(usize),
    #[error("tournament needs 2-9 players, got {0}")]
    BadPlayerCount(usize),
    #[error("chip accounting violated: {0}")]
    ChipConservation(String),
}
