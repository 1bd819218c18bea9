use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Invalid card notation: {0}")]
    InvalidCardNotation(String),

    #[error("Invalid board notation: {0}")]
    InvalidBoardNotation(String),

    #[error("Invalid hand notation: {0}")]
    InvalidHandNotation(String),

    #[error("Hand must be exactly 2 cards")]
    InvalidHandSize,

    #[error("Need at least {need} cards, got {got}")]
    NotEnoughCards { need: usize, got: usize },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Hand record rejected: {0}")]
    Input(String),

    #[error("External service failed: {0}")]
    ExternalService(String),

    #[error("No valid villain combos after removing dead cards")]
    NoValidCombos,

    #[error("Computation failed: {0}")]
    Computation(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type CoachResult<T> = Result<T, CoachError>;
