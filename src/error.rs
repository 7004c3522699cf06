use thiserror::Error;
use crate::{MAX_PLAYERS, MIN_PLAYERS};

/// Errors that can happen while setting up a game or loading its inputs.
///
/// Once a game is running nothing a player does produces an error: illegal
/// input is dropped and the current prompt stays up.
#[derive(Debug, Error)]
pub enum CoupError {
    #[error("a game needs {min} to {max} players, got {0}", min = MIN_PLAYERS, max = MAX_PLAYERS)]
    InvalidPlayerCount(usize),

    #[error("player {0} has an empty name")]
    EmptyName(usize),

    #[error("start player {start} is out of range for {players} players")]
    StartPlayerOutOfRange { start: usize, players: usize },

    #[error("the deck can't supply the requested card overrides")]
    ImpossibleOverrides,

    #[error("malformed transcript event on row {0}")]
    MalformedEvent(usize),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
