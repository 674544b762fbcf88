//! Error types for engine configuration and move handling.

use crate::interface::Player;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Neither a time budget nor a maximum depth was configured.
    #[error("search needs a time budget or a maximum depth")]
    Unbounded,

    #[error("time budget must be positive")]
    ZeroTimeout,

    /// Iterative deepening starts at depth 2.
    #[error("maximum search depth must be at least 2, got {0}")]
    DepthTooShallow(u32),

    #[error("history base must be finite and at least 1, got {0}")]
    InvalidHistoryBase(f32),

    /// The move string could not be parsed for this game.
    #[error("malformed move `{0}`")]
    MalformedMove(String),

    /// The move parsed but is not legal in the current position.
    #[error("illegal move `{notation}` after {ply} moves")]
    IllegalMove { notation: String, ply: usize },

    #[error("the game is already over")]
    GameOver,

    #[error("{0} has no move to play")]
    NoMove(Player),
}

pub type Result<T> = std::result::Result<T, Error>;
