//! Iterative-deepening negamax search for two-player, perfect-information,
//! zero-sum games.
//!
//! A game plugs in by implementing [`Rules`]; a [`Strategy`] such as
//! [`Negamax`] then picks a successor position for the side to move.
//! Tic-Tac-Toe, Connect Four and Nine Men's Morris ship in [`games`].

pub mod error;
pub mod games;
pub mod interface;
pub mod strategies;
pub mod util;

pub use error::{Error, Result};
pub use interface::{
    loss_after, Evaluation, Player, Rules, Strategy, Utility, Winner, BEST_EVAL, DECISIVE,
    WORST_EVAL,
};
pub use strategies::negamax::{Negamax, NegamaxOptions, SearchStats};
pub use strategies::random::Random;
pub use strategies::utilimax::Utilimax;
