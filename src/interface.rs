//! The common structures and traits.

use crate::error::Error;
use std::fmt::{Display, Formatter, Result};
use std::str::FromStr;

/// An assessment of a game state from the perspective of the player whose turn it is to play.
/// Higher values mean a more favorable state.
/// A proven draw is exactly zero; wins and losses sit near +1 and -1.
pub type Evaluation = f32;

/// Larger than any value a game can produce. Negates to `WORST_EVAL`.
pub const BEST_EVAL: Evaluation = Evaluation::INFINITY;
/// Smaller than any value a game can produce.
pub const WORST_EVAL: Evaluation = -BEST_EVAL;

/// Scores beyond this magnitude are proven wins or losses.
pub const DECISIVE: Evaluation = 0.9;

// Each ply moves a loss this much closer to zero, so that a win in 3 is
// chosen over a win in 5 and a loss in 5 is chosen over a loss in 3.
const PLY_PENALTY: Evaluation = 1e-5;
// Keeps penalized losses well below -DECISIVE.
const MAX_PENALIZED_PLIES: u32 = 5_000;

/// Value of a lost position for the player to move, reached after `plies`
/// moves from the start of the game.
pub fn loss_after(plies: u32) -> Evaluation {
    -1.0 + plies.min(MAX_PENALIZED_PLIES) as Evaluation * PLY_PENALTY
}

/// One of the two sides of a game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    First,
    Second,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }

    /// Dense index for per-player tables.
    pub fn index(self) -> usize {
        match self {
            Player::First => 0,
            Player::Second => 1,
        }
    }

    /// Multiplier turning a mover-relative evaluation into one from the first
    /// player's perspective.
    pub fn sign(self) -> Evaluation {
        match self {
            Player::First => 1.0,
            Player::Second => -1.0,
        }
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match *self {
            Player::First => write!(f, "first player"),
            Player::Second => write!(f, "second player"),
        }
    }
}

/// The result of playing a game until it finishes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Winner {
    /// The player who made the last move won.
    PlayerJustMoved,
    /// Nobody won.
    Draw,
    /// The player who made the last move lost.
    PlayerToMove,
}

impl Winner {
    /// Classify a terminal evaluation for the player to move.
    pub fn from_evaluation(value: Evaluation) -> Winner {
        if value < 0.0 {
            Winner::PlayerJustMoved
        } else if value > 0.0 {
            Winner::PlayerToMove
        } else {
            Winner::Draw
        }
    }
}

/// Scores for both roles plus whether the position is final.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Utility {
    pub scores: [Evaluation; 2],
    pub terminal: bool,
}

impl Utility {
    /// Expand a mover-relative score into per-role scores.
    pub fn for_mover(mover: Player, value: Evaluation, terminal: bool) -> Utility {
        let mut scores = [-value; 2];
        scores[mover.index()] = value;
        Utility { scores, terminal }
    }

    /// Worse than anything for `player`, better than anything for the opponent.
    pub fn worst_for(player: Player) -> Utility {
        let mut scores = [BEST_EVAL; 2];
        scores[player.index()] = WORST_EVAL;
        Utility { scores, terminal: false }
    }

    pub fn score(&self, player: Player) -> Evaluation {
        self.scores[player.index()]
    }

    /// Whether `self` is preferable to `other` for `player`: a higher own
    /// score wins, then a lower opponent score.
    pub fn better_than(&self, other: &Utility, player: Player) -> bool {
        let (mine, theirs) = (self.score(player), other.score(player));
        if mine != theirs {
            return mine > theirs;
        }
        let opponent = player.opponent();
        self.score(opponent) < other.score(opponent)
    }

    /// `role=score` pairs, as announced at the end of a game.
    pub fn announce(&self, roles: [&str; 2]) -> String {
        format!("{}={} {}={}", roles[0], self.scores[0], roles[1], self.scores[1])
    }
}

/// Defines the rules for a two-player, perfect-knowledge game.
///
/// Positions are values: `expand` produces fresh successors and never mutates
/// its argument. The only state shared along a line of play is the `Line`,
/// which the search threads through the recursion with `enter` and `exit`.
pub trait Rules {
    /// The type of the game state.
    type Position: Clone;
    /// The move that produced a position. Its `Display` form is the wire
    /// notation accepted back by `FromStr`.
    type Move: Copy + Eq + Display + FromStr<Err = Error>;
    /// State shared along the current line of play, e.g. repetition tracking.
    type Line: Default;

    const NAME: &'static str;
    /// Role names for the first and second player.
    const ROLES: [&'static str; 2];

    /// The position before any move has been made.
    fn initial(&self) -> Self::Position;

    fn active_player(&self, position: &Self::Position) -> Player;

    /// The move that produced `position`, `None` for the initial position.
    fn last_move(&self, position: &Self::Position) -> Option<Self::Move>;

    /// Dense identifier of the last move, used to index history tables.
    fn move_id(&self, position: &Self::Position) -> u16;

    /// Fingerprint of the position value, independent of move order.
    fn state_hash(&self, position: &Self::Position) -> u64;

    /// All legal successors. Never called on a terminal position.
    fn expand(&self, position: &Self::Position) -> Vec<Self::Position>;

    /// `Some(value)` for the player to move if the position is terminal,
    /// `None` otherwise. Losses come from `loss_after`, draws are zero.
    fn evaluate_terminal(&self, position: &Self::Position, line: &Self::Line)
        -> Option<Evaluation>;

    /// Estimate of a non-terminal position for the player to move.
    /// Strictly inside (-1, 1) and never exactly zero.
    fn heuristic(&self, position: &Self::Position) -> Evaluation;

    /// Called when play or search descends into `position`.
    fn enter(&self, _position: &Self::Position, _line: &mut Self::Line) {}

    /// Undoes the matching `enter`.
    fn exit(&self, _position: &Self::Position, _line: &mut Self::Line) {}

    fn winner(&self, position: &Self::Position, line: &Self::Line) -> Option<Winner> {
        self.evaluate_terminal(position, line).map(Winner::from_evaluation)
    }

    fn utility(&self, position: &Self::Position, line: &Self::Line) -> Utility {
        let mover = self.active_player(position);
        match self.evaluate_terminal(position, line) {
            Some(value) => Utility::for_mover(mover, value, true),
            None => Utility::for_mover(mover, self.heuristic(position), false),
        }
    }

    /// Human-readable notation of the last move, empty for the initial position.
    fn describe(&self, position: &Self::Position) -> String {
        self.last_move(position).map(|m| m.to_string()).unwrap_or_default()
    }
}

/// Defines a method of choosing a move for the current player.
///
/// The line is returned to its original state before `choose_move` returns;
/// committing the chosen move into it is up to the caller.
pub trait Strategy<R: Rules> {
    fn choose_move(&mut self, position: &R::Position, line: &mut R::Line) -> Option<R::Position>;
}
