//! Utility functions for replaying and playing out games.

use crate::error::{Error, Result};
use crate::interface::*;

/// Rebuild a game from its `;`-separated move list.
///
/// Every position from the initial one on is entered into the returned line,
/// so repetitions already on the board count against later moves.
pub fn replay<R: Rules>(rules: &R, moves: &str) -> Result<(R::Position, R::Line)> {
    let mut position = rules.initial();
    let mut line = R::Line::default();
    rules.enter(&position, &mut line);
    let notations = moves.split(';').map(str::trim).filter(|m| !m.is_empty());
    for (ply, notation) in notations.enumerate() {
        let m: R::Move = notation.parse()?;
        if rules.evaluate_terminal(&position, &line).is_some() {
            return Err(Error::GameOver);
        }
        position = rules
            .expand(&position)
            .into_iter()
            .find(|s| rules.last_move(s) == Some(m))
            .ok_or_else(|| Error::IllegalMove { notation: notation.to_string(), ply })?;
        rules.enter(&position, &mut line);
    }
    Ok((position, line))
}

/// Play a game from `start` to the end, `first` moving for the first player
/// and `second` for the second. Each chosen move is entered into `line`.
///
/// Returns the final position and the winner, `None` for a draw.
pub fn play_out<R, S1, S2>(
    rules: &R, start: R::Position, line: &mut R::Line, first: &mut S1, second: &mut S2,
) -> Result<(R::Position, Option<Player>)>
where
    R: Rules,
    S1: Strategy<R> + ?Sized,
    S2: Strategy<R> + ?Sized,
{
    let mut position = start;
    loop {
        let mover = rules.active_player(&position);
        if let Some(value) = rules.evaluate_terminal(&position, line) {
            let winner = match Winner::from_evaluation(value) {
                Winner::Draw => None,
                Winner::PlayerJustMoved => Some(mover.opponent()),
                Winner::PlayerToMove => Some(mover),
            };
            return Ok((position, winner));
        }
        let next = match mover {
            Player::First => first.choose_move(&position, line),
            Player::Second => second.choose_move(&position, line),
        };
        position = next.ok_or(Error::NoMove(mover))?;
        log::info!("{} plays {}", R::ROLES[mover.index()], rules.describe(&position));
        rules.enter(&position, line);
    }
}
