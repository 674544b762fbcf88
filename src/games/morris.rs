//! Nine Men's Morris.
//!
//! Points are numbered 0 to 23 row by row from the top left of the board.
//! Each point takes two bits of a `u64` (`01` white, `10` black); bit 50 is
//! set when black is to move. Play goes through placement (nine pieces
//! each), sliding to adjacent points and, with three pieces left, flying.
//! Closing a mill removes an enemy piece.
//!
//! Repetitions are tracked along the line of play: reaching a position a
//! second time after placement ends the game as a draw.

use crate::error::{Error, Result};
use crate::interface::*;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

pub const POINTS: u8 = 24;
const PIECES: u8 = 9;
const TURN_BIT: u64 = 1 << 50;
const FLYING: u8 = 3;

// The two other points of each mill through a point.
const MILLS: [[[u8; 2]; 2]; 24] = [
    [[1, 2], [9, 21]],
    [[0, 2], [4, 7]],
    [[0, 1], [14, 23]],
    [[4, 5], [10, 18]],
    [[3, 5], [1, 7]],
    [[3, 4], [13, 20]],
    [[7, 8], [11, 15]],
    [[6, 8], [1, 4]],
    [[6, 7], [12, 17]],
    [[10, 11], [0, 21]],
    [[9, 11], [3, 18]],
    [[9, 10], [6, 15]],
    [[13, 14], [8, 17]],
    [[12, 14], [5, 20]],
    [[12, 13], [2, 23]],
    [[16, 17], [6, 11]],
    [[15, 17], [19, 22]],
    [[15, 16], [8, 12]],
    [[19, 20], [3, 10]],
    [[18, 20], [16, 22]],
    [[18, 19], [5, 13]],
    [[22, 23], [0, 9]],
    [[21, 23], [16, 19]],
    [[21, 22], [2, 14]],
];

const ADJACENT: [&[u8]; 24] = [
    &[1, 9],
    &[0, 2, 4],
    &[1, 14],
    &[4, 10],
    &[1, 3, 5, 7],
    &[4, 13],
    &[7, 11],
    &[4, 6, 8],
    &[7, 12],
    &[0, 10, 21],
    &[3, 9, 11, 18],
    &[6, 10, 15],
    &[8, 13, 17],
    &[5, 12, 14, 20],
    &[2, 13, 23],
    &[11, 16],
    &[15, 17, 19],
    &[12, 16],
    &[10, 19],
    &[16, 18, 20, 22],
    &[13, 19],
    &[9, 22],
    &[19, 21, 23],
    &[14, 22],
];

const DIAGRAM: &str = "\
@----@----@
|    |    |
| @--@--@ |
| |  |  | |
| | @@@ | |
@-@-@ @-@-@
| | @@@ | |
| |  |  | |
| @--@--@ |
|    |    |
@----@----@";

fn piece_bits(player: Player) -> u64 {
    match player {
        Player::First => 0b01,
        Player::Second => 0b10,
    }
}

/// A placement (`from` is `None`), slide or jump, and the enemy piece it
/// removes, if any.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MorrisMove {
    pub from: Option<u8>,
    pub to: u8,
    pub capture: Option<u8>,
}

impl MorrisMove {
    /// Dense id below 15000.
    pub fn id(&self) -> u16 {
        let point = |p: Option<u8>| p.map_or(0, |p| p as u16 + 1);
        point(self.from) * 600 + self.to as u16 * 25 + point(self.capture)
    }
}

impl Display for MorrisMove {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let point = |p: Option<u8>| p.map_or(-1, |p| p as i8);
        write!(f, "{},{},{}", point(self.from), self.to, point(self.capture))
    }
}

impl FromStr for MorrisMove {
    type Err = Error;

    fn from_str(s: &str) -> Result<MorrisMove> {
        let malformed = || Error::MalformedMove(s.to_string());
        let points = s
            .split(',')
            .map(|p| match p.trim().parse::<i8>() {
                Ok(-1) => Ok(None),
                Ok(p) if (0..POINTS as i8).contains(&p) => Ok(Some(p as u8)),
                _ => Err(malformed()),
            })
            .collect::<Result<Vec<_>>>()?;
        match points[..] {
            [from, Some(to), capture] => Ok(MorrisMove { from, to, capture }),
            _ => Err(malformed()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: u64,
    unplayed: [u8; 2],
    remaining: [u8; 2],
    last: Option<MorrisMove>,
    plies: u16,
}

impl Default for Board {
    fn default() -> Board {
        Board { cells: 0, unplayed: [PIECES; 2], remaining: [PIECES; 2], last: None, plies: 0 }
    }
}

impl Board {
    /// A position after placement with pieces on the given points.
    pub fn setup(white: &[u8], black: &[u8], to_move: Player) -> Result<Board> {
        let mut board = Board { unplayed: [0; 2], plies: 2 * PIECES as u16, ..Board::default() };
        for (player, points) in [(Player::First, white), (Player::Second, black)] {
            if points.len() > PIECES as usize {
                return Err(Error::MalformedMove(format!("{} pieces for {}", points.len(), player)));
            }
            for &p in points {
                if p >= POINTS || board.owner(p).is_some() {
                    return Err(Error::MalformedMove(format!("point {} for {}", p, player)));
                }
                board.cells |= piece_bits(player) << (2 * p);
            }
            board.remaining[player.index()] = points.len() as u8;
        }
        if to_move == Player::Second {
            board.cells |= TURN_BIT;
        }
        Ok(board)
    }

    pub fn owner(&self, point: u8) -> Option<Player> {
        match (self.cells >> (2 * point)) & 0b11 {
            0b01 => Some(Player::First),
            0b10 => Some(Player::Second),
            _ => None,
        }
    }

    pub fn to_move(&self) -> Player {
        if self.cells & TURN_BIT == 0 {
            Player::First
        } else {
            Player::Second
        }
    }

    /// Pieces still to be placed.
    pub fn unplayed(&self, player: Player) -> u8 {
        self.unplayed[player.index()]
    }

    /// Pieces on the board or still to be placed.
    pub fn remaining(&self, player: Player) -> u8 {
        self.remaining[player.index()]
    }

    /// Either side still has pieces to place.
    pub fn placing(&self) -> bool {
        self.unplayed != [0, 0]
    }

    fn sliding(&self, player: Player) -> bool {
        self.unplayed(player) == 0 && self.remaining(player) > FLYING
    }

    fn points_of(&self, player: Option<Player>) -> impl Iterator<Item = u8> + '_ {
        (0..POINTS).filter(move |&p| self.owner(p) == player)
    }

    fn can_slide(&self, player: Player) -> bool {
        self.points_of(Some(player))
            .any(|p| ADJACENT[p as usize].iter().any(|&q| self.owner(q).is_none()))
    }

    fn in_mill(&self, point: u8, player: Player) -> bool {
        MILLS[point as usize]
            .iter()
            .any(|mill| mill.iter().all(|&q| self.owner(q) == Some(player)))
    }

    // Enemy pieces outside mills, or all of them when every one is in a mill.
    fn removable(&self, enemy: Player) -> Vec<u8> {
        let (in_mills, free): (Vec<u8>, Vec<u8>) =
            self.points_of(Some(enemy)).partition(|&p| self.in_mill(p, enemy));
        if free.is_empty() {
            in_mills
        } else {
            free
        }
    }

    fn play(&self, m: MorrisMove) -> Board {
        let mover = self.to_move();
        let mut next = *self;
        next.cells ^= TURN_BIT;
        match m.from {
            Some(from) => next.cells &= !(0b11 << (2 * from)),
            None => next.unplayed[mover.index()] -= 1,
        }
        next.cells |= piece_bits(mover) << (2 * m.to);
        if let Some(capture) = m.capture {
            next.cells &= !(0b11 << (2 * capture));
            next.remaining[mover.opponent().index()] -= 1;
        }
        next.last = Some(m);
        next.plies += 1;
        next
    }

    // Adds the move, or one successor per removable piece if it closes a mill.
    fn push_moves(&self, from: Option<u8>, to: u8, successors: &mut Vec<Board>) {
        let mover = self.to_move();
        let moved = self.play(MorrisMove { from, to, capture: None });
        let captures = if moved.in_mill(to, mover) {
            self.removable(mover.opponent())
        } else {
            Vec::new()
        };
        if captures.is_empty() {
            successors.push(moved);
        } else {
            successors.extend(
                captures.into_iter().map(|c| self.play(MorrisMove { from, to, capture: Some(c) })),
            );
        }
    }

    /// The same position with colours swapped, including the side to move.
    pub fn mirrored(&self) -> Board {
        const LOW: u64 = 0x5555_5555_5555;
        let pieces = self.cells & ((1 << (2 * POINTS)) - 1);
        let swapped = (pieces & LOW) << 1 | (pieces >> 1) & LOW;
        Board {
            cells: swapped | (self.cells & TURN_BIT) ^ TURN_BIT,
            unplayed: [self.unplayed[1], self.unplayed[0]],
            remaining: [self.remaining[1], self.remaining[0]],
            ..*self
        }
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut point = 0;
        for c in DIAGRAM.chars() {
            if c == '@' {
                let symbol = match self.owner(point) {
                    Some(Player::First) => 'W',
                    Some(Player::Second) => 'B',
                    None => ' ',
                };
                write!(f, "{}", symbol)?;
                point += 1;
            } else {
                write!(f, "{}", c)?;
            }
        }
        writeln!(f)
    }
}

/// Positions reached along the current line of play after placement.
#[derive(Clone, Debug, Default)]
pub struct Repetitions {
    visits: HashMap<u64, u32>,
}

impl Repetitions {
    pub fn count(&self, hash: u64) -> u32 {
        self.visits.get(&hash).copied().unwrap_or(0)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct NineMensMorris;

impl Rules for NineMensMorris {
    type Position = Board;
    type Move = MorrisMove;
    type Line = Repetitions;

    const NAME: &'static str = "ninemensmorris";
    const ROLES: [&'static str; 2] = ["White", "Black"];

    fn initial(&self) -> Board {
        Board::default()
    }

    fn active_player(&self, b: &Board) -> Player {
        b.to_move()
    }

    fn last_move(&self, b: &Board) -> Option<MorrisMove> {
        b.last
    }

    fn move_id(&self, b: &Board) -> u16 {
        b.last.map_or(0, |m| m.id())
    }

    fn state_hash(&self, b: &Board) -> u64 {
        b.cells | (b.unplayed[0] as u64) << 52 | (b.unplayed[1] as u64) << 56
    }

    fn expand(&self, b: &Board) -> Vec<Board> {
        let mover = b.to_move();
        let mut successors = Vec::with_capacity(32);
        if b.placing() {
            for to in b.points_of(None) {
                b.push_moves(None, to, &mut successors);
            }
        } else if b.sliding(mover) {
            for from in b.points_of(Some(mover)) {
                for &to in ADJACENT[from as usize] {
                    if b.owner(to).is_none() {
                        b.push_moves(Some(from), to, &mut successors);
                    }
                }
            }
        } else {
            let empty: Vec<u8> = b.points_of(None).collect();
            for from in b.points_of(Some(mover)) {
                for &to in empty.iter() {
                    b.push_moves(Some(from), to, &mut successors);
                }
            }
        }
        successors
    }

    fn evaluate_terminal(&self, b: &Board, line: &Repetitions) -> Option<Evaluation> {
        if line.count(self.state_hash(b)) > 1 {
            return Some(0.0);
        }
        if b.placing() {
            return None;
        }
        let mover = b.to_move();
        if b.remaining(mover) < FLYING || (b.sliding(mover) && !b.can_slide(mover)) {
            return Some(loss_after(b.plies as u32));
        }
        None
    }

    // Material first, then mobility of the side to move.
    fn heuristic(&self, b: &Board) -> Evaluation {
        let mover = b.to_move();
        let material =
            b.remaining(mover) as Evaluation - b.remaining(mover.opponent()) as Evaluation;
        let mobility: usize = b.points_of(Some(mover)).map(|p| ADJACENT[p as usize].len()).sum();
        (material / 10.0 + mobility as Evaluation / 10_000.0 + 1e-5).clamp(-0.85, 0.85)
    }

    fn enter(&self, b: &Board, line: &mut Repetitions) {
        if !b.placing() {
            *line.visits.entry(self.state_hash(b)).or_insert(0) += 1;
        }
    }

    fn exit(&self, b: &Board, line: &mut Repetitions) {
        if b.placing() {
            return;
        }
        let hash = self.state_hash(b);
        if let Some(count) = line.visits.get_mut(&hash) {
            *count -= 1;
            if *count == 0 {
                line.visits.remove(&hash);
            }
        }
    }
}
