//! A definition of the game Tic-Tac-Toe.
//!
//! For example, playing a correctly-implemented strategy against itself should
//! always result in a draw; and playing such a strategy against one that picks
//! moves randomly should always result in a win or draw.

use crate::error::{Error, Result};
use crate::interface::*;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

const CELLS: u8 = 9;
// Low bit of every cell.
const FIRST_BITS: u32 = 0x15555;
const TURN_BIT: u32 = 1 << 18;

const LINES: [[u8; 3]; 8] =
    [[0, 1, 2], [3, 4, 5], [6, 7, 8], [0, 3, 6], [1, 4, 7], [2, 5, 8], [0, 4, 8], [2, 4, 6]];

const fn line_masks() -> [u32; 8] {
    let mut masks = [0; 8];
    let mut i = 0;
    while i < LINES.len() {
        let mut k = 0;
        while k < 3 {
            masks[i] |= 1 << (2 * LINES[i][k] as u32);
            k += 1;
        }
        i += 1;
    }
    masks
}

// Winning lines for the first player; shift left by one for the second.
const LINE_MASKS: [u32; 8] = line_masks();

fn piece_bits(player: Player) -> u32 {
    match player {
        Player::First => 0b01,
        Player::Second => 0b10,
    }
}

/// Two bits per cell, row-major: `01` for X, `10` for O.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: u32,
    to_move: Player,
    last: Option<Place>,
}

impl Default for Board {
    fn default() -> Board {
        Board { cells: 0, to_move: Player::First, last: None }
    }
}

impl Board {
    /// Board from nine cells of `X`, `O` or `.`; whitespace is ignored.
    /// The side to move follows from the piece counts.
    pub fn setup(squares: &str) -> Result<Board> {
        let malformed = || Error::MalformedMove(squares.to_string());
        let mut cells = 0;
        let mut counts = [0; 2];
        let mut n = 0;
        for c in squares.chars().filter(|c| !c.is_whitespace()) {
            if n >= CELLS {
                return Err(malformed());
            }
            let player = match c {
                'X' => Some(Player::First),
                'O' => Some(Player::Second),
                '.' => None,
                _ => return Err(malformed()),
            };
            if let Some(player) = player {
                cells |= piece_bits(player) << (2 * n);
                counts[player.index()] += 1;
            }
            n += 1;
        }
        let to_move = match counts[0] - counts[1] {
            0 => Player::First,
            1 => Player::Second,
            _ => return Err(malformed()),
        };
        if n != CELLS {
            return Err(malformed());
        }
        Ok(Board { cells, to_move, last: None })
    }

    pub fn square(&self, i: u8) -> Option<Player> {
        match (self.cells >> (2 * i)) & 0b11 {
            0b01 => Some(Player::First),
            0b10 => Some(Player::Second),
            _ => None,
        }
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    fn stones(&self) -> u32 {
        self.cells.count_ones()
    }

    fn place(&self, i: u8) -> Board {
        Board {
            cells: self.cells | piece_bits(self.to_move) << (2 * i),
            to_move: self.to_move.opponent(),
            last: Some(Place(i)),
        }
    }

    fn has_line(&self, player: Player) -> bool {
        let shift = player.index();
        LINE_MASKS.iter().any(|&m| self.cells & (m << shift) == m << shift)
    }

    /// The same board with X and O swapped, including the side to move.
    pub fn mirrored(&self) -> Board {
        Board {
            cells: (self.cells & FIRST_BITS) << 1 | (self.cells >> 1) & FIRST_BITS,
            to_move: self.to_move.opponent(),
            last: self.last,
        }
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let square = |i| match self.square(i) {
            Some(Player::First) => 'X',
            Some(Player::Second) => 'O',
            None => ' ',
        };
        for row in 0..3 {
            if row > 0 {
                writeln!(f, "-+-+-")?;
            }
            writeln!(f, "{}|{}|{}", square(row * 3), square(row * 3 + 1), square(row * 3 + 2))?;
        }
        Ok(())
    }
}

/// A mark on cell 0 to 8, row-major.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Place(pub u8);

impl Display for Place {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Place {
    type Err = Error;

    fn from_str(s: &str) -> Result<Place> {
        match s.trim().parse::<u8>() {
            Ok(i) if i < CELLS => Ok(Place(i)),
            _ => Err(Error::MalformedMove(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct TicTacToe;

impl Rules for TicTacToe {
    type Position = Board;
    type Move = Place;
    type Line = ();

    const NAME: &'static str = "tictactoe";
    const ROLES: [&'static str; 2] = ["X", "O"];

    fn initial(&self) -> Board {
        Board::default()
    }

    fn active_player(&self, b: &Board) -> Player {
        b.to_move
    }

    fn last_move(&self, b: &Board) -> Option<Place> {
        b.last
    }

    fn move_id(&self, b: &Board) -> u16 {
        b.last.map_or(0, |p| p.0 as u16)
    }

    fn state_hash(&self, b: &Board) -> u64 {
        let turn = if b.to_move == Player::Second { TURN_BIT } else { 0 };
        (b.cells | turn) as u64
    }

    fn expand(&self, b: &Board) -> Vec<Board> {
        (0..CELLS).filter(|&i| b.square(i).is_none()).map(|i| b.place(i)).collect()
    }

    fn evaluate_terminal(&self, b: &Board, _: &()) -> Option<Evaluation> {
        if b.has_line(b.to_move.opponent()) {
            Some(loss_after(b.stones()))
        } else if b.stones() == CELLS as u32 {
            Some(0.0)
        } else {
            None
        }
    }

    // Open two-in-a-rows and the centre, for the side to move.
    fn heuristic(&self, b: &Board) -> Evaluation {
        let mover = b.to_move;
        let mut score = 0;
        for line in LINES.iter() {
            let (mut mine, mut theirs) = (0, 0);
            for &i in line.iter() {
                match b.square(i) {
                    Some(p) if p == mover => mine += 1,
                    Some(_) => theirs += 1,
                    None => {}
                }
            }
            match (mine, theirs) {
                (2, 0) => score += 1,
                (0, 2) => score -= 1,
                _ => {}
            }
        }
        match b.square(4) {
            Some(p) if p == mover => score += 1,
            Some(_) => score -= 1,
            None => {}
        }
        0.05 * score as Evaluation + 0.001
    }
}
