//! Connect Four on the standard 7 by 6 grid.
//!
//! Each player's discs are a `u64` with cell index `col * 6 + row`, row 0 at
//! the bottom. A move is named by the cell index its disc lands on.

use crate::error::{Error, Result};
use crate::interface::*;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

pub const COLS: u8 = 7;
pub const ROWS: u8 = 6;
const CELLS: u8 = COLS * ROWS;
const COLUMN: u64 = (1 << ROWS) - 1;
const CENTRE: u64 = COLUMN << (3 * ROWS);
const TURN_BIT: u64 = 1 << 49;

const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

const fn winning_lines() -> [u64; 69] {
    let mut lines = [0; 69];
    let mut n = 0;
    let mut col = 0;
    while col < COLS as i32 {
        let mut row = 0;
        while row < ROWS as i32 {
            let mut d = 0;
            while d < DIRECTIONS.len() {
                let (dc, dr) = DIRECTIONS[d];
                let (end_col, end_row) = (col + 3 * dc, row + 3 * dr);
                if end_col < COLS as i32 && end_row >= 0 && end_row < ROWS as i32 {
                    let mut k = 0;
                    while k < 4 {
                        lines[n] |= 1 << ((col + k * dc) * ROWS as i32 + row + k * dr) as u32;
                        k += 1;
                    }
                    n += 1;
                }
                d += 1;
            }
            row += 1;
        }
        col += 1;
    }
    lines
}

const LINES: [u64; 69] = winning_lines();

pub fn cell_index(col: u8, row: u8) -> u8 {
    col * ROWS + row
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    pieces: [u64; 2],
    to_move: Player,
    last: Option<Disc>,
}

impl Default for Grid {
    fn default() -> Grid {
        Grid { pieces: [0; 2], to_move: Player::First, last: None }
    }
}

impl Grid {
    pub fn cell(&self, col: u8, row: u8) -> Option<Player> {
        let bit = 1 << cell_index(col, row);
        if self.pieces[0] & bit != 0 {
            Some(Player::First)
        } else if self.pieces[1] & bit != 0 {
            Some(Player::Second)
        } else {
            None
        }
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    fn occupied(&self) -> u64 {
        self.pieces[0] | self.pieces[1]
    }

    fn height(&self, col: u8) -> u8 {
        ((self.occupied() >> (col * ROWS)) & COLUMN).count_ones() as u8
    }

    fn play(&self, col: u8) -> Grid {
        let cell = cell_index(col, self.height(col));
        let mut pieces = self.pieces;
        pieces[self.to_move.index()] |= 1 << cell;
        Grid { pieces, to_move: self.to_move.opponent(), last: Some(Disc(cell)) }
    }

    fn just_won(&self) -> bool {
        let discs = self.pieces[self.to_move.opponent().index()];
        match self.last {
            Some(Disc(cell)) => {
                let bit = 1 << cell;
                LINES.iter().any(|&l| l & bit != 0 && discs & l == l)
            }
            None => LINES.iter().any(|&l| discs & l == l),
        }
    }

    /// The same grid with the colours swapped, including the side to move.
    pub fn mirrored(&self) -> Grid {
        Grid {
            pieces: [self.pieces[1], self.pieces[0]],
            to_move: self.to_move.opponent(),
            last: self.last,
        }
    }

    // First player's discs in each column topped by a marker bit, seven bits
    // per column. Together with the heights this fixes every cell.
    fn key(&self) -> u64 {
        let mut key = 0;
        for col in 0..COLS {
            let height = self.height(col);
            let first = (self.pieces[0] >> (col * ROWS)) & ((1 << height) - 1);
            key |= (first | 1 << height) << (col * (ROWS + 1));
        }
        key
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for row in (0..ROWS).rev() {
            for col in 0..COLS {
                let c = match self.cell(col, row) {
                    Some(Player::First) => 'W',
                    Some(Player::Second) => 'B',
                    None => '.',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The cell a disc lands on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Disc(pub u8);

impl Disc {
    pub fn col(&self) -> u8 {
        self.0 / ROWS
    }

    pub fn row(&self) -> u8 {
        self.0 % ROWS
    }
}

impl Display for Disc {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Disc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Disc> {
        match s.trim().parse::<u8>() {
            Ok(cell) if cell < CELLS => Ok(Disc(cell)),
            _ => Err(Error::MalformedMove(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct ConnectFour;

impl Rules for ConnectFour {
    type Position = Grid;
    type Move = Disc;
    type Line = ();

    const NAME: &'static str = "connectfour";
    const ROLES: [&'static str; 2] = ["W", "B"];

    fn initial(&self) -> Grid {
        Grid::default()
    }

    fn active_player(&self, g: &Grid) -> Player {
        g.to_move
    }

    fn last_move(&self, g: &Grid) -> Option<Disc> {
        g.last
    }

    fn move_id(&self, g: &Grid) -> u16 {
        g.last.map_or(0, |d| d.0 as u16)
    }

    fn state_hash(&self, g: &Grid) -> u64 {
        let turn = if g.to_move == Player::Second { TURN_BIT } else { 0 };
        g.key() | turn
    }

    fn expand(&self, g: &Grid) -> Vec<Grid> {
        (0..COLS).filter(|&col| g.height(col) < ROWS).map(|col| g.play(col)).collect()
    }

    fn evaluate_terminal(&self, g: &Grid, _: &()) -> Option<Evaluation> {
        let discs = g.occupied().count_ones();
        if g.just_won() {
            Some(loss_after(discs))
        } else if discs == CELLS as u32 {
            Some(0.0)
        } else {
            None
        }
    }

    // Lines still open to one side, weighted by how full they are, plus
    // discs in the centre column.
    fn heuristic(&self, g: &Grid) -> Evaluation {
        let mine = g.pieces[g.to_move.index()];
        let theirs = g.pieces[g.to_move.opponent().index()];
        let mut score = 0;
        for &line in LINES.iter() {
            let (m, t) = ((mine & line).count_ones(), (theirs & line).count_ones());
            score += match (m, t) {
                (3, 0) => 5,
                (2, 0) => 1,
                (0, 3) => -5,
                (0, 2) => -1,
                _ => 0,
            };
        }
        score += (mine & CENTRE).count_ones() as i32 - (theirs & CENTRE).count_ones() as i32;
        (0.01 * score as Evaluation - 0.001).clamp(-0.5, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(cols: &[u8]) -> Grid {
        cols.iter().fold(Grid::default(), |g, &col| g.play(col))
    }

    #[test]
    fn sixty_nine_distinct_lines() {
        let mut lines = LINES.to_vec();
        lines.sort();
        lines.dedup();
        assert_eq!(lines.len(), 69);
        assert!(LINES.iter().all(|l| l.count_ones() == 4 && l >> CELLS == 0));
    }

    #[test]
    fn discs_stack_up() {
        let g = play(&[3, 3, 3]);
        assert_eq!(g.cell(3, 0), Some(Player::First));
        assert_eq!(g.cell(3, 1), Some(Player::Second));
        assert_eq!(g.cell(3, 2), Some(Player::First));
        assert_eq!(g.cell(3, 3), None);
        assert_eq!(g.last, Some(Disc(cell_index(3, 2))));
        assert_eq!(g.to_move(), Player::Second);
    }

    #[test]
    fn full_column_is_skipped() {
        let rules = ConnectFour;
        let g = play(&[0, 0, 0, 0, 0, 0]);
        let cols: Vec<u8> =
            rules.expand(&g).iter().filter_map(|s| s.last).map(|d| d.col()).collect();
        assert_eq!(cols, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn four_in_a_row_ends_the_game() {
        let rules = ConnectFour;
        // Vertical.
        let g = play(&[0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(rules.evaluate_terminal(&g, &()), Some(loss_after(7)));
        // Rising diagonal for the first player.
        let g = play(&[0, 1, 1, 2, 2, 3, 2, 3, 3, 6, 3]);
        assert_eq!(rules.winner(&g, &()), Some(Winner::PlayerJustMoved));
        assert_eq!(rules.evaluate_terminal(&play(&[0, 1, 0, 1, 0, 1]), &()), None);
    }

    #[test]
    fn full_board_is_a_draw() {
        let rules = ConnectFour;
        // Columns filled in pairs in an order that never lines up four.
        let order = [0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 2, 3, 2, 3, 2, 3, 3, 2, 3, 2, 3, 2, 4, 5,
            4, 5, 4, 5, 5, 4, 5, 4, 5, 4, 6, 6, 6, 6, 6, 6];
        let mut g = Grid::default();
        for (i, &col) in order.iter().enumerate() {
            assert_eq!(rules.evaluate_terminal(&g, &()), None, "ended early at ply {}", i);
            g = g.play(col);
        }
        assert_eq!(rules.evaluate_terminal(&g, &()), Some(0.0));
    }

    #[test]
    fn hash_is_a_perfect_key() {
        let rules = ConnectFour;
        let a = play(&[3, 2, 4]);
        let b = play(&[4, 2, 3]);
        assert_eq!(rules.state_hash(&a), rules.state_hash(&b));
        // Same occupancy, colours differ.
        let c = play(&[2, 3, 4]);
        assert_ne!(rules.state_hash(&a), rules.state_hash(&c));
        assert_ne!(rules.state_hash(&a), rules.state_hash(&play(&[3, 2])));
        assert!(rules.state_hash(&a) < 1 << 50);
    }

    #[test]
    fn heuristic_tracks_threats() {
        let rules = ConnectFour;
        // First player to move with three open in the bottom row.
        let g = play(&[0, 6, 1, 6, 2, 5]);
        let h = rules.heuristic(&g);
        assert!(h > 0.0 && h <= 0.5);
        assert_eq!(h, rules.heuristic(&g.mirrored()));
        assert!(rules.heuristic(&Grid::default()) != 0.0);
    }

    #[test]
    fn disc_notation() {
        assert_eq!("18".parse::<Disc>(), Ok(Disc(18)));
        assert_eq!(Disc(18).col(), 3);
        assert_eq!(Disc(18).row(), 0);
        assert!("42".parse::<Disc>().is_err());
        assert!("-1".parse::<Disc>().is_err());
    }
}
