//! History heuristic for move ordering.
//!
//! Every searched node credits the move that scored best there, whether or
//! not it caused a cutoff, with `ceil(base ^ depth)`. Deeper nodes earn larger
//! bonuses since their verdict covers more of the tree. Successors are then
//! tried in descending order of their move's accumulated score.

use crate::interface::Player;
use std::cmp::Reverse;

const TABLE_SIZE: usize = 1 << 16;

pub struct HistoryTable {
    // Indexed by [player][move id].
    scores: [Vec<u64>; 2],
    base: f64,
}

impl HistoryTable {
    pub fn new(base: f32) -> Self {
        HistoryTable { scores: [vec![0; TABLE_SIZE], vec![0; TABLE_SIZE]], base: base as f64 }
    }

    pub fn clear(&mut self) {
        for table in self.scores.iter_mut() {
            table.fill(0);
        }
    }

    pub fn score(&self, player: Player, move_id: u16) -> u64 {
        self.scores[player.index()][move_id as usize]
    }

    pub fn bonus(&self, depth: u32) -> u64 {
        // Float to int casts saturate.
        self.base.powi(depth.min(i32::MAX as u32) as i32).ceil() as u64
    }

    /// Reward `player`'s move `move_id` for being best at a node searched to `depth`.
    pub fn credit(&mut self, player: Player, move_id: u16, depth: u32) {
        let bonus = self.bonus(depth);
        let slot = &mut self.scores[player.index()][move_id as usize];
        *slot = slot.saturating_add(bonus);
    }

    /// Stable sort of `items` by descending score of `player`'s move; equal
    /// scores keep their generation order.
    pub fn order<T, F: Fn(&T) -> u16>(&self, player: Player, items: &mut [T], move_id: F) {
        items.sort_by_key(|item| Reverse(self.score(player, move_id(item))));
    }
}
