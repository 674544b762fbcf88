//! A strategy that randomly chooses a move, for use in tests.

use super::util::seeded_rng;
use crate::interface::*;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct Random<R: Rules> {
    rules: R,
    rng: Xoshiro256PlusPlus,
}

impl<R: Rules> Random<R> {
    pub fn new(rules: R) -> Random<R> {
        Random { rules, rng: seeded_rng(None) }
    }

    /// Same choices for the same seed and positions.
    pub fn seeded(rules: R, seed: u64) -> Random<R> {
        Random { rules, rng: seeded_rng(Some(seed)) }
    }
}

impl<R: Rules> Strategy<R> for Random<R> {
    fn choose_move(&mut self, position: &R::Position, line: &mut R::Line) -> Option<R::Position> {
        if self.rules.evaluate_terminal(position, line).is_some() {
            return None;
        }
        let mut successors = self.rules.expand(position);
        match successors.len() {
            0 => None,
            n => Some(successors.swap_remove(self.rng.random_range(0..n))),
        }
    }
}
