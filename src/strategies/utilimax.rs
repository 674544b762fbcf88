//! Iterative deepening over per-role utilities, without pruning.
//!
//! Every node keeps the child utility that is best for its own mover: the
//! highest own score, then the lowest opponent score. This is max-n search,
//! so it still works for utilities that are not zero-sum, at the cost of
//! visiting the whole tree to each depth.

use super::util::*;
use crate::error::Result;
use crate::interface::*;

use std::time::Duration;

pub struct Utilimax<R: Rules> {
    rules: R,
    timeout: Option<Duration>,
    max_depth: u32,
    evals: u64,
    best: Option<Utility>,
}

impl<R: Rules> Utilimax<R> {
    pub fn new(rules: R, timeout: Option<Duration>, max_depth: Option<u32>) -> Result<Utilimax<R>> {
        validate_bounds(timeout, max_depth)?;
        Ok(Utilimax {
            rules,
            timeout,
            max_depth: max_depth.unwrap_or(u32::MAX),
            evals: 0,
            best: None,
        })
    }

    /// Utility of the last chosen move.
    pub fn root_utility(&self) -> Option<Utility> {
        self.best
    }

    /// Nodes evaluated by the last move computation.
    pub fn evals(&self) -> u64 {
        self.evals
    }

    fn utilimax(&mut self, position: &R::Position, line: &mut R::Line, depth: u32) -> Utility {
        self.evals += 1;
        let utility = self.rules.utility(position, line);
        if depth == 0 || utility.terminal {
            return utility;
        }
        let mover = self.rules.active_player(position);
        let mut best = Utility::worst_for(mover);
        for successor in self.rules.expand(position) {
            self.rules.enter(&successor, line);
            let value = self.utilimax(&successor, line, depth - 1);
            self.rules.exit(&successor, line);
            if value.better_than(&best, mover) {
                best = value;
            }
        }
        best
    }
}

impl<R: Rules> Strategy<R> for Utilimax<R> {
    fn choose_move(&mut self, position: &R::Position, line: &mut R::Line) -> Option<R::Position> {
        let budget = Budget::start(self.timeout);
        self.evals = 0;
        self.best = None;
        if self.rules.evaluate_terminal(position, line).is_some() {
            return None;
        }
        let mover = self.rules.active_player(position);
        let mut root = self.rules.expand(position);

        let mut chosen = None;
        let mut depth = 2;
        loop {
            log::debug!("search depth: {}", depth);
            let mut best = Utility::worst_for(mover);
            let mut best_move = None;
            let mut complete = true;
            for (i, successor) in root.iter().enumerate() {
                if (chosen.is_some() || best_move.is_some()) && budget.exhausted() {
                    complete = false;
                    break;
                }
                let evals = self.evals;
                self.rules.enter(successor, line);
                let value = self.utilimax(successor, line, depth - 1);
                self.rules.exit(successor, line);
                log::trace!(
                    "{}: {} ({} evals)",
                    self.rules.describe(successor),
                    value.announce(R::ROLES),
                    self.evals - evals
                );
                if value.better_than(&best, mover) {
                    best = value;
                    best_move = Some(i);
                }
            }
            if !complete && chosen.is_some() {
                break;
            }
            chosen = best_move;
            self.best = Some(best);
            if best.terminal {
                log::info!("Terminal utility found: {}", best.announce(R::ROLES));
                break;
            }
            if !complete || budget.exhausted() {
                break;
            }
            match depth.checked_add(2) {
                Some(next) if next <= self.max_depth => depth = next,
                _ => break,
            }
        }
        log::debug!("total utilimax calls: {}", self.evals);
        chosen.map(|i| root.swap_remove(i))
    }
}
