//! An implementation of iterative deepening Negamax.
//!
//! Search all root moves at depth 2, then start over at depth 4, 6, etc.
//! Keeps going until a proven result, the maximum depth or the time budget.
//! Within one move computation a transposition table caches node results
//! and a history table orders moves by how often they were best before.
//!
//! Root moves are shuffled once per move computation and the first strictly
//! best one is chosen, so equal moves are picked at random across games but
//! reproducibly for a fixed seed.

use super::history::HistoryTable;
use super::table::TranspositionTable;
use super::util::*;
use crate::error::{Error, Result};
use crate::interface::*;

use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Options to use for the negamax search engine.
#[derive(Clone, Copy, Debug)]
pub struct NegamaxOptions {
    timeout: Option<Duration>,
    max_depth: Option<u32>,
    history_base: f32,
    seed: Option<u64>,
    transposition_table: bool,
    history_ordering: bool,
}

impl NegamaxOptions {
    pub fn new() -> Self {
        NegamaxOptions {
            timeout: Some(Duration::from_secs(5)),
            max_depth: None,
            history_base: 2.0,
            seed: None,
            transposition_table: true,
            history_ordering: true,
        }
    }
}

impl Default for NegamaxOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl NegamaxOptions {
    /// Time budget per move. It is checked between root moves and between
    /// depths, so the search can overrun it by one root subtree.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ignore the clock and search until the maximum depth or a proven result.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Deepest iteration to run, in plies. Depths advance by two from 2.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Base of the `ceil(base ^ depth)` history bonus.
    pub fn with_history_base(mut self, base: f32) -> Self {
        self.history_base = base;
        self
    }

    /// Seed for shuffling root moves.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_transposition_table(mut self, enabled: bool) -> Self {
        self.transposition_table = enabled;
        self
    }

    pub fn with_history_ordering(mut self, enabled: bool) -> Self {
        self.history_ordering = enabled;
        self
    }

    fn validate(&self) -> Result<()> {
        validate_bounds(self.timeout, self.max_depth)?;
        if !self.history_base.is_finite() || self.history_base < 1.0 {
            return Err(Error::InvalidHistoryBase(self.history_base));
        }
        Ok(())
    }
}

/// Runtime stats for the last move computation.
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    /// Depth of the iteration that produced the move.
    pub depth: u32,
    /// Whether that iteration evaluated every root move.
    pub complete: bool,
    /// Value of the chosen move for the player who makes it.
    pub value: Evaluation,
    pub nodes: u64,
    pub table_hits: u64,
    pub cutoffs: u64,
    pub elapsed: Duration,
}

impl Display for SearchStats {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let throughput = self.nodes as f64 / self.elapsed.as_secs_f64().max(1e-9);
        write!(
            f,
            "depth {}{}, value {}, {} nodes, {} table hits, {} cutoffs, {} nodes/sec",
            self.depth,
            if self.complete { "" } else { " (partial)" },
            self.value,
            self.nodes,
            self.table_hits,
            self.cutoffs,
            throughput as u64
        )
    }
}

// Outcome of searching every root move to one depth.
struct Iteration {
    best: Option<usize>,
    value: Evaluation,
    complete: bool,
}

pub struct Negamax<R: Rules> {
    rules: R,
    opts: NegamaxOptions,
    table: TranspositionTable,
    history: HistoryTable,
    rng: Xoshiro256PlusPlus,
    stats: SearchStats,
}

impl<R: Rules> Negamax<R> {
    pub fn new(rules: R, opts: NegamaxOptions) -> Result<Negamax<R>> {
        opts.validate()?;
        Ok(Negamax {
            rules,
            table: TranspositionTable::new(),
            history: HistoryTable::new(opts.history_base),
            rng: seeded_rng(opts.seed),
            opts,
            stats: SearchStats::default(),
        })
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Value of the last chosen move for the player who made it.
    pub fn root_value(&self) -> Evaluation {
        self.stats.value
    }

    /// Search every root move to exactly `depth` plies, ignoring the clock.
    pub fn search_depth(
        &mut self, position: &R::Position, line: &mut R::Line, depth: u32,
    ) -> Option<R::Position> {
        let budget = Budget::start(None);
        let mut root = self.prepare(position, line)?;
        let depth = depth.max(1);
        let iteration = self.search_root(&root, line, depth, &budget, false);
        self.record(depth, &iteration, &budget);
        iteration.best.map(|i| root.swap_remove(i))
    }

    // Reset per-move state and generate the shuffled root moves.
    fn prepare(&mut self, position: &R::Position, line: &R::Line) -> Option<Vec<R::Position>> {
        self.table.clear();
        self.history.clear();
        self.stats = SearchStats::default();
        if self.rules.evaluate_terminal(position, line).is_some() {
            return None;
        }
        let mut root = self.rules.expand(position);
        if root.is_empty() {
            return None;
        }
        root.shuffle(&mut self.rng);
        Some(root)
    }

    fn record(&mut self, depth: u32, iteration: &Iteration, budget: &Budget) {
        self.stats.depth = depth;
        self.stats.complete = iteration.complete;
        self.stats.value = iteration.value;
        self.stats.elapsed = budget.elapsed();
    }

    // The root is a max node whose alpha rises across siblings. Once a result
    // exists the budget is checked before each move.
    fn search_root(
        &mut self, root: &[R::Position], line: &mut R::Line, depth: u32, budget: &Budget,
        have_result: bool,
    ) -> Iteration {
        let mut alpha = WORST_EVAL;
        let mut best = None;
        let mut best_value = WORST_EVAL;
        for (i, successor) in root.iter().enumerate() {
            if (have_result || best.is_some()) && budget.exhausted() {
                return Iteration { best, value: best_value, complete: false };
            }
            let nodes = self.stats.nodes;
            self.rules.enter(successor, line);
            let value = -self.negamax(successor, line, depth - 1, -BEST_EVAL, -alpha);
            self.rules.exit(successor, line);
            log::trace!(
                "{}: {} ({} nodes)",
                self.rules.describe(successor),
                value,
                self.stats.nodes - nodes
            );
            // Strictly better than any move found so far.
            if value > best_value {
                best_value = value;
                best = Some(i);
            }
            alpha = alpha.max(value);
        }
        Iteration { best, value: best_value, complete: true }
    }

    // Value of `position` for its player to move, searched `depth` more plies.
    fn negamax(
        &mut self, position: &R::Position, line: &mut R::Line, depth: u32, mut alpha: Evaluation,
        mut beta: Evaluation,
    ) -> Evaluation {
        self.stats.nodes += 1;

        // Terminal values depend on the line, so they are never cached.
        if let Some(value) = self.rules.evaluate_terminal(position, line) {
            return value;
        }

        let alpha_orig = alpha;
        let hash = self.rules.state_hash(position);
        if self.opts.transposition_table {
            if let Some(value) = self.table.check(hash, depth, &mut alpha, &mut beta) {
                self.stats.table_hits += 1;
                return value;
            }
        }

        if depth == 0 {
            return self.rules.heuristic(position);
        }

        let mover = self.rules.active_player(position);
        let mut successors = self.rules.expand(position);
        debug_assert!(!successors.is_empty(), "non-terminal position without successors");
        if successors.is_empty() {
            return self.rules.heuristic(position);
        }
        if self.opts.history_ordering {
            let rules = &self.rules;
            self.history.order(mover, &mut successors, |s| rules.move_id(s));
        }

        let mut best = WORST_EVAL;
        let mut best_move = None;
        for successor in successors.iter() {
            self.rules.enter(successor, line);
            let value = -self.negamax(successor, line, depth - 1, -beta, -alpha);
            self.rules.exit(successor, line);
            if value > best {
                best = value;
                best_move = Some(self.rules.move_id(successor));
            }
            alpha = alpha.max(value);
            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }

        if self.opts.transposition_table {
            self.table.update(hash, alpha_orig, beta, depth, best);
        }
        // Credited whether or not the move caused a cutoff.
        if let (true, Some(id)) = (self.opts.history_ordering, best_move) {
            self.history.credit(mover, id, depth);
        }
        best
    }
}

impl<R: Rules> Strategy<R> for Negamax<R> {
    fn choose_move(&mut self, position: &R::Position, line: &mut R::Line) -> Option<R::Position> {
        let budget = Budget::start(self.opts.timeout);
        let mut root = self.prepare(position, line)?;
        let role = R::ROLES[self.rules.active_player(position).index()];
        let max_depth = self.opts.max_depth.unwrap_or(u32::MAX);

        let mut chosen = None;
        let mut depth = 2;
        loop {
            log::debug!("search depth: {}", depth);
            let iteration = self.search_root(&root, line, depth, &budget, chosen.is_some());
            if !iteration.complete && chosen.is_some() {
                // Timeout. Keep the move from the previous full iteration.
                break;
            }
            chosen = iteration.best;
            self.record(depth, &iteration, &budget);
            if !iteration.complete {
                break;
            }
            if iteration.value > DECISIVE {
                log::info!("Win found for {}.", role);
                break;
            }
            if iteration.value < -DECISIVE {
                log::info!("Loss found for {}.", role);
                break;
            }
            if iteration.value == 0.0 {
                log::info!("Draw found for {}.", role);
                break;
            }
            if budget.exhausted() {
                break;
            }
            match depth.checked_add(2) {
                Some(next) if next <= max_depth => depth = next,
                _ => break,
            }
        }
        self.stats.elapsed = budget.elapsed();
        log::debug!("{}", self.stats);
        chosen.map(|i| root.swap_remove(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::str::FromStr;
    use std::thread::sleep;

    // Take one or two counters; whoever takes the last one wins.
    #[derive(Clone, Copy, Default)]
    struct Countdown {
        start: u8,
        slow: bool,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Pile {
        left: u8,
        to_move: Player,
        last: Option<Take>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Take(u8);

    impl fmt::Display for Take {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl FromStr for Take {
        type Err = Error;
        fn from_str(s: &str) -> Result<Take> {
            s.parse().map(Take).map_err(|_| Error::MalformedMove(s.to_string()))
        }
    }

    impl Rules for Countdown {
        type Position = Pile;
        type Move = Take;
        // Path of pile sizes from the root, to check enter/exit pairing.
        type Line = Vec<u8>;

        const NAME: &'static str = "countdown";
        const ROLES: [&'static str; 2] = ["A", "B"];

        fn initial(&self) -> Pile {
            Pile { left: self.start, to_move: Player::First, last: None }
        }

        fn active_player(&self, p: &Pile) -> Player {
            p.to_move
        }

        fn last_move(&self, p: &Pile) -> Option<Take> {
            p.last
        }

        fn move_id(&self, p: &Pile) -> u16 {
            p.last.map_or(0, |t| t.0 as u16)
        }

        fn state_hash(&self, p: &Pile) -> u64 {
            p.left as u64 | (p.to_move.index() as u64) << 8
        }

        fn expand(&self, p: &Pile) -> Vec<Pile> {
            (1..=2.min(p.left))
                .map(|n| Pile {
                    left: p.left - n,
                    to_move: p.to_move.opponent(),
                    last: Some(Take(n)),
                })
                .collect()
        }

        fn evaluate_terminal(&self, p: &Pile, _: &Vec<u8>) -> Option<Evaluation> {
            if p.left == 0 {
                Some(loss_after((self.start - p.left) as u32))
            } else {
                None
            }
        }

        fn heuristic(&self, _: &Pile) -> Evaluation {
            if self.slow {
                sleep(Duration::from_millis(20));
            }
            0.01
        }

        fn enter(&self, p: &Pile, line: &mut Vec<u8>) {
            line.push(p.left);
        }

        fn exit(&self, p: &Pile, line: &mut Vec<u8>) {
            assert_eq!(line.pop(), Some(p.left));
        }
    }

    #[test]
    fn rejects_bad_options() {
        let rules = Countdown::default();
        let unbounded = NegamaxOptions::new().without_timeout();
        assert_eq!(Negamax::new(rules, unbounded).err(), Some(Error::Unbounded));
        let zero = NegamaxOptions::new().with_timeout(Duration::ZERO);
        assert_eq!(Negamax::new(rules, zero).err(), Some(Error::ZeroTimeout));
        let shallow = NegamaxOptions::new().with_max_depth(1);
        assert_eq!(Negamax::new(rules, shallow).err(), Some(Error::DepthTooShallow(1)));
        let base = NegamaxOptions::new().with_history_base(0.5);
        assert_eq!(Negamax::new(rules, base).err(), Some(Error::InvalidHistoryBase(0.5)));
        let nan = NegamaxOptions::new().with_history_base(f32::NAN);
        assert!(matches!(Negamax::new(rules, nan), Err(Error::InvalidHistoryBase(_))));
    }

    #[test]
    fn finds_the_winning_take() {
        let rules = Countdown { start: 10, slow: false };
        let opts = NegamaxOptions::new().without_timeout().with_max_depth(12).with_seed(3);
        let mut negamax = Negamax::new(rules, opts).unwrap();
        let mut line = Vec::new();
        let chosen = negamax.choose_move(&rules.initial(), &mut line).unwrap();
        // Leave a multiple of three.
        assert_eq!(chosen.left, 9);
        assert!(negamax.root_value() > DECISIVE);
        assert!(negamax.stats().complete);
        assert!(negamax.stats().table_hits > 0);
        assert!(line.is_empty());
    }

    #[test]
    fn prefers_the_faster_win() {
        let rules = Countdown { start: 2, slow: false };
        let opts = NegamaxOptions::new().without_timeout().with_max_depth(4).with_seed(0);
        let mut negamax = Negamax::new(rules, opts).unwrap();
        let chosen = negamax.choose_move(&rules.initial(), &mut Vec::new()).unwrap();
        assert_eq!(chosen.left, 0);
        assert_eq!(negamax.root_value(), -loss_after(2));
    }

    #[test]
    fn terminal_root_has_no_move() {
        let rules = Countdown { start: 0, slow: false };
        let mut negamax = Negamax::new(rules, NegamaxOptions::new()).unwrap();
        assert_eq!(negamax.choose_move(&rules.initial(), &mut Vec::new()), None);
    }

    #[test]
    fn timeout_in_first_depth_still_returns_a_move() {
        let rules = Countdown { start: 20, slow: true };
        let opts = NegamaxOptions::new().with_timeout(Duration::from_millis(1)).with_seed(1);
        let mut negamax = Negamax::new(rules, opts).unwrap();
        let mut line = vec![20];
        let chosen = negamax.choose_move(&rules.initial(), &mut line);
        assert!(chosen.is_some());
        assert_eq!(negamax.stats().depth, 2);
        assert!(!negamax.stats().complete);
        assert_eq!(line, vec![20]);
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        // From 9 every move loses, so the pick comes down to the shuffle.
        let rules = Countdown { start: 9, slow: false };
        let opts = NegamaxOptions::new().without_timeout().with_max_depth(4).with_seed(77);
        let picks = (0..2)
            .map(|_| {
                let mut negamax = Negamax::new(rules, opts).unwrap();
                negamax.choose_move(&rules.initial(), &mut Vec::new()).unwrap().left
            })
            .collect::<Vec<_>>();
        assert_eq!(picks[0], picks[1]);
    }

    #[test]
    fn equal_root_moves_go_to_the_first_in_shuffled_order() {
        // Depth 2 from 20 only reaches the constant heuristic, so both takes tie.
        let rules = Countdown { start: 20, slow: false };
        let root = rules.initial();
        let mut picks = Vec::new();
        for seed in 0..32 {
            let opts = NegamaxOptions::new().without_timeout().with_max_depth(2).with_seed(seed);
            let mut negamax = Negamax::new(rules, opts).unwrap();
            let chosen = negamax.choose_move(&root, &mut Vec::new()).unwrap();

            let mut order = rules.expand(&root);
            order.shuffle(&mut seeded_rng(Some(seed)));
            assert_eq!(chosen, order[0], "seed {}", seed);
            assert_eq!(negamax.root_value(), 0.01);
            picks.push(chosen.left);
        }
        assert!(picks.contains(&18) && picks.contains(&19));
    }
}
