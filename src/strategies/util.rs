use crate::error::{Error, Result};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{Duration, Instant};

// A reproducible generator when seeded, otherwise seeded from the thread rng.
pub(super) fn seeded_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed.unwrap_or_else(rand::random::<u64>))
}

// Iterative deepening needs something to stop it.
pub(super) fn validate_bounds(timeout: Option<Duration>, max_depth: Option<u32>) -> Result<()> {
    match (timeout, max_depth) {
        (None, None) => Err(Error::Unbounded),
        (Some(Duration::ZERO), _) => Err(Error::ZeroTimeout),
        (_, Some(depth)) if depth < 2 => Err(Error::DepthTooShallow(depth)),
        _ => Ok(()),
    }
}

// Soft time budget, checked only between root moves and between depths.
#[derive(Copy, Clone, Debug)]
pub(super) struct Budget {
    start: Instant,
    limit: Option<Duration>,
}

impl Budget {
    pub(super) fn start(limit: Option<Duration>) -> Self {
        Budget { start: Instant::now(), limit }
    }

    pub(super) fn exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.start.elapsed() > limit)
    }

    pub(super) fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
