//! Seeded randomness for the sandbox world.
//!
//! Two things in a run are random: which blueprint a wildcard model filter
//! resolves to, and the order spawn points are handed out for batches that
//! ask for random placement.  Both draw from one `SimRng` seeded from the
//! world builder, so a seed reproduces the same town.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub struct SimRng {
    inner: SmallRng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: SmallRng::seed_from_u64(seed) }
    }

    /// Pick one candidate (a blueprint, a spawn point).  `None` when there
    /// are no candidates.
    pub fn pick<'a, T>(&mut self, candidates: &'a [T]) -> Option<&'a T> {
        candidates.choose(&mut self.inner)
    }

    /// Put `items` in a random order.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}
