//! Seeded random helpers
//!
//! Thin wrapper over PCG so every random draw in a run comes from one seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic random source
#[derive(Debug, Clone)]
pub struct GameRng {
    seed: u64,
    inner: Pcg32,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed this generator was created from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `[min, max]` (both inclusive)
    pub fn random_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..=max)
    }

    /// Uniform float in `[min, max)`
    pub fn random_float(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..max)
    }

    /// Uniformly pick one element
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.random_int(0, items.len() as i32 - 1);
        items.get(index as usize)
    }
}
