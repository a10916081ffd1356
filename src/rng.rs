//! Seedable random number generation for graph generation and layout.
//!
//! One PCG64 stream drives topology, weights, and layout, so a run is
//! reproducible from its master seed alone. Without an explicit seed the
//! master seed is drawn from OS entropy and logged.

use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Reproducible random number generator shared by the generation stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRng {
    /// Master seed for reproducibility.
    master_seed: u64,
    /// Internal PCG state.
    rng: Pcg64,
}

impl GraphRng {
    /// Create a new RNG with the given master seed.
    #[must_use]
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            rng: Pcg64::seed_from_u64(master_seed),
        }
    }

    /// Create an RNG seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Use `seed` when given, entropy otherwise.
    #[must_use]
    pub fn from_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::new)
    }

    /// Get the master seed.
    #[must_use]
    pub const fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Generate a random f64 in [0, 1).
    pub fn gen_f64(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Generate a random f64 in `[min, max)`.
    ///
    /// Callers validate the bounds; an inverted range collapses to `min`.
    pub fn gen_range_f64(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.gen_f64()
    }

    /// Shuffle a slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
