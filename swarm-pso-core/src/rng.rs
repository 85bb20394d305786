//! Random sources
//!
//! Generators are plain values threaded through every call. A sequential run
//! draws from one [`SharedRng`]; a parallel phase hands each worker its own
//! [`WorkerRng`], seeded from the run's base seed perturbed by the worker id.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_core::RngCore;

/// Source of uniformly distributed samples
pub trait RandomSource {
    /// Uniform sample in the closed interval `[min, max]`
    ///
    /// Reversed bounds are swapped; a degenerate interval returns its endpoint.
    fn sample(&mut self, min: f64, max: f64) -> f64;

    /// Uniform sample in `[0, 1]`
    fn unit(&mut self) -> f64 {
        self.sample(0.0, 1.0)
    }
}

fn sample_closed<R: RngCore + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if lo >= hi || !(hi - lo).is_finite() {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

/// Single stream for single-threaded use
#[derive(Debug, Clone)]
pub struct SharedRng {
    rng: StdRng,
}

impl SharedRng {
    /// Create a stream from a seed
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SharedRng {
    fn sample(&mut self, min: f64, max: f64) -> f64 {
        sample_closed(&mut self.rng, min, max)
    }
}

/// Generator owned by one worker of a parallel phase
#[derive(Debug, Clone)]
pub struct WorkerRng {
    worker: usize,
    rng: StdRng,
}

impl WorkerRng {
    /// Generator for `worker`, seeded from `base_seed + worker`
    pub fn new(base_seed: u64, worker: usize) -> Self {
        Self {
            worker,
            rng: StdRng::seed_from_u64(base_seed.wrapping_add(worker as u64)),
        }
    }

    /// One generator per worker, indexed by worker id
    pub fn per_worker(base_seed: u64, workers: usize) -> Vec<Self> {
        (0..workers.max(1))
            .map(|worker| Self::new(base_seed, worker))
            .collect()
    }

    /// Worker id this generator belongs to
    pub fn worker(&self) -> usize {
        self.worker
    }
}

impl RandomSource for WorkerRng {
    fn sample(&mut self, min: f64, max: f64) -> f64 {
        sample_closed(&mut self.rng, min, max)
    }
}
