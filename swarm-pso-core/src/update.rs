//! Particle update rule
//!
//! One step moves a single particle: new velocity from inertia, cognitive and
//! social pulls, velocity resampled when it leaves its range, position
//! saturated at the domain bounds, then fitness re-evaluated. A step touches
//! only the particle it is given and reads the global best from a snapshot,
//! so distinct particles can be stepped concurrently.

use serde::{Deserialize, Serialize};

use crate::fitness::Benchmark;
use crate::particle::Particle;
use crate::rng::RandomSource;
use crate::{Error, Result};

/// PSO coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Inertia weight (momentum)
    pub inertia: f64,
    /// Cognitive coefficient (attraction to personal best)
    pub cognitive: f64,
    /// Social coefficient (attraction to global best)
    pub social: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            inertia: 0.79,
            cognitive: 1.49,
            social: 1.49,
        }
    }
}

/// Search domain applied to every coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    /// Domain `[min, max]`; both finite, `min < max`, and a finite width
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidParameter("bounds must be finite"));
        }
        if min >= max {
            return Err(Error::InvalidParameter("xmin must be below xmax"));
        }
        // Samples are drawn from [min, max] and [-width, width].
        if !(max - min).is_finite() {
            return Err(Error::InvalidParameter("domain width must be finite"));
        }
        Ok(Self { min, max })
    }

    /// Lower bound
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Largest velocity magnitude, `|max - min|`
    pub fn velocity_limit(&self) -> f64 {
        (self.max - self.min).abs()
    }

    /// Saturate `x` at the bounds
    #[inline]
    pub fn clamp(&self, x: f64) -> f64 {
        if x > self.max {
            self.max
        } else if x < self.min {
            self.min
        } else {
            x
        }
    }
}

/// Everything a step needs besides the particle, the target and a generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateRule {
    benchmark: Benchmark,
    coefficients: Coefficients,
    bounds: Bounds,
}

impl UpdateRule {
    /// Create an update rule
    pub fn new(benchmark: Benchmark, coefficients: Coefficients, bounds: Bounds) -> Self {
        Self {
            benchmark,
            coefficients,
            bounds,
        }
    }

    /// Function the particle is scored with
    pub fn benchmark(&self) -> Benchmark {
        self.benchmark
    }

    /// Search domain
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Move `particle` one step toward its personal best and `global_best`
    ///
    /// Returns `true` if the personal best improved.
    pub fn apply<R: RandomSource + ?Sized>(
        &self,
        particle: &mut Particle,
        global_best: &[f64],
        rng: &mut R,
    ) -> bool {
        debug_assert_eq!(global_best.len(), particle.dim());
        let Coefficients {
            inertia,
            cognitive,
            social,
        } = self.coefficients;
        let limit = self.bounds.velocity_limit();

        let (position, velocity, personal_best) = particle.parts_mut();
        for j in 0..position.len() {
            let r1 = rng.unit();
            let r2 = rng.unit();
            let mut v = inertia * velocity[j]
                + cognitive * r1 * (personal_best[j] - position[j])
                + social * r2 * (global_best[j] - position[j]);
            // Resample rather than saturate; NaN is resampled too.
            if !(-limit..=limit).contains(&v) {
                v = rng.sample(-limit, limit);
            }
            velocity[j] = v;
            position[j] = self.bounds.clamp(position[j] + v);
        }

        let fitness = self.benchmark.evaluate(particle.position());
        particle.record_fitness(fitness)
    }
}
