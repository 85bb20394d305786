//! Particle and swarm data model

use core::fmt;

use rayon::prelude::*;

use crate::fitness::Benchmark;
use crate::{Error, Result};

/// One candidate solution
///
/// Position, velocity and personal best share one owned buffer of `3 * dim`
/// values. `fitness` always belongs to the current position; `best_fitness`
/// belongs to the personal best and never increases.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    dim: usize,
    state: Box<[f64]>,
    fitness: f64,
    best_fitness: f64,
    global_best: usize,
}

impl Particle {
    /// Build a particle at `position` moving with `velocity`
    ///
    /// The personal best starts at `position` and both fitness values are
    /// evaluated with `benchmark`.
    pub fn new(benchmark: Benchmark, position: &[f64], velocity: &[f64]) -> Result<Self> {
        let dim = position.len();
        if velocity.len() != dim {
            return Err(Error::InvalidParameter(
                "position and velocity lengths differ",
            ));
        }
        benchmark.check_dimension(dim)?;
        let mut state = Self::reserve_state(dim)?;
        state.extend_from_slice(position);
        state.extend_from_slice(velocity);
        state.extend_from_slice(position);
        Ok(Self::from_state(benchmark, dim, state))
    }

    /// Fallibly reserve the backing buffer for a particle of `dim` values
    pub(crate) fn reserve_state(dim: usize) -> Result<Vec<f64>> {
        let overflow = Error::AllocationFailure { particles: 1, dim };
        let len = dim.checked_mul(3).ok_or_else(|| overflow.clone())?;
        let mut state = Vec::new();
        state.try_reserve_exact(len).map_err(|_| overflow)?;
        Ok(state)
    }

    /// Wrap a filled `position | velocity | personal best` buffer
    pub(crate) fn from_state(benchmark: Benchmark, dim: usize, state: Vec<f64>) -> Self {
        debug_assert_eq!(state.len(), 3 * dim);
        let fitness = benchmark.evaluate(&state[..dim]);
        Self {
            dim,
            state: state.into_boxed_slice(),
            fitness,
            best_fitness: fitness,
            global_best: 0,
        }
    }

    /// Number of coordinates
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Current position
    pub fn position(&self) -> &[f64] {
        &self.state[..self.dim]
    }

    /// Current velocity
    pub fn velocity(&self) -> &[f64] {
        &self.state[self.dim..2 * self.dim]
    }

    /// Best position this particle has visited
    pub fn personal_best(&self) -> &[f64] {
        &self.state[2 * self.dim..]
    }

    /// Fitness of the current position
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Fitness of the personal best
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Index of the swarm's global best as of the last reduction
    pub fn global_best(&self) -> usize {
        self.global_best
    }

    /// Mutable `(position, velocity, personal best)` views
    pub(crate) fn parts_mut(&mut self) -> (&mut [f64], &mut [f64], &mut [f64]) {
        let (position, rest) = self.state.split_at_mut(self.dim);
        let (velocity, personal_best) = rest.split_at_mut(self.dim);
        (position, velocity, personal_best)
    }

    /// Store the fitness of the new position
    ///
    /// Returns `true` when it beats the personal best, which then moves to the
    /// current position.
    pub(crate) fn record_fitness(&mut self, fitness: f64) -> bool {
        self.fitness = fitness;
        if fitness < self.best_fitness {
            self.best_fitness = fitness;
            let (position, _, personal_best) = self.parts_mut();
            personal_best.copy_from_slice(position);
            true
        } else {
            false
        }
    }

    pub(crate) fn set_global_best(&mut self, index: usize) {
        self.global_best = index;
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn row(f: &mut fmt::Formatter<'_>, label: &str, values: &[f64]) -> fmt::Result {
            write!(f, "{label}:")?;
            for v in values {
                write!(f, " {v:.2}")?;
            }
            writeln!(f)
        }
        row(f, "position", self.position())?;
        row(f, "velocity", self.velocity())?;
        row(f, "pbest", self.personal_best())?;
        writeln!(f, "fitness: {:.4}", self.fitness)?;
        write!(f, "g: {}", self.global_best)
    }
}

/// Fixed-size population of particles sharing one dimension
#[derive(Debug, Clone, PartialEq)]
pub struct Swarm {
    dim: usize,
    particles: Vec<Particle>,
}

impl Swarm {
    /// Reserve room for `num_particles` particles of dimension `dim`
    pub(crate) fn with_capacity(num_particles: usize, dim: usize) -> Result<Self> {
        let mut particles = Vec::new();
        particles
            .try_reserve_exact(num_particles)
            .map_err(|_| Error::AllocationFailure {
                particles: num_particles,
                dim,
            })?;
        Ok(Self { dim, particles })
    }

    /// Assemble a swarm from existing particles
    ///
    /// The global best is left unset; call [`Swarm::broadcast_global_best`]
    /// with the reducer's answer before handing the swarm to the update step.
    pub fn from_particles(particles: Vec<Particle>) -> Result<Self> {
        let dim = particles
            .first()
            .map(Particle::dim)
            .ok_or(Error::InvalidParameter("swarm must not be empty"))?;
        if particles.iter().any(|p| p.dim() != dim) {
            return Err(Error::InvalidParameter("particles differ in dimension"));
        }
        Ok(Self { dim, particles })
    }

    pub(crate) fn push(&mut self, particle: Particle) {
        debug_assert_eq!(particle.dim(), self.dim);
        self.particles.push(particle);
    }

    /// Dimension shared by every particle
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the swarm has no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// All particles in index order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Particle at `index`
    pub fn particle(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Index every particle currently agrees on as the global best
    pub fn global_best_index(&self) -> usize {
        self.particles.first().map_or(0, Particle::global_best)
    }

    /// The global-best particle
    pub fn global_best(&self) -> &Particle {
        &self.particles[self.global_best_index()]
    }

    /// Write `index` into every particle, in parallel
    ///
    /// Each particle's field is written only by the worker owning it.
    pub fn broadcast_global_best(&mut self, index: usize) {
        debug_assert!(index < self.particles.len());
        self.particles
            .par_iter_mut()
            .for_each(|p| p.set_global_best(index));
    }
}
