//! Optimization loop
//!
//! Each iteration runs three fork-join phases on the runtime's pool:
//! 1. every particle steps toward a snapshot of last iteration's global best,
//!    one contiguous chunk and one generator per worker;
//! 2. per-partition minima are merged into the new global-best index;
//! 3. the index is broadcast into every particle.
//!
//! The end of each parallel iterator is the barrier before the next phase.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use swarm_pso_runtime::SwarmRuntime;

use crate::fitness::Benchmark;
use crate::init;
use crate::particle::Swarm;
use crate::reduce::{partition_len, FitnessReducer, ParallelReducer};
use crate::rng::WorkerRng;
use crate::update::{Bounds, Coefficients, UpdateRule};
use crate::{Error, Result};

/// Configuration for an optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Function to minimize
    pub function: Benchmark,
    /// Number of coordinates
    pub dim: usize,
    /// Number of particles in the swarm
    pub swarm_size: usize,
    /// Lower bound of every coordinate
    pub xmin: f64,
    /// Upper bound of every coordinate
    pub xmax: f64,
    /// Iteration budget
    pub max_iterations: usize,
    /// Inertia, cognitive and social weights
    #[serde(default)]
    pub coefficients: Coefficients,
    /// Base seed for the worker generators; the runtime clock when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        let function = Benchmark::Rastrigin;
        let (xmin, xmax) = function.domain();
        Self {
            function,
            dim: 2,
            swarm_size: 200,
            xmin,
            xmax,
            max_iterations: 500,
            coefficients: Coefficients::default(),
            seed: None,
        }
    }
}

impl OptimizerConfig {
    /// Create a new builder
    pub fn builder() -> OptimizerConfigBuilder {
        OptimizerConfigBuilder::new()
    }

    /// Search domain
    pub fn bounds(&self) -> Result<Bounds> {
        Bounds::new(self.xmin, self.xmax)
    }

    /// Check every parameter before anything is allocated
    pub fn validate(&self) -> Result<()> {
        self.function.check_dimension(self.dim)?;
        if self.swarm_size == 0 {
            return Err(Error::InvalidParameter("swarm size must be positive"));
        }
        self.bounds()?;
        let Coefficients {
            inertia,
            cognitive,
            social,
        } = self.coefficients;
        if ![inertia, cognitive, social].iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidParameter("coefficients must be finite"));
        }
        Ok(())
    }
}

/// Builder for OptimizerConfig
#[derive(Debug, Default)]
pub struct OptimizerConfigBuilder {
    config: OptimizerConfig,
}

impl OptimizerConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the function to minimize
    ///
    /// Also resets the bounds to the function's usual domain; call
    /// [`bounds`](Self::bounds) afterwards to override them.
    pub fn function(mut self, function: Benchmark) -> Self {
        (self.config.xmin, self.config.xmax) = function.domain();
        self.config.function = function;
        self
    }

    /// Set the number of coordinates
    pub fn dim(mut self, dim: usize) -> Self {
        self.config.dim = dim;
        self
    }

    /// Set the number of particles
    pub fn swarm_size(mut self, swarm_size: usize) -> Self {
        self.config.swarm_size = swarm_size;
        self
    }

    /// Set the search domain
    pub fn bounds(mut self, xmin: f64, xmax: f64) -> Self {
        self.config.xmin = xmin;
        self.config.xmax = xmax;
        self
    }

    /// Set the iteration budget
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the inertia weight
    pub fn inertia(mut self, inertia: f64) -> Self {
        self.config.coefficients.inertia = inertia;
        self
    }

    /// Set the cognitive coefficient
    pub fn cognitive(mut self, cognitive: f64) -> Self {
        self.config.coefficients.cognitive = cognitive;
        self
    }

    /// Set the social coefficient
    pub fn social(mut self, social: f64) -> Self {
        self.config.coefficients.social = social;
        self
    }

    /// Fix the base seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the configuration
    pub fn build(self) -> OptimizerConfig {
        self.config
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Function that was minimized
    pub function: Benchmark,
    /// Number of coordinates
    pub dim: usize,
    /// Number of particles
    pub swarm_size: usize,
    /// Number of workers
    pub workers: usize,
    /// Base seed the worker generators were derived from
    pub seed: u64,
    /// Iterations performed
    pub iterations: usize,
    /// Index of the global-best particle
    pub best_index: usize,
    /// Its position
    pub best_position: Vec<f64>,
    /// Its fitness
    pub best_fitness: f64,
    /// Global-best fitness after each iteration
    pub history: Vec<f64>,
}

/// Run one iteration: update, reduce, broadcast
///
/// `rngs[w]` drives partition `w`; the swarm is split into at most
/// `rngs.len()` partitions, so every particle is stepped. Returns how many
/// personal bests improved.
pub fn step<F: FitnessReducer>(
    swarm: &mut Swarm,
    rule: &UpdateRule,
    reducer: &F,
    rngs: &mut [WorkerRng],
) -> Result<usize> {
    if rngs.is_empty() {
        return Err(Error::InvalidParameter("worker count must be positive"));
    }
    // Every particle sees the same target for the whole phase.
    let target = swarm.global_best().position().to_vec();
    let chunk = partition_len(swarm.len(), rngs.len());

    let improved = swarm
        .particles_mut()
        .par_chunks_mut(chunk)
        .zip(rngs.par_iter_mut())
        .map(|(particles, rng)| {
            let mut improved = 0usize;
            for particle in particles {
                if rule.apply(particle, &target, rng) {
                    improved += 1;
                }
            }
            improved
        })
        .sum::<usize>();

    let best = reducer.argmin_fitness(swarm);
    swarm.broadcast_global_best(best);
    Ok(improved)
}

/// Particle swarm optimizer bound to a runtime
#[derive(Debug)]
pub struct Optimizer<'a, R: SwarmRuntime> {
    config: OptimizerConfig,
    runtime: &'a R,
}

impl<'a, R: SwarmRuntime> Optimizer<'a, R> {
    /// Create an optimizer running on `runtime`
    pub fn new(config: OptimizerConfig, runtime: &'a R) -> Self {
        Self { config, runtime }
    }

    /// Get the configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Initialize a swarm and iterate until the budget is spent
    pub fn run(&self) -> Result<RunReport> {
        let config = &self.config;
        config.validate()?;
        let bounds = config.bounds()?;
        let workers = self.runtime.workers().max(1);
        let seed = config.seed.unwrap_or_else(|| self.runtime.now());

        info!(
            function = %config.function,
            dim = config.dim,
            swarm_size = config.swarm_size,
            workers,
            seed,
            max_iterations = config.max_iterations,
            "starting particle swarm optimization"
        );

        let mut rngs = WorkerRng::per_worker(seed, workers);
        let mut swarm = self.runtime.install(|| {
            init::initialize(
                config.function,
                config.dim,
                config.swarm_size,
                bounds,
                &mut rngs,
            )
        })?;
        debug!(
            index = swarm.global_best_index(),
            fitness = swarm.global_best().fitness(),
            "initial global best"
        );

        let rule = UpdateRule::new(config.function, config.coefficients, bounds);
        let reducer = ParallelReducer::new(workers);
        let mut history = Vec::new();
        history
            .try_reserve_exact(config.max_iterations)
            .map_err(|_| Error::AllocationFailure {
                particles: config.swarm_size,
                dim: config.dim,
            })?;

        for iteration in 0..config.max_iterations {
            let improved = self
                .runtime
                .install(|| step(&mut swarm, &rule, &reducer, &mut rngs))?;
            let best = swarm.global_best();
            history.push(best.fitness());
            debug!(
                iteration,
                index = best.global_best(),
                fitness = best.fitness(),
                improved,
                "iteration complete"
            );
        }

        let best_index = swarm.global_best_index();
        let best = swarm.global_best();
        info!(
            best_index,
            best_fitness = best.fitness(),
            iterations = config.max_iterations,
            "optimization finished"
        );

        Ok(RunReport {
            function: config.function,
            dim: config.dim,
            swarm_size: config.swarm_size,
            workers,
            seed,
            iterations: config.max_iterations,
            best_index,
            best_position: best.position().to_vec(),
            best_fitness: best.fitness(),
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_pso_runtime::mock_runtime::MockRuntime;

    #[test]
    fn test_config_builder() {
        let config = OptimizerConfig::builder()
            .function(Benchmark::Eggholder)
            .swarm_size(64)
            .max_iterations(10)
            .inertia(0.5)
            .seed(3)
            .build();

        assert_eq!(config.function, Benchmark::Eggholder);
        assert_eq!((config.xmin, config.xmax), (-512.0, 512.0));
        assert_eq!(config.swarm_size, 64);
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.coefficients.inertia, 0.5);
        assert_eq!(config.coefficients.social, 1.49);
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn bounds_can_override_the_function_domain() {
        let config = OptimizerConfig::builder()
            .function(Benchmark::Schwefel)
            .bounds(-1.0, 1.0)
            .build();
        assert_eq!((config.xmin, config.xmax), (-1.0, 1.0));
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let ok = OptimizerConfig::default();
        assert!(ok.validate().is_ok());

        let cases = [
            OptimizerConfig { dim: 0, ..ok.clone() },
            OptimizerConfig { swarm_size: 0, ..ok.clone() },
            OptimizerConfig { xmin: 1.0, xmax: 1.0, ..ok.clone() },
            OptimizerConfig { xmax: f64::INFINITY, ..ok.clone() },
            OptimizerConfig {
                coefficients: Coefficients {
                    inertia: f64::NAN,
                    ..Coefficients::default()
                },
                ..ok.clone()
            },
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(Error::InvalidParameter(_))));
        }

        let booth_3d = OptimizerConfig::builder()
            .function(Benchmark::Booth)
            .dim(3)
            .build();
        assert!(matches!(
            booth_3d.validate(),
            Err(Error::InvalidDimensionForFunction { dim: 3, .. })
        ));
    }

    #[test]
    fn step_keeps_the_swarm_consistent() {
        let bounds = Bounds::new(-5.12, 5.12).unwrap();
        let mut rngs = WorkerRng::per_worker(17, 3);
        let mut swarm = init::initialize(Benchmark::Rastrigin, 3, 40, bounds, &mut rngs).unwrap();
        let rule = UpdateRule::new(Benchmark::Rastrigin, Coefficients::default(), bounds);
        let reducer = ParallelReducer::new(3);

        let mut best_so_far: Vec<f64> = swarm.particles().iter().map(|p| p.best_fitness()).collect();
        for _ in 0..25 {
            step(&mut swarm, &rule, &reducer, &mut rngs).unwrap();
            let g = swarm.global_best_index();
            for (p, best) in swarm.particles().iter().zip(best_so_far.iter_mut()) {
                assert_eq!(p.global_best(), g);
                assert!(p.best_fitness() <= *best);
                assert_eq!(p.fitness(), Benchmark::Rastrigin.evaluate(p.position()));
                *best = p.best_fitness();
                assert!(swarm.global_best().fitness() <= p.fitness());
            }
        }
    }

    #[test]
    fn step_without_generators_is_rejected() {
        let bounds = Bounds::new(-5.12, 5.12).unwrap();
        let mut swarm =
            init::initialize(Benchmark::Rastrigin, 2, 12, bounds, &mut WorkerRng::per_worker(3, 2))
                .unwrap();
        let before = swarm.clone();
        let rule = UpdateRule::new(Benchmark::Rastrigin, Coefficients::default(), bounds);
        assert_eq!(
            step(&mut swarm, &rule, &ParallelReducer::new(2), &mut []),
            Err(Error::InvalidParameter("worker count must be positive"))
        );
        assert_eq!(swarm, before);
    }

    #[test]
    fn step_moves_every_particle_for_any_generator_count() {
        let bounds = Bounds::new(-5.12, 5.12).unwrap();
        let rule = UpdateRule::new(Benchmark::Rastrigin, Coefficients::default(), bounds);
        for workers in [1, 2, 3, 5, 7, 11, 20] {
            let mut rngs = WorkerRng::per_worker(9, workers);
            let mut swarm = init::initialize(Benchmark::Rastrigin, 2, 11, bounds, &mut rngs).unwrap();
            let before = swarm.clone();
            step(&mut swarm, &rule, &ParallelReducer::new(workers), &mut rngs).unwrap();
            for (old, new) in before.particles().iter().zip(swarm.particles()) {
                assert_ne!(old.velocity(), new.velocity(), "workers = {workers}");
            }
        }
    }

    #[test]
    fn zero_iterations_report_the_initial_best() {
        let rt = MockRuntime::with_workers(2);
        let config = OptimizerConfig::builder().max_iterations(0).seed(1).swarm_size(10).build();
        let report = Optimizer::new(config, &rt).run().unwrap();
        assert_eq!(report.iterations, 0);
        assert!(report.history.is_empty());
        assert_eq!(report.best_position.len(), 2);
        assert_eq!(
            report.best_fitness,
            Benchmark::Rastrigin.evaluate(&report.best_position)
        );
    }

    #[test]
    fn missing_seed_falls_back_to_the_runtime_clock() {
        let rt = MockRuntime::new();
        rt.advance(core::time::Duration::from_nanos(1234));
        let config = OptimizerConfig::builder().max_iterations(1).swarm_size(4).build();
        let report = Optimizer::new(config, &rt).run().unwrap();
        assert_eq!(report.seed, 1234);
    }

    #[test]
    fn report_serializes_to_json() {
        let rt = MockRuntime::with_workers(2);
        let config = OptimizerConfig::builder().max_iterations(3).swarm_size(8).seed(9).build();
        let report = Optimizer::new(config, &rt).run().unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"function\":\"rastrigin\""));
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
