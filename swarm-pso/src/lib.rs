//! # SwarmPSO
//!
//! **Parallel particle swarm optimization over classic benchmark functions.**
//!
//! A swarm of candidate solutions moves through a box-constrained domain, each
//! particle pulled toward its own best position and toward the best position
//! found by the whole swarm. Every iteration updates the particles in
//! parallel, reduces their fitness to a new global best and broadcasts it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! let best = swarm_pso::run_optimization("rastrigin", 2, 200, -5.12, 5.12, 500, 4)?;
//! println!("{} at {:?}", best.fitness, best.position);
//! # Ok::<(), swarm_pso::Error>(())
//! ```
//!
//! For control over coefficients and seeding build an [`OptimizerConfig`]
//! and call [`run_with_config`], which returns the full [`RunReport`].
//!
//! ## Crate Structure
//!
//! - [`swarm_pso_core`]: benchmarks, swarm model, update rule, reduction and the loop
//! - [`swarm_pso_runtime`]: fixed-size worker pool and a mock runtime for tests

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

// Re-export sub-crates
pub use swarm_pso_core as core;
pub use swarm_pso_runtime as runtime;

// Re-export commonly used items at the top level
pub use swarm_pso_core::{
    fitness::Benchmark,
    optimizer::{Optimizer, OptimizerConfig, OptimizerConfigBuilder, RunReport},
    update::Coefficients,
    Error, Result,
};

pub use swarm_pso_runtime::SwarmRuntime;

/// Text and JSON rendering of run reports
pub mod report;

/// Prelude module for convenient imports
///
/// ```rust
/// use swarm_pso::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::runtime::SwarmRuntime;

    pub use crate::{run_optimization, run_with_config, BestParticle};
}

/// Best particle found by a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestParticle {
    /// Index of the particle in the swarm
    pub index: usize,
    /// Its position
    pub position: Vec<f64>,
    /// Its fitness
    pub fitness: f64,
}

impl From<RunReport> for BestParticle {
    fn from(report: RunReport) -> Self {
        Self {
            index: report.best_index,
            position: report.best_position,
            fitness: report.best_fitness,
        }
    }
}

/// Minimize `function_name` over `[xmin, xmax]^dim`
///
/// The name is resolved before anything is allocated, so an unknown function
/// fails with [`Error::UnknownFunction`] and no swarm is built. The generators
/// are seeded from the wall clock.
pub fn run_optimization(
    function_name: &str,
    dim: usize,
    swarm_size: usize,
    xmin: f64,
    xmax: f64,
    max_iterations: usize,
    workers: usize,
) -> Result<BestParticle> {
    let function: Benchmark = function_name.parse()?;
    let config = OptimizerConfig::builder()
        .function(function)
        .dim(dim)
        .swarm_size(swarm_size)
        .bounds(xmin, xmax)
        .max_iterations(max_iterations)
        .build();
    run_with_config(config, workers).map(BestParticle::from)
}

/// Run `config` on a fresh pool of exactly `workers` threads
///
/// The configuration is validated before the pool is started.
pub fn run_with_config(config: OptimizerConfig, workers: usize) -> Result<RunReport> {
    config.validate()?;
    if workers == 0 {
        return Err(Error::InvalidParameter("worker count must be positive"));
    }
    let runtime = runtime::default_runtime(workers)?;
    Optimizer::new(config, &runtime).run()
}
