//! # SwarmPSO Core
//!
//! Core particle swarm optimization primitives for SwarmPSO.
//!
//! This crate provides:
//! - Benchmark fitness functions (Booth, Rastrigin, Holder table, Eggholder, Schwefel)
//! - The particle and swarm data model
//! - Per-worker random sources
//! - Swarm initialization, the per-particle update rule and the global-best reduction
//! - The optimization loop tying them together on a [`SwarmRuntime`]
//!
//! Every parallel phase partitions the swarm into one contiguous chunk per
//! worker. A chunk and the generator that drives it are owned by a single
//! worker for the duration of a phase, so no locking is involved.
//!
//! [`SwarmRuntime`]: swarm_pso_runtime::SwarmRuntime

#![forbid(unsafe_code)]

pub mod fitness;
pub mod init;
pub mod optimizer;
pub mod particle;
pub mod reduce;
pub mod rng;
pub mod update;

pub use fitness::Benchmark;
pub use swarm_pso_runtime::RuntimeError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fitness::*;
    pub use crate::optimizer::*;
    pub use crate::particle::*;
    pub use crate::reduce::*;
    pub use crate::rng::*;
    pub use crate::update::*;
    pub use crate::{Error, Result};
}

/// Result type for SwarmPSO operations
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for SwarmPSO core operations
///
/// Every variant aborts the run; there are no partial results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The function name is not one of the recognized benchmarks
    #[error("unknown function: {0:?}")]
    UnknownFunction(String),
    /// Swarm or particle storage could not be reserved
    #[error("could not allocate storage for {particles} particles of dimension {dim}")]
    AllocationFailure { particles: usize, dim: usize },
    /// A fixed-dimension benchmark was asked to run in another dimension
    #[error("{function} is only defined for {expected} dimensions, got {dim}")]
    InvalidDimensionForFunction {
        function: Benchmark,
        expected: usize,
        dim: usize,
    },
    /// A run parameter is out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// The worker pool could not be started
    #[error("worker pool: {0}")]
    WorkerPool(#[from] RuntimeError),
}
