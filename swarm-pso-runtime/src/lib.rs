//! # SwarmPSO Runtime
//!
//! Fork-join runtime abstractions for SwarmPSO.
//!
//! This crate provides a unified interface for the parallel phases of an
//! optimization run:
//! - **Rayon**: a fixed-size thread pool with exactly `workers` threads
//! - **Mock**: no dedicated pool and a manually advanced clock, for tests
//!
//! Each phase of an iteration runs inside [`SwarmRuntime::install`]; the end of
//! every parallel iterator started there is the barrier between phases.
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Use a Rayon thread pool

#![forbid(unsafe_code)]

use core::time::Duration;

/// Errors raised while setting up a runtime
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// A pool needs at least one worker
    #[error("worker count must be non-zero")]
    ZeroWorkers,
    /// The underlying thread pool could not be created
    #[error("failed to build worker pool: {0}")]
    PoolBuild(String),
}

/// Runtime trait for fork-join execution
pub trait SwarmRuntime: Send + Sync {
    /// Current wall-clock time in nanoseconds
    fn now(&self) -> u64;

    /// Number of workers a parallel phase is partitioned across
    fn workers(&self) -> usize;

    /// Run `op` inside the runtime's worker pool and wait for it to finish
    fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send;
}

#[cfg(feature = "rayon")]
pub mod rayon_runtime {
    //! Rayon-based runtime implementation

    use super::*;

    /// Fixed-size Rayon thread pool
    #[derive(Debug)]
    pub struct RayonRuntime {
        pool: rayon::ThreadPool,
        workers: usize,
    }

    impl RayonRuntime {
        /// Build a pool with exactly `workers` threads
        pub fn new(workers: usize) -> Result<Self, RuntimeError> {
            if workers == 0 {
                return Err(RuntimeError::ZeroWorkers);
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("swarm-pso-worker-{i}"))
                .build()
                .map_err(|e| RuntimeError::PoolBuild(e.to_string()))?;
            Ok(Self { pool, workers })
        }
    }

    impl SwarmRuntime for RayonRuntime {
        fn now(&self) -> u64 {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos() as u64
        }

        fn workers(&self) -> usize {
            self.workers
        }

        fn install<OP, R>(&self, op: OP) -> R
        where
            OP: FnOnce() -> R + Send,
            R: Send,
        {
            self.pool.install(op)
        }
    }
}

/// Mock runtime for testing
pub mod mock_runtime {
    use super::*;
    use core::sync::atomic::{AtomicU64, Ordering};

    /// Mock runtime without a pool of its own
    ///
    /// `install` calls the closure directly on the calling thread. Parallel
    /// iterators started inside it still run on rayon's global pool, but
    /// partitioning follows [`SwarmRuntime::workers`], so results match a
    /// pooled runtime with the same worker count.
    #[derive(Debug)]
    pub struct MockRuntime {
        current_time_ns: AtomicU64,
        workers: usize,
    }

    impl Default for MockRuntime {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockRuntime {
        /// Create a new mock runtime with a single worker
        pub fn new() -> Self {
            Self::with_workers(1)
        }

        /// Create a mock runtime reporting `workers` partitions
        ///
        /// A zero count is raised to one.
        pub fn with_workers(workers: usize) -> Self {
            Self {
                current_time_ns: AtomicU64::new(0),
                workers: workers.max(1),
            }
        }

        /// Advance the mock clock
        pub fn advance(&self, duration: Duration) {
            self.current_time_ns
                .fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
        }
    }

    impl SwarmRuntime for MockRuntime {
        fn now(&self) -> u64 {
            self.current_time_ns.load(Ordering::SeqCst)
        }

        fn workers(&self) -> usize {
            self.workers
        }

        fn install<OP, R>(&self, op: OP) -> R
        where
            OP: FnOnce() -> R + Send,
            R: Send,
        {
            op()
        }
    }
}

/// Get the default runtime based on features
#[cfg(feature = "rayon")]
pub fn default_runtime(workers: usize) -> Result<rayon_runtime::RayonRuntime, RuntimeError> {
    rayon_runtime::RayonRuntime::new(workers)
}

#[cfg(test)]
mod tests {
    use super::mock_runtime::MockRuntime;
    use super::*;

    #[test]
    fn mock_clock_only_moves_when_advanced() {
        let rt = MockRuntime::new();
        assert_eq!(rt.now(), 0);
        rt.advance(Duration::from_millis(3));
        assert_eq!(rt.now(), 3_000_000);
    }

    #[test]
    fn mock_runtime_never_reports_zero_workers() {
        assert_eq!(MockRuntime::with_workers(0).workers(), 1);
        assert_eq!(MockRuntime::with_workers(4).workers(), 4);
    }

    #[test]
    fn mock_install_calls_the_closure_on_the_caller() {
        let rt = MockRuntime::new();
        let caller = std::thread::current().id();
        let inside = rt.install(|| std::thread::current().id());
        assert_eq!(caller, inside);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn rayon_pool_has_requested_thread_count() {
        let rt = default_runtime(3).expect("pool");
        assert_eq!(rt.workers(), 3);
        assert_eq!(rt.install(rayon::current_num_threads), 3);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn rayon_runtime_rejects_zero_workers() {
        assert_eq!(
            rayon_runtime::RayonRuntime::new(0).unwrap_err(),
            RuntimeError::ZeroWorkers
        );
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn rayon_clock_is_wall_time() {
        let rt = default_runtime(1).expect("pool");
        assert!(rt.now() > 0);
    }
}
