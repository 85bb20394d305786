//! Swarm initialization
//!
//! Every particle gets a uniform position in the domain, a uniform velocity in
//! `[-|xmax - xmin|, |xmax - xmin|]`, a personal best equal to its position
//! and the fitness of that position. The minimum-fitness index is then
//! broadcast to the whole swarm.

use rayon::prelude::*;

use crate::fitness::Benchmark;
use crate::particle::{Particle, Swarm};
use crate::reduce::{partition_len, FitnessReducer, ParallelReducer, SequentialReducer};
use crate::rng::{RandomSource, SharedRng, WorkerRng};
use crate::update::Bounds;
use crate::{Error, Result};

fn check_shape(benchmark: Benchmark, dim: usize, swarm_size: usize) -> Result<()> {
    if swarm_size == 0 {
        return Err(Error::InvalidParameter("swarm size must be positive"));
    }
    benchmark.check_dimension(dim)
}

fn spawn_particle<R: RandomSource + ?Sized>(
    benchmark: Benchmark,
    dim: usize,
    bounds: &Bounds,
    rng: &mut R,
) -> Result<Particle> {
    let mut state = Particle::reserve_state(dim)?;
    let limit = bounds.velocity_limit();
    state.extend((0..dim).map(|_| rng.sample(bounds.min(), bounds.max())));
    state.extend((0..dim).map(|_| rng.sample(-limit, limit)));
    state.extend_from_within(..dim);
    Ok(Particle::from_state(benchmark, dim, state))
}

/// Build a swarm drawing every sample from one stream, in particle order
pub fn initialize_sequential(
    benchmark: Benchmark,
    dim: usize,
    swarm_size: usize,
    bounds: Bounds,
    rng: &mut SharedRng,
) -> Result<Swarm> {
    check_shape(benchmark, dim, swarm_size)?;
    let mut swarm = Swarm::with_capacity(swarm_size, dim)?;
    for _ in 0..swarm_size {
        swarm.push(spawn_particle(benchmark, dim, &bounds, rng)?);
    }
    let best = SequentialReducer.argmin_fitness(&swarm);
    swarm.broadcast_global_best(best);
    Ok(swarm)
}

/// Build a swarm in parallel, one contiguous chunk of particles per worker
///
/// Worker `w` fills chunk `w` from `rngs[w]`, so the result depends only on
/// the generators and not on thread scheduling. The worker count is
/// `rngs.len()`.
pub fn initialize(
    benchmark: Benchmark,
    dim: usize,
    swarm_size: usize,
    bounds: Bounds,
    rngs: &mut [WorkerRng],
) -> Result<Swarm> {
    check_shape(benchmark, dim, swarm_size)?;
    if rngs.is_empty() {
        return Err(Error::InvalidParameter("worker count must be positive"));
    }
    let mut swarm = Swarm::with_capacity(swarm_size, dim)?;
    let chunk = partition_len(swarm_size, rngs.len());

    let chunks: Vec<Result<Vec<Particle>>> = rngs
        .par_iter_mut()
        .enumerate()
        .map(|(worker, rng)| {
            let start = (worker * chunk).min(swarm_size);
            let end = (start + chunk).min(swarm_size);
            (start..end)
                .map(|_| spawn_particle(benchmark, dim, &bounds, &mut *rng))
                .collect::<Result<Vec<_>>>()
        })
        .collect();
    for chunk in chunks {
        for particle in chunk? {
            swarm.push(particle);
        }
    }

    let best = ParallelReducer::new(rngs.len()).argmin_fitness(&swarm);
    swarm.broadcast_global_best(best);
    Ok(swarm)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_invariants(swarm: &Swarm, benchmark: Benchmark, bounds: &Bounds) {
        let limit = bounds.velocity_limit();
        let g = swarm.global_best_index();
        assert!(g < swarm.len());
        for p in swarm.particles() {
            assert_eq!(p.dim(), swarm.dim());
            assert!(p
                .position()
                .iter()
                .all(|x| (bounds.min()..=bounds.max()).contains(x)));
            assert!(p.velocity().iter().all(|v| (-limit..=limit).contains(v)));
            assert_eq!(p.personal_best(), p.position());
            assert_eq!(p.fitness(), benchmark.evaluate(p.position()));
            assert_eq!(p.global_best(), g);
            assert!(swarm.particle(g).unwrap().fitness() <= p.fitness());
        }
    }

    #[test]
    fn sequential_swarm_satisfies_invariants() {
        let bounds = Bounds::new(-5.12, 5.12).unwrap();
        let mut rng = SharedRng::seed_from_u64(11);
        let swarm =
            initialize_sequential(Benchmark::Rastrigin, 4, 64, bounds, &mut rng).unwrap();
        assert_eq!(swarm.len(), 64);
        assert_eq!(swarm.dim(), 4);
        check_invariants(&swarm, Benchmark::Rastrigin, &bounds);
    }

    #[test]
    fn parallel_swarm_satisfies_invariants() {
        let bounds = Bounds::new(-512.0, 512.0).unwrap();
        for workers in [1, 3, 8, 100] {
            let mut rngs = WorkerRng::per_worker(21, workers);
            let swarm = initialize(Benchmark::Eggholder, 2, 37, bounds, &mut rngs).unwrap();
            assert_eq!(swarm.len(), 37, "workers = {workers}");
            check_invariants(&swarm, Benchmark::Eggholder, &bounds);
        }
    }

    #[test]
    fn parallel_initialization_is_reproducible() {
        let bounds = Bounds::new(-500.0, 500.0).unwrap();
        let a = initialize(
            Benchmark::Schwefel,
            3,
            50,
            bounds,
            &mut WorkerRng::per_worker(7, 4),
        )
        .unwrap();
        let b = initialize(
            Benchmark::Schwefel,
            3,
            50,
            bounds,
            &mut WorkerRng::per_worker(7, 4),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bad_shapes_are_rejected_before_allocation() {
        let bounds = Bounds::new(-10.0, 10.0).unwrap();
        let mut rng = SharedRng::seed_from_u64(0);
        assert_eq!(
            initialize_sequential(Benchmark::Booth, 3, 10, bounds, &mut rng),
            Err(Error::InvalidDimensionForFunction {
                function: Benchmark::Booth,
                expected: 2,
                dim: 3,
            })
        );
        assert!(matches!(
            initialize(Benchmark::Rastrigin, 2, 0, bounds, &mut WorkerRng::per_worker(0, 2)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            initialize(Benchmark::Rastrigin, 2, 4, bounds, &mut []),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn oversized_swarm_reports_allocation_failure() {
        let bounds = Bounds::new(-1.0, 1.0).unwrap();
        let mut rng = SharedRng::seed_from_u64(0);
        assert!(matches!(
            initialize_sequential(Benchmark::Rastrigin, 1, usize::MAX, bounds, &mut rng),
            Err(Error::AllocationFailure { .. })
        ));
    }
}
