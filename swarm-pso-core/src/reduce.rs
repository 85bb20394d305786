//! Global-best reduction
//!
//! Both reducers return the index of the strictly smallest fitness, ties going
//! to the lowest index. NaN never wins a comparison; if nothing beats
//! `+inf` the answer is index 0.
//!
//! The parallel reducer is a two-phase map-reduce: every worker scans one
//! contiguous partition, then a single merge walks the partial results in
//! partition order. Because partitions are ordered and the merge only accepts
//! a strictly smaller value, it picks the same index as a linear scan.

use rayon::prelude::*;

use crate::particle::{Particle, Swarm};

/// Trait for global-best reduction strategies
pub trait FitnessReducer: Send + Sync {
    /// Index of the minimum-fitness entry of `fitness`
    fn argmin_slice(&self, fitness: &[f64]) -> usize;

    /// Index of the minimum-fitness particle of `swarm`
    fn argmin_fitness(&self, swarm: &Swarm) -> usize;
}

/// Best entry seen so far
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    index: Option<usize>,
    fitness: f64,
}

impl Candidate {
    const NONE: Self = Self {
        index: None,
        fitness: f64::INFINITY,
    };

    #[inline]
    fn offer(self, index: usize, fitness: f64) -> Self {
        if fitness < self.fitness {
            Self {
                index: Some(index),
                fitness,
            }
        } else {
            self
        }
    }

    #[inline]
    fn merge(self, other: Self) -> Self {
        match other.index {
            Some(index) => self.offer(index, other.fitness),
            None => self,
        }
    }

    fn index(self) -> usize {
        self.index.unwrap_or(0)
    }
}

fn scan<T>(items: &[T], offset: usize, key: impl Fn(&T) -> f64) -> Candidate {
    items
        .iter()
        .enumerate()
        .fold(Candidate::NONE, |best, (i, item)| best.offer(offset + i, key(item)))
}

fn partitioned_scan<T: Sync>(
    items: &[T],
    partitions: usize,
    key: impl Fn(&T) -> f64 + Sync,
) -> Candidate {
    if items.is_empty() {
        return Candidate::NONE;
    }
    let chunk = partition_len(items.len(), partitions);
    let partials: Vec<Candidate> = items
        .par_chunks(chunk)
        .enumerate()
        .map(|(p, part)| scan(part, p * chunk, &key))
        .collect();
    partials.into_iter().fold(Candidate::NONE, Candidate::merge)
}

/// Length of each contiguous partition when `len` items are split `partitions` ways
///
/// The partition count is clamped to `1..=len`; the last partition may be
/// shorter.
pub fn partition_len(len: usize, partitions: usize) -> usize {
    let partitions = partitions.clamp(1, len.max(1));
    len.div_ceil(partitions).max(1)
}

/// Linear scan on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialReducer;

impl FitnessReducer for SequentialReducer {
    fn argmin_slice(&self, fitness: &[f64]) -> usize {
        scan(fitness, 0, |&f| f).index()
    }

    fn argmin_fitness(&self, swarm: &Swarm) -> usize {
        scan(swarm.particles(), 0, Particle::fitness).index()
    }
}

/// Per-partition minima merged by a single step
#[derive(Debug, Clone, Copy)]
pub struct ParallelReducer {
    partitions: usize,
}

impl ParallelReducer {
    /// Reducer splitting its input into `partitions` parts (at least one)
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions: partitions.max(1),
        }
    }

    /// Number of partitions
    pub fn partitions(&self) -> usize {
        self.partitions
    }
}

impl FitnessReducer for ParallelReducer {
    fn argmin_slice(&self, fitness: &[f64]) -> usize {
        partitioned_scan(fitness, self.partitions, |&f| f).index()
    }

    fn argmin_fitness(&self, swarm: &Swarm) -> usize {
        partitioned_scan(swarm.particles(), self.partitions, Particle::fitness).index()
    }
}
