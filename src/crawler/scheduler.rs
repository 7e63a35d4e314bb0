//! Scheduler for partitioning the chain identifier range across workers
//!
//! This module handles:
//! - Computing rounded partition boundaries over `[1, max_id]`
//! - Handing each worker a contiguous, non-overlapping identifier range
//! - Rejecting a worker pool of size zero

use crate::ConfigError;
use std::ops::RangeInclusive;

/// The identifiers a single worker is responsible for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerAssignment {
    /// Zero-based worker index
    pub worker: u32,

    /// Chain identifiers, visited in increasing order; may be empty
    pub ids: RangeInclusive<u32>,
}

impl WorkerAssignment {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        if self.ids.is_empty() {
            0
        } else {
            (self.ids.end() - self.ids.start() + 1) as usize
        }
    }
}

/// Scheduler splits `[1, max_id]` into one range per worker
///
/// Boundaries are `b_k = round(k * max_id / workers)` for `k = 0..=workers`,
/// and worker `k` owns `[b_k + 1, b_{k+1}]`.
#[derive(Debug, Clone)]
pub struct Scheduler {
    max_id: u32,
    workers: u32,
}

impl Scheduler {
    /// Creates a scheduler
    ///
    /// # Returns
    ///
    /// * `Ok(Scheduler)` - Scheduler over `[1, max_id]`
    /// * `Err(ConfigError)` - `workers` is zero
    pub fn new(max_id: u32, workers: u32) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::Validation(
                "crawl needs at least one worker".to_string(),
            ));
        }
        Ok(Self { max_id, workers })
    }

    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    pub fn workers(&self) -> u32 {
        self.workers
    }

    fn boundary(&self, k: u32) -> u32 {
        let exact = f64::from(k) * f64::from(self.max_id) / f64::from(self.workers);
        (exact.round() as u32).min(self.max_id)
    }

    /// Assignment for every worker, in worker order
    pub fn assignments(&self) -> Vec<WorkerAssignment> {
        (0..self.workers)
            .map(|k| WorkerAssignment {
                worker: k,
                ids: (self.boundary(k) + 1)..=self.boundary(k + 1),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(max_id: u32, workers: u32) -> Vec<RangeInclusive<u32>> {
        Scheduler::new(max_id, workers)
            .unwrap()
            .assignments()
            .into_iter()
            .map(|a| a.ids)
            .collect()
    }

    #[test]
    fn test_ten_ids_three_workers() {
        assert_eq!(ranges(10, 3), vec![1..=3, 4..=7, 8..=10]);
    }

    #[test]
    fn test_single_worker_owns_everything() {
        assert_eq!(ranges(541, 1), vec![1..=541]);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            Scheduler::new(10, 0),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_more_workers_than_ids() {
        let assignments = Scheduler::new(2, 5).unwrap().assignments();
        assert_eq!(assignments.len(), 5);
        let total: usize = assignments.iter().map(|a| a.len()).sum();
        assert_eq!(total, 2);
        assert!(assignments.iter().any(|a| a.is_empty()));
    }

    #[test]
    fn test_zero_max_id_gives_empty_ranges() {
        let assignments = Scheduler::new(0, 4).unwrap().assignments();
        assert!(assignments.iter().all(|a| a.is_empty()));
    }

    #[test]
    fn test_partition_covers_range_without_overlap() {
        for max_id in [1u32, 7, 10, 99, 541, 1000] {
            for workers in [1u32, 2, 3, 7, 8, 16, 64] {
                let mut seen = vec![0u32; max_id as usize + 1];
                let mut previous_end = 0;
                for range in ranges(max_id, workers) {
                    if range.is_empty() {
                        continue;
                    }
                    assert_eq!(*range.start(), previous_end + 1);
                    previous_end = *range.end();
                    for id in range {
                        seen[id as usize] += 1;
                    }
                }
                assert_eq!(previous_end, max_id);
                assert!(seen[1..].iter().all(|count| *count == 1));
            }
        }
    }
}
