//! Worker topology derived from the host and the configuration.

use crate::config::schema::{LaunchConfig, WorkerClass};

/// Upper bound applied to the CPU-derived default worker count.
pub const MAX_DEFAULT_WORKERS: usize = 4;

/// Default worker count for a host: `2 × cpu_count + 1`, capped at
/// [`MAX_DEFAULT_WORKERS`].
pub fn default_worker_count(cpu_count: usize) -> usize {
    cpu_count
        .saturating_mul(2)
        .saturating_add(1)
        .min(MAX_DEFAULT_WORKERS)
}

/// Resolved concurrency shape handed to the master process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerTopology {
    pub workers: usize,
    pub threads: usize,
    pub worker_class: WorkerClass,
}

impl WorkerTopology {
    pub fn from_config(config: &LaunchConfig) -> Self {
        Self {
            workers: config.workers.workers,
            threads: config.workers.effective_threads(),
            worker_class: config.workers.effective_class(),
        }
    }

    /// Total concurrent requests the server can hold.
    pub fn capacity(&self) -> usize {
        self.workers.saturating_mul(self.threads)
    }

    /// Capacity summary line logged when the server starts.
    pub fn summary(&self) -> String {
        format!(
            "Workers: {}, Threads: {}, Capacity: {} concurrent requests",
            self.workers,
            self.threads,
            self.capacity()
        )
    }
}
