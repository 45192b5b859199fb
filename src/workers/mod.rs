//! Worker concurrency shape.
//!
//! # Data Flow
//! ```text
//! CPU count / WEB_CONCURRENCY
//!     → topology.rs (worker count, capacity)
//!     → recycling.rs (per-worker max-requests threshold)
//!     → handed to the application server's master process
//! ```
//!
//! # Design Decisions
//! - Worker count is capped so a small host is never oversubscribed
//! - Recycling thresholds are randomized per worker to spread restarts

pub mod recycling;
pub mod topology;

pub use recycling::RecyclePolicy;
pub use topology::{default_worker_count, WorkerTopology};
