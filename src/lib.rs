//! Launch configuration for a pre-forking, multi-threaded application server.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod workers;

pub use config::schema::LaunchConfig;
pub use lifecycle::{Lifecycle, LifecycleHooks};
pub use workers::WorkerTopology;
