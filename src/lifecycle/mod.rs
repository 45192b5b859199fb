//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Hooks (hooks.rs):
//!     LifecycleHooks trait → LoggingHooks (one log line per event)
//!
//! Dispatch (startup.rs):
//!     starting → ready → (worker_abort)* → exiting
//! ```
//!
//! # Design Decisions
//! - Hooks are synchronous notifications, never retried
//! - Out-of-order dispatch is rejected rather than ignored
//! - when_ready fires exactly once per master process

pub mod hooks;
pub mod startup;

pub use hooks::{HookError, LifecycleHooks, LoggingHooks, ServerHandle, WorkerHandle};
pub use startup::{Lifecycle, Phase};
