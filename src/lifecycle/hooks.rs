//! Lifecycle hooks invoked by the application server.
//!
//! # Hook Points
//! ```text
//! on_starting   master initializing, before workers fork
//! when_ready    listener bound and workers spawned (once)
//! worker_abort  a worker missed its timeout
//! on_exit       master about to terminate
//! ```
//!
//! Hooks are notifications: they never retry or recover. An error returned
//! from a hook is handed back to the server.

use crate::config::LaunchConfig;
use crate::lifecycle::startup::Phase;
use crate::workers::WorkerTopology;

/// Error raised by a hook or by out-of-order dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    #[error("{hook} invoked while server is {phase}")]
    OutOfOrder { hook: &'static str, phase: Phase },

    #[error("{hook} hook failed: {message}")]
    Failed { hook: &'static str, message: String },
}

/// What hooks can see of the master process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHandle {
    pub proc_name: String,
    pub bind: String,
    pub topology: WorkerTopology,
    pub pid: u32,
}

impl ServerHandle {
    pub fn new(config: &LaunchConfig, pid: u32) -> Self {
        Self {
            proc_name: config.server.proc_name.clone(),
            bind: config.server.bind.clone(),
            topology: WorkerTopology::from_config(config),
            pid,
        }
    }
}

/// What hooks can see of a worker process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerHandle {
    /// OS process id.
    pub pid: u32,
    /// Spawn order of the worker within the master.
    pub age: u64,
}

/// Callbacks registered with the server.
///
/// Every method defaults to doing nothing, so implementors only override
/// the points they care about.
pub trait LifecycleHooks: Send + Sync {
    fn on_starting(&self, _server: &ServerHandle) -> Result<(), HookError> {
        Ok(())
    }

    fn when_ready(&self, _server: &ServerHandle) -> Result<(), HookError> {
        Ok(())
    }

    fn worker_abort(&self, _worker: &WorkerHandle) -> Result<(), HookError> {
        Ok(())
    }

    fn on_exit(&self, _server: &ServerHandle) -> Result<(), HookError> {
        Ok(())
    }
}

/// Hooks that write one log line per lifecycle event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHooks;

impl LifecycleHooks for LoggingHooks {
    fn on_starting(&self, server: &ServerHandle) -> Result<(), HookError> {
        let topology = &server.topology;
        tracing::info!(
            workers = topology.workers,
            threads = topology.threads,
            capacity = topology.capacity(),
            "Starting {} (production) - {}",
            server.proc_name,
            topology.summary()
        );
        Ok(())
    }

    fn when_ready(&self, server: &ServerHandle) -> Result<(), HookError> {
        tracing::info!(bind = %server.bind, "Server ready");
        Ok(())
    }

    fn worker_abort(&self, worker: &WorkerHandle) -> Result<(), HookError> {
        tracing::error!(pid = worker.pid, "Worker {} timeout - aborting", worker.pid);
        Ok(())
    }

    fn on_exit(&self, _server: &ServerHandle) -> Result<(), HookError> {
        tracing::info!("Server shutting down");
        Ok(())
    }
}
