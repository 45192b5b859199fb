//! Lifecycle dispatch.
//!
//! # State Transitions
//! ```text
//! Created  → Starting: on_starting succeeded
//! Starting → Ready:    when_ready (exactly once)
//! Starting | Ready → Exited: on_exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: the first failing hook stops dispatch and its error is returned
//! - worker_abort does not change the phase
//! - Hook sets run in registration order

use std::fmt;

use crate::config::LaunchConfig;
use crate::lifecycle::hooks::{HookError, LifecycleHooks, LoggingHooks, ServerHandle, WorkerHandle};

/// Where the master process is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Starting,
    Ready,
    Exited,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Starting => "starting",
            Phase::Ready => "ready",
            Phase::Exited => "exited",
        };
        write!(f, "{name}")
    }
}

/// Registered hooks plus the phase they have been driven to.
pub struct Lifecycle {
    server: ServerHandle,
    hooks: Vec<Box<dyn LifecycleHooks>>,
    phase: Phase,
}

impl Lifecycle {
    /// Lifecycle for this process with [`LoggingHooks`] registered.
    pub fn new(config: &LaunchConfig) -> Self {
        let mut lifecycle = Self::without_hooks(ServerHandle::new(config, std::process::id()));
        lifecycle.register(LoggingHooks);
        lifecycle
    }

    /// Lifecycle with nothing registered.
    pub fn without_hooks(server: ServerHandle) -> Self {
        Self {
            server,
            hooks: Vec::new(),
            phase: Phase::Created,
        }
    }

    /// Add a hook set; it runs after those already registered.
    pub fn register<H: LifecycleHooks + 'static>(&mut self, hooks: H) -> &mut Self {
        self.hooks.push(Box::new(hooks));
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn server(&self) -> &ServerHandle {
        &self.server
    }

    /// Master is initializing. Any error aborts startup.
    pub fn starting(&mut self) -> Result<(), HookError> {
        self.expect_phase("on_starting", &[Phase::Created])?;
        for hooks in &self.hooks {
            hooks.on_starting(&self.server)?;
        }
        self.phase = Phase::Starting;
        Ok(())
    }

    /// Listener is bound and workers are spawned.
    pub fn ready(&mut self) -> Result<(), HookError> {
        self.expect_phase("when_ready", &[Phase::Starting])?;
        self.phase = Phase::Ready;
        for hooks in &self.hooks {
            hooks.when_ready(&self.server)?;
        }
        Ok(())
    }

    /// A worker failed to respond within the configured timeout.
    pub fn worker_timed_out(&self, worker: &WorkerHandle) -> Result<(), HookError> {
        self.expect_phase("worker_abort", &[Phase::Starting, Phase::Ready])?;
        for hooks in &self.hooks {
            hooks.worker_abort(worker)?;
        }
        Ok(())
    }

    /// Master is about to terminate.
    pub fn exiting(&mut self) -> Result<(), HookError> {
        self.expect_phase("on_exit", &[Phase::Starting, Phase::Ready])?;
        self.phase = Phase::Exited;
        for hooks in &self.hooks {
            hooks.on_exit(&self.server)?;
        }
        Ok(())
    }

    fn expect_phase(&self, hook: &'static str, allowed: &[Phase]) -> Result<(), HookError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            tracing::warn!(hook, phase = %self.phase, "Lifecycle hook invoked out of order");
            Err(HookError::OutOfOrder {
                hook,
                phase: self.phase,
            })
        }
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("server", &self.server)
            .field("hooks", &self.hooks.len())
            .field("phase", &self.phase)
            .finish()
    }
}
