//! Configuration schema definitions.
//!
//! This module defines the complete launch configuration handed to the
//! application server. All types derive Serde traits for deserialization
//! from config files and for dumping the resolved record.

use serde::{Deserialize, Serialize};

use crate::security::forwarded::TrustedProxies;
use crate::workers::topology::default_worker_count;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5000;

/// Access log template used when none is configured.
pub const DEFAULT_ACCESS_LOG_FORMAT: &str =
    r#"%(h)s %(l)s %(u)s %(t)s "%(r)s" %(s)s %(b)s "%(f)s" "%(a)s""#;

/// Root launch configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LaunchConfig {
    /// Concurrency shape (processes and threads).
    pub workers: WorkerConfig,

    /// Worker liveness and connection timeouts.
    pub timeouts: TimeoutConfig,

    /// Worker recycling after a number of requests.
    pub recycling: RecyclingConfig,

    /// Server mechanics (bind, backlog, process identity).
    pub server: ServerConfig,

    /// Logging targets and formats.
    pub logging: LoggingConfig,

    /// Request size and count caps.
    pub limits: LimitsConfig,

    /// Trusted upstream proxies.
    pub proxy: ProxyTrustConfig,
}

impl LaunchConfig {
    /// Defaults for a host with `cpu_count` CPUs.
    pub fn for_host(cpu_count: usize) -> Self {
        let mut config = Self::default();
        config.workers.workers = default_worker_count(cpu_count);
        config
    }

    /// Total concurrent-request capacity across all workers.
    pub fn capacity(&self) -> usize {
        self.workers.workers * self.workers.effective_threads()
    }
}

/// Worker model used by the application server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkerClass {
    /// One request at a time per worker.
    Sync,
    /// Thread pool per worker.
    #[default]
    Gthread,
}

impl std::fmt::Display for WorkerClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerClass::Sync => write!(f, "sync"),
            WorkerClass::Gthread => write!(f, "gthread"),
        }
    }
}

/// Concurrency shape.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of worker processes.
    pub workers: usize,

    /// Worker model.
    pub worker_class: WorkerClass,

    /// Request handler threads per worker.
    pub threads: usize,

    /// Maximum simultaneous clients per worker (async worker models).
    pub worker_connections: usize,
}

impl WorkerConfig {
    /// The worker model the server actually runs.
    ///
    /// A sync worker configured with more than one thread is promoted to
    /// a threaded worker.
    pub fn effective_class(&self) -> WorkerClass {
        match self.worker_class {
            WorkerClass::Sync if self.threads > 1 => WorkerClass::Gthread,
            class => class,
        }
    }

    /// Concurrent requests a single worker can serve.
    pub fn effective_threads(&self) -> usize {
        match self.effective_class() {
            WorkerClass::Sync => 1,
            WorkerClass::Gthread => self.threads,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(num_cpus::get()),
            worker_class: WorkerClass::Gthread,
            threads: 4,
            worker_connections: 1000,
        }
    }
}

/// Timeout configuration, all in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Silent worker deadline before the master kills it. Zero disables.
    pub timeout: u64,

    /// Time in-flight requests get to finish on restart.
    pub graceful_timeout: u64,

    /// Idle keep-alive connection window.
    pub keepalive: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            timeout: 60,
            graceful_timeout: 30,
            keepalive: 5,
        }
    }
}

/// Worker recycling configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecyclingConfig {
    /// Requests served before a worker restarts. Zero disables recycling.
    pub max_requests: u64,

    /// Upper bound of the random amount added to `max_requests` per worker.
    pub max_requests_jitter: u64,
}

impl Default for RecyclingConfig {
    fn default() -> Self {
        Self {
            max_requests: 5000,
            max_requests_jitter: 250,
        }
    }
}

/// Server mechanics.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:5000").
    pub bind: String,

    /// Pending connection queue size.
    pub backlog: u32,

    /// Set SO_REUSEPORT on the listening socket.
    pub reuse_port: bool,

    /// Serve files with sendfile().
    pub sendfile: bool,

    /// Load application code before forking workers.
    pub preload_app: bool,

    /// Restart workers when code changes.
    pub reload: bool,

    /// Detach from the controlling terminal.
    pub daemon: bool,

    /// Where to write the master pid.
    pub pidfile: Option<String>,

    /// File mode creation mask.
    pub umask: u32,

    /// User to switch workers to.
    pub user: Option<String>,

    /// Group to switch workers to.
    pub group: Option<String>,

    /// Directory for spooled request bodies.
    pub tmp_upload_dir: Option<String>,

    /// Process title.
    pub proc_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: format!("0.0.0.0:{DEFAULT_PORT}"),
            backlog: 2048,
            reuse_port: true,
            sendfile: true,
            preload_app: true,
            reload: false,
            daemon: false,
            pidfile: None,
            umask: 0,
            user: None,
            group: None,
            tmp_upload_dir: None,
            proc_name: "sdg-assessment".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error, critical).
    pub loglevel: String,

    /// Access log target; "-" means stdout.
    pub accesslog: String,

    /// Error log target; "-" means stderr.
    pub errorlog: String,

    /// Access log line template.
    pub access_log_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            accesslog: "-".to_string(),
            errorlog: "-".to_string(),
            access_log_format: DEFAULT_ACCESS_LOG_FORMAT.to_string(),
        }
    }
}

/// Request limits.
///
/// Zero means unlimited for the two size limits. A zero field count means
/// the server maximum (32768).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request line size in bytes.
    pub limit_request_line: usize,

    /// Maximum number of header fields.
    pub limit_request_fields: usize,

    /// Maximum size of one header field in bytes.
    pub limit_request_field_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            limit_request_line: 4096,
            limit_request_fields: 100,
            limit_request_field_size: 8190,
        }
    }
}

/// Which upstream peers are trusted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyTrustConfig {
    /// Peers allowed to set forwarding headers.
    pub forwarded_allow_ips: TrustedProxies,

    /// Peers allowed to speak the PROXY protocol.
    pub proxy_allow_ips: TrustedProxies,
}

impl Default for ProxyTrustConfig {
    fn default() -> Self {
        Self {
            forwarded_allow_ips: TrustedProxies::Any,
            proxy_allow_ips: TrustedProxies::Any,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_profile() {
        let config = LaunchConfig::default();
        assert_eq!(config.workers.threads, 4);
        assert_eq!(config.workers.worker_class, WorkerClass::Gthread);
        assert_eq!(config.timeouts.timeout, 60);
        assert_eq!(config.timeouts.graceful_timeout, 30);
        assert_eq!(config.timeouts.keepalive, 5);
        assert_eq!(config.server.bind, "0.0.0.0:5000");
        assert_eq!(config.server.proc_name, "sdg-assessment");
        assert_eq!(config.limits.limit_request_line, 4096);
        assert_eq!(config.limits.limit_request_fields, 100);
        assert_eq!(config.limits.limit_request_field_size, 8190);
        assert!(config.recycling.max_requests_jitter < config.recycling.max_requests);
    }

    #[test]
    fn test_sync_worker_promoted_when_threaded() {
        let workers = WorkerConfig {
            worker_class: WorkerClass::Sync,
            threads: 4,
            ..WorkerConfig::default()
        };
        assert_eq!(workers.effective_class(), WorkerClass::Gthread);
        assert_eq!(workers.effective_threads(), 4);

        let single = WorkerConfig {
            worker_class: WorkerClass::Sync,
            threads: 1,
            ..WorkerConfig::default()
        };
        assert_eq!(single.effective_class(), WorkerClass::Sync);
        assert_eq!(single.effective_threads(), 1);
    }

    #[test]
    fn test_for_host_derives_workers() {
        assert_eq!(LaunchConfig::for_host(1).workers.workers, 3);
        assert_eq!(LaunchConfig::for_host(2).workers.workers, 4);
        assert_eq!(LaunchConfig::for_host(16).workers.workers, 4);
    }

    #[test]
    fn test_capacity() {
        let mut config = LaunchConfig::default();
        config.workers.workers = 3;
        assert_eq!(config.capacity(), 12);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: LaunchConfig = toml::from_str("[workers]\nthreads = 2\n").unwrap();
        assert_eq!(config.workers.threads, 2);
        assert_eq!(config.workers.worker_connections, 1000);
        assert_eq!(config.logging.access_log_format, DEFAULT_ACCESS_LOG_FORMAT);
        assert_eq!(config.proxy.forwarded_allow_ips, TrustedProxies::Any);
    }
}
