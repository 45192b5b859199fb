//! Configuration loading from disk and the environment.
//!
//! Layers are applied in order: built-in defaults for the host, then the
//! optional TOML file, then `WEB_CONCURRENCY` / `PORT`.

use std::fs;
use std::path::Path;

use crate::config::schema::LaunchConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::workers::topology::default_worker_count;

/// Overrides the worker count.
pub const WEB_CONCURRENCY_ENV: &str = "WEB_CONCURRENCY";

/// Overrides the bind port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {var} value '{value}': {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, resolve and validate configuration for this host and process
/// environment.
pub fn load_config(path: Option<&Path>) -> Result<LaunchConfig, ConfigError> {
    load_config_with(path, num_cpus::get(), |key| std::env::var(key).ok())
}

/// Load, resolve and validate configuration with an explicit CPU count and
/// environment lookup.
pub fn load_config_with<F>(
    path: Option<&Path>,
    cpu_count: usize,
    env: F,
) -> Result<LaunchConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            tracing::debug!(path = %path.display(), "Read configuration file");
            parse_config(&content, cpu_count)?
        }
        None => LaunchConfig::for_host(cpu_count),
    };

    let config = apply_env_overrides(config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML document on top of the host defaults.
///
/// The worker count falls back to the CPU-derived default when the file
/// does not set it.
pub fn parse_config(content: &str, cpu_count: usize) -> Result<LaunchConfig, ConfigError> {
    let table: toml::Table = toml::from_str(content)?;
    let sets_workers = table
        .get("workers")
        .and_then(|section| section.get("workers"))
        .is_some();

    let mut config: LaunchConfig = toml::Value::Table(table).try_into()?;
    if !sets_workers {
        config.workers.workers = default_worker_count(cpu_count);
    }
    Ok(config)
}

/// Apply `WEB_CONCURRENCY` and `PORT` on top of `config`.
pub fn apply_env_overrides<F>(mut config: LaunchConfig, env: F) -> Result<LaunchConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = env(WEB_CONCURRENCY_ENV) {
        let workers = parse_positive(WEB_CONCURRENCY_ENV, &raw)?;
        tracing::debug!(workers, "Worker count overridden by {}", WEB_CONCURRENCY_ENV);
        config.workers.workers = workers;
    }

    if let Some(raw) = env(PORT_ENV) {
        let port = parse_port(&raw)?;
        config.server.bind = with_port(&config.server.bind, port);
        tracing::debug!(bind = %config.server.bind, "Bind port overridden by {}", PORT_ENV);
    }

    Ok(config)
}

fn parse_positive(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    let env_error = |reason| ConfigError::Env {
        var,
        value: raw.to_string(),
        reason,
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(env_error("must be a positive integer")),
        Ok(n) => Ok(n),
        Err(_) => Err(env_error("not an integer")),
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| ConfigError::Env {
            var: PORT_ENV,
            value: raw.to_string(),
            reason: "port must be between 1 and 65535",
        })
}

/// Replace the port of a `host:port` address, keeping the host.
///
/// A unix socket bind is replaced by a TCP bind on all interfaces.
fn with_port(bind: &str, port: u16) -> String {
    if bind.starts_with("unix:") {
        return format!("0.0.0.0:{port}");
    }
    match bind.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => format!("{host}:{port}"),
        _ => format!("0.0.0.0:{port}"),
    }
}
