//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (workers > 0, limits within server bounds)
//! - Check the bind address and log templates are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LaunchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is handed to the server

use std::net::SocketAddr;

use crate::config::schema::LaunchConfig;
use crate::observability::access_log::AccessLogFormat;
use crate::observability::logging::parse_level;
use crate::security::limits::{MAX_REQUEST_FIELDS, MAX_REQUEST_LINE};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a positive integer")]
    NotPositive { field: &'static str },

    #[error("{field} is {value}, maximum is {max}")]
    TooLarge {
        field: &'static str,
        value: usize,
        max: usize,
    },

    #[error("max_requests_jitter ({jitter}) must be less than max_requests ({max_requests})")]
    JitterTooLarge { jitter: u64, max_requests: u64 },

    #[error("invalid bind address '{0}'")]
    InvalidBind(String),

    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),

    #[error("invalid access_log_format: {0}")]
    InvalidAccessLogFormat(String),

    #[error("umask {0:o} is not a valid file mode mask")]
    InvalidUmask(u32),
}

/// Validate a resolved configuration, collecting every problem.
pub fn validate_config(config: &LaunchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.workers.workers == 0 {
        errors.push(ValidationError::NotPositive { field: "workers" });
    }
    if config.workers.threads == 0 {
        errors.push(ValidationError::NotPositive { field: "threads" });
    }
    if config.workers.worker_connections == 0 {
        errors.push(ValidationError::NotPositive {
            field: "worker_connections",
        });
    }
    if config.server.backlog == 0 {
        errors.push(ValidationError::NotPositive { field: "backlog" });
    }

    let recycling = &config.recycling;
    if recycling.max_requests > 0 && recycling.max_requests_jitter >= recycling.max_requests {
        errors.push(ValidationError::JitterTooLarge {
            jitter: recycling.max_requests_jitter,
            max_requests: recycling.max_requests,
        });
    }

    if !is_valid_bind(&config.server.bind) {
        errors.push(ValidationError::InvalidBind(config.server.bind.clone()));
    }

    if config.server.umask > 0o777 {
        errors.push(ValidationError::InvalidUmask(config.server.umask));
    }

    let limits = &config.limits;
    if limits.limit_request_line > MAX_REQUEST_LINE {
        errors.push(ValidationError::TooLarge {
            field: "limit_request_line",
            value: limits.limit_request_line,
            max: MAX_REQUEST_LINE,
        });
    }
    if limits.limit_request_fields > MAX_REQUEST_FIELDS {
        errors.push(ValidationError::TooLarge {
            field: "limit_request_fields",
            value: limits.limit_request_fields,
            max: MAX_REQUEST_FIELDS,
        });
    }

    if parse_level(&config.logging.loglevel).is_none() {
        errors.push(ValidationError::InvalidLogLevel(
            config.logging.loglevel.clone(),
        ));
    }
    if let Err(e) = AccessLogFormat::parse(&config.logging.access_log_format) {
        errors.push(ValidationError::InvalidAccessLogFormat(e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accepts `ip:port`, `host:port` and `unix:/path` addresses.
fn is_valid_bind(bind: &str) -> bool {
    if bind.parse::<SocketAddr>().is_ok() {
        return true;
    }
    if let Some(path) = bind.strip_prefix("unix:") {
        return !path.is_empty();
    }
    match bind.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty()
                && !host.contains(&['[', ']', ' '][..])
                && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&LaunchConfig::for_host(2)), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = LaunchConfig::for_host(2);
        config.workers.workers = 0;
        config.workers.threads = 0;
        config.server.bind = "nowhere".to_string();
        config.logging.loglevel = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::NotPositive { field: "workers" },
                ValidationError::NotPositive { field: "threads" },
                ValidationError::InvalidBind("nowhere".to_string()),
                ValidationError::InvalidLogLevel("loud".to_string()),
            ]
        );
    }

    #[test]
    fn test_bind_forms() {
        assert!(is_valid_bind("0.0.0.0:5000"));
        assert!(is_valid_bind("[::]:5000"));
        assert!(is_valid_bind("localhost:8000"));
        assert!(is_valid_bind("unix:/run/app.sock"));
        assert!(!is_valid_bind("localhost"));
        assert!(!is_valid_bind("localhost:http"));
        assert!(!is_valid_bind(":5000"));
        assert!(!is_valid_bind("unix:"));
    }

    #[test]
    fn test_jitter_must_be_below_max_requests() {
        let mut config = LaunchConfig::for_host(2);
        config.recycling.max_requests = 250;
        config.recycling.max_requests_jitter = 250;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::JitterTooLarge {
                jitter: 250,
                max_requests: 250
            }]
        );

        config.recycling.max_requests = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_limits_bounded_by_server_maximums() {
        let mut config = LaunchConfig::for_host(2);
        config.limits.limit_request_line = 8191;
        config.limits.limit_request_fields = 40000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "limit_request_line is 8191, maximum is 8190"
        );
    }

    #[test]
    fn test_bad_access_log_format() {
        let mut config = LaunchConfig::for_host(2);
        config.logging.access_log_format = "%(h)s %(t".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::InvalidAccessLogFormat(_)
        ));
    }
}
