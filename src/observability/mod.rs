//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Launch configuration:
//!     → logging.rs (error log subscriber, level)
//!     → access_log.rs (access log template)
//!
//! Consumers:
//!     → stdout (access log), stderr (error log)
//!     → log aggregation of the hosting platform
//! ```
//!
//! # Design Decisions
//! - Structured logging through tracing
//! - Access log template is validated at load time, not on first request

pub mod access_log;
pub mod logging;

pub use access_log::{AccessLogFormat, AccessRecord};
pub use logging::init_logging;
