//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! host defaults (CPU count)
//!     → loader.rs (optional TOML file)
//!     → loader.rs (WEB_CONCURRENCY / PORT overrides)
//!     → validation.rs (semantic checks)
//!     → LaunchConfig (validated, immutable)
//!     → handed to the application server at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start and never reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::LaunchConfig;
pub use schema::LimitsConfig;
pub use schema::LoggingConfig;
pub use schema::WorkerConfig;
