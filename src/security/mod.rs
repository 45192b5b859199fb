//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (checked by the application server):
//!     → limits.rs (request line size, header count, header size)
//!     → forwarded.rs (is the peer allowed to set X-Forwarded-*)
//!     → Pass to the application
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any limit violation
//! - Forwarding trust is explicit; `*` assumes a trusted upstream proxy

pub mod forwarded;
pub mod limits;

pub use forwarded::TrustedProxies;
pub use limits::{LimitViolation, RequestLimits};
