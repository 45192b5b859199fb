//! Request limits.
//!
//! # Responsibilities
//! - Cap the request line size
//! - Cap the header field count
//! - Cap the size of each header field
//!
//! # Design Decisions
//! - Limits are checked before the request is parsed further
//! - A zero size limit means unlimited
//! - A zero field count means the server maximum
//! - Over-long request lines answer 400, header violations answer 431

use crate::config::schema::LimitsConfig;

/// Largest request line the server accepts as a limit.
pub const MAX_REQUEST_LINE: usize = 8190;

/// Largest header count the server accepts as a limit.
pub const MAX_REQUEST_FIELDS: usize = 32768;

/// A request that exceeds a configured limit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitViolation {
    #[error("request line is {size} bytes, limit is {limit}")]
    RequestLineTooLong { size: usize, limit: usize },

    #[error("request has {count} header fields, limit is {limit}")]
    TooManyFields { count: usize, limit: usize },

    #[error("header field is {size} bytes, limit is {limit}")]
    FieldTooLarge { size: usize, limit: usize },
}

impl LimitViolation {
    /// HTTP status the server answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            LimitViolation::RequestLineTooLong { .. } => 400,
            LimitViolation::TooManyFields { .. } | LimitViolation::FieldTooLarge { .. } => 431,
        }
    }
}

/// Request caps resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    request_line: usize,
    fields: usize,
    field_size: usize,
}

impl RequestLimits {
    pub fn new(config: &LimitsConfig) -> Self {
        Self {
            request_line: config.limit_request_line,
            fields: match config.limit_request_fields {
                0 => MAX_REQUEST_FIELDS,
                n => n.min(MAX_REQUEST_FIELDS),
            },
            field_size: config.limit_request_field_size,
        }
    }

    pub fn check_request_line(&self, size: usize) -> Result<(), LimitViolation> {
        if self.request_line > 0 && size > self.request_line {
            return Err(LimitViolation::RequestLineTooLong {
                size,
                limit: self.request_line,
            });
        }
        Ok(())
    }

    pub fn check_field_count(&self, count: usize) -> Result<(), LimitViolation> {
        if count > self.fields {
            return Err(LimitViolation::TooManyFields {
                count,
                limit: self.fields,
            });
        }
        Ok(())
    }

    pub fn check_field_size(&self, size: usize) -> Result<(), LimitViolation> {
        if self.field_size > 0 && size > self.field_size {
            return Err(LimitViolation::FieldTooLarge {
                size,
                limit: self.field_size,
            });
        }
        Ok(())
    }

    /// Check a request head: the request line and `name: value` header pairs.
    ///
    /// A field's size counts the name, the separator and the value.
    pub fn check_head<'a, I>(&self, request_line: &str, headers: I) -> Result<(), LimitViolation>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.check_request_line(request_line.len())?;
        let mut count = 0;
        for (name, value) in headers {
            count += 1;
            self.check_field_count(count)?;
            self.check_field_size(name.len() + 2 + value.len())?;
        }
        Ok(())
    }
}
