//! Access log line formatting.
//!
//! The template uses `%(name)s` atoms:
//!
//! | Atom | Value |
//! |------|-------|
//! | `h` | remote address |
//! | `l` | `-` |
//! | `u` | user name |
//! | `t` | date of the request |
//! | `r` | status line (`GET /path?q HTTP/1.1`) |
//! | `m` | request method |
//! | `U` | URL path without query |
//! | `q` | query string |
//! | `H` | protocol |
//! | `s` | status |
//! | `B` | response length |
//! | `b` | response length or `-` |
//! | `f` | referer |
//! | `a` | user agent |
//! | `T` | request time in seconds |
//! | `M` | request time in milliseconds |
//! | `D` | request time in microseconds |
//! | `L` | request time in decimal seconds |
//! | `p` | process id |
//! | `{header}i` | request header |
//! | `{header}o` | response header |
//!
//! Unknown atoms render as `-`.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local};

/// Error parsing an access log template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessLogError {
    #[error("unterminated atom at byte {0}")]
    Unterminated(usize),

    #[error("empty atom at byte {0}")]
    EmptyAtom(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Atom(String),
    RequestHeader(String),
    ResponseHeader(String),
}

/// A parsed access log template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogFormat {
    segments: Vec<Segment>,
}

impl AccessLogFormat {
    pub fn parse(template: &str) -> Result<Self, AccessLogError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;
        let mut offset = 0;

        while let Some(pos) = rest.find('%') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(tail) = after.strip_prefix('%') {
                literal.push('%');
                offset += pos + 2;
                rest = tail;
                continue;
            }

            let Some(body) = after.strip_prefix('(') else {
                literal.push('%');
                offset += pos + 1;
                rest = after;
                continue;
            };

            let end = body
                .find(")s")
                .ok_or(AccessLogError::Unterminated(offset + pos))?;
            let name = &body[..end];
            if name.is_empty() {
                return Err(AccessLogError::EmptyAtom(offset + pos));
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(classify(name));

            let consumed = pos + 2 + end + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Render one access log line.
    pub fn render(&self, record: &AccessRecord) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Atom(name) => line.push_str(&record.atom(name)),
                Segment::RequestHeader(name) => {
                    line.push_str(header(&record.request_headers, name).unwrap_or("-"))
                }
                Segment::ResponseHeader(name) => {
                    line.push_str(header(&record.response_headers, name).unwrap_or("-"))
                }
            }
        }
        line
    }
}

fn classify(name: &str) -> Segment {
    if let Some(inner) = name.strip_prefix('{') {
        if let Some(header) = inner.strip_suffix("}i") {
            return Segment::RequestHeader(header.to_string());
        }
        if let Some(header) = inner.strip_suffix("}o") {
            return Segment::ResponseHeader(header.to_string());
        }
    }
    Segment::Atom(name.to_string())
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// What the server knows about one finished request.
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub remote_addr: String,
    pub user: Option<String>,
    pub timestamp: DateTime<FixedOffset>,
    pub method: String,
    pub path: String,
    pub query: String,
    pub protocol: String,
    pub status: u16,
    pub response_length: Option<u64>,
    pub request_time: Duration,
    pub request_headers: Vec<(String, String)>,
    pub response_headers: Vec<(String, String)>,
    pub pid: u32,
}

impl AccessRecord {
    /// A record stamped with the current local time and process id.
    pub fn new(
        remote_addr: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        status: u16,
    ) -> Self {
        Self {
            remote_addr: remote_addr.into(),
            user: None,
            timestamp: Local::now().into(),
            method: method.into(),
            path: path.into(),
            query: String::new(),
            protocol: "HTTP/1.1".to_string(),
            status,
            response_length: None,
            request_time: Duration::ZERO,
            request_headers: Vec::new(),
            response_headers: Vec::new(),
            pid: std::process::id(),
        }
    }

    fn request_line(&self) -> String {
        if self.query.is_empty() {
            format!("{} {} {}", self.method, self.path, self.protocol)
        } else {
            format!("{} {}?{} {}", self.method, self.path, self.query, self.protocol)
        }
    }

    fn atom(&self, name: &str) -> String {
        match name {
            "h" => self.remote_addr.clone(),
            "l" => "-".to_string(),
            "u" => self.user.clone().unwrap_or_else(|| "-".to_string()),
            "t" => self.timestamp.format("[%d/%b/%Y:%H:%M:%S %z]").to_string(),
            "r" => self.request_line(),
            "m" => self.method.clone(),
            "U" => self.path.clone(),
            "q" => self.query.clone(),
            "H" => self.protocol.clone(),
            "s" => self.status.to_string(),
            "B" => self.response_length.unwrap_or(0).to_string(),
            "b" => self
                .response_length
                .map(|len| len.to_string())
                .unwrap_or_else(|| "-".to_string()),
            "f" => header(&self.request_headers, "referer").unwrap_or("-").to_string(),
            "a" => header(&self.request_headers, "user-agent")
                .unwrap_or("-")
                .to_string(),
            "T" => self.request_time.as_secs().to_string(),
            "M" => self.request_time.as_millis().to_string(),
            "D" => self.request_time.as_micros().to_string(),
            "L" => format!("{:.6}", self.request_time.as_secs_f64()),
            "p" => format!("<{}>", self.pid),
            _ => "-".to_string(),
        }
    }
}
