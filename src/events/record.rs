//! # Log wire shape.
//!
//! [`LogRecord`] is the `{timestamp, level, message}` shape consumed by the
//! external log viewer. The timestamp is an ISO-8601 (RFC 3339) string and
//! the level serializes as `INFO` / `ERROR` / `DEBUG`; both are frozen for
//! compatibility with any existing consumer.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Verbose diagnostics (state transitions).
    Debug,
    /// Normal progress reporting.
    Info,
    /// Failures: task errors, spawn failures, controller faults.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One log line in the frozen wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// ISO-8601 (RFC 3339) timestamp.
    pub timestamp: String,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
}

impl LogRecord {
    /// Builds a record, formatting the timestamp as RFC 3339.
    pub fn new(at: SystemTime, level: LogLevel, message: String) -> Self {
        let timestamp = OffsetDateTime::from(at)
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("invalid-timestamp"));
        Self {
            timestamp,
            level,
            message,
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.timestamp, self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_rfc3339() {
        let rec = LogRecord::new(SystemTime::now(), LogLevel::Info, "hello".into());
        assert!(OffsetDateTime::parse(&rec.timestamp, &Rfc3339).is_ok());
    }

    #[test]
    fn levels_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&LogLevel::Info).unwrap(), "\"INFO\"");
        assert_eq!(serde_json::to_string(&LogLevel::Error).unwrap(), "\"ERROR\"");
        assert_eq!(serde_json::to_string(&LogLevel::Debug).unwrap(), "\"DEBUG\"");
    }

    #[test]
    fn wire_shape_is_frozen() {
        let rec = LogRecord::new(SystemTime::UNIX_EPOCH, LogLevel::Error, "boom".into());
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["timestamp"], "1970-01-01T00:00:00Z");
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["message"], "boom");
    }
}
