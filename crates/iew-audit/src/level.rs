//! Log levels and log records as seen by appenders

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown level name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown log level: {0}")]
pub struct UnknownLevel(pub String);

/// Logging level, ordered from most verbose to fully silent
///
/// `All` and `Off` only make sense as thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    All,
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Off,
}

impl LogLevel {
    /// Parses a level name ignoring case, falling back to `default`
    pub fn parse_or(text: &str, default: LogLevel) -> LogLevel {
        text.parse().unwrap_or(default)
    }

    /// Returns true if this level is at least as severe as `threshold`
    pub fn is_greater_or_equal(self, threshold: LogLevel) -> bool {
        self >= threshold
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::All => "ALL",
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Off => "OFF",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(LogLevel::All),
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            "OFF" => Ok(LogLevel::Off),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

impl From<&tracing::Level> for LogLevel {
    fn from(level: &tracing::Level) -> Self {
        if *level == tracing::Level::TRACE {
            LogLevel::Trace
        } else if *level == tracing::Level::DEBUG {
            LogLevel::Debug
        } else if *level == tracing::Level::INFO {
            LogLevel::Info
        } else if *level == tracing::Level::WARN {
            LogLevel::Warn
        } else {
            LogLevel::Error
        }
    }
}

/// One log record delivered to appenders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    logger: String,
    level: LogLevel,
    timestamp: DateTime<Utc>,
    message: String,
    cause: Option<String>,
}

impl LogRecord {
    /// Creates a record stamped with the current time
    pub fn new(logger: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger: logger.into(),
            level,
            timestamp: Utc::now(),
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches the rendered error that caused this record
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Name of the logger (the `tracing` target)
    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(LogLevel::All < LogLevel::Trace);
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Error < LogLevel::Fatal);
        assert!(LogLevel::Fatal < LogLevel::Off);
    }

    #[test]
    fn test_is_greater_or_equal() {
        assert!(LogLevel::Warn.is_greater_or_equal(LogLevel::Info));
        assert!(LogLevel::Info.is_greater_or_equal(LogLevel::Info));
        assert!(!LogLevel::Debug.is_greater_or_equal(LogLevel::Info));
    }

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(" Fatal ".parse::<LogLevel>(), Ok(LogLevel::Fatal));
        assert_eq!(
            "loud".parse::<LogLevel>(),
            Err(UnknownLevel("loud".to_string()))
        );
    }

    #[test]
    fn test_parse_or_falls_back() {
        assert_eq!(LogLevel::parse_or("error", LogLevel::Info), LogLevel::Error);
        assert_eq!(LogLevel::parse_or("nonsense", LogLevel::Info), LogLevel::Info);
        assert_eq!(LogLevel::parse_or("", LogLevel::Warn), LogLevel::Warn);
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for level in [LogLevel::All, LogLevel::Info, LogLevel::Off] {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
    }

    #[test]
    fn test_from_tracing_level() {
        assert_eq!(LogLevel::from(&tracing::Level::TRACE), LogLevel::Trace);
        assert_eq!(LogLevel::from(&tracing::Level::ERROR), LogLevel::Error);
    }

    #[test]
    fn test_record_builder() {
        let record = LogRecord::new("iew_store::dao", LogLevel::Error, "write failed")
            .with_cause("disk full");
        assert_eq!(record.logger(), "iew_store::dao");
        assert_eq!(record.level(), LogLevel::Error);
        assert_eq!(record.message(), "write failed");
        assert_eq!(record.cause(), Some("disk full"));
    }
}
