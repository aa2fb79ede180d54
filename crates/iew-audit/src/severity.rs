//! Normalized audit severity

use serde::{Deserialize, Serialize};

use iew_core::domain::{I18nNamedEnum, NamedEnum};

use crate::level::LogLevel;

/// Importance of an audit event, independent of the logging backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Critical,
}

impl Severity {
    /// Maps a log level to a severity
    ///
    /// `Error` and `Fatal` both become `Critical`. The threshold-only
    /// levels `All` and `Off` have no severity; records carrying them are
    /// not audited.
    pub fn from_log_level(level: LogLevel) -> Option<Severity> {
        match level {
            LogLevel::Trace => Some(Severity::Trace),
            LogLevel::Debug => Some(Severity::Debug),
            LogLevel::Info => Some(Severity::Info),
            LogLevel::Warn => Some(Severity::Warn),
            LogLevel::Error | LogLevel::Fatal => Some(Severity::Critical),
            LogLevel::All | LogLevel::Off => None,
        }
    }
}

impl NamedEnum for Severity {
    fn name(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl I18nNamedEnum for Severity {
    fn name_key(&self) -> String {
        format!("audit.severity.{}", self.name().to_lowercase())
    }
}
