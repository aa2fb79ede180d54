//! Audit event payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::level::LogRecord;
use crate::security::Principal;
use crate::severity::Severity;

/// A significant application occurrence derived from a log record
///
/// Immutable once built. The source is kept as plain text so the event
/// survives a trip through a message store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    source: String,
    timestamp: DateTime<Utc>,
    principal: Option<Principal>,
    severity: Severity,
    message: String,
    cause: Option<String>,
    synchronous: bool,
}

impl AuditEvent {
    pub fn new(
        source: impl Into<String>,
        timestamp: DateTime<Utc>,
        principal: Option<Principal>,
        severity: Severity,
        message: impl Into<String>,
        cause: Option<String>,
    ) -> Self {
        Self {
            source: source.into(),
            timestamp,
            principal,
            severity,
            message: message.into(),
            cause,
            synchronous: false,
        }
    }

    /// Builds the event for a log record that passed the appender's filters
    pub fn from_record(record: &LogRecord, principal: Option<Principal>, severity: Severity) -> Self {
        Self::new(
            record.logger(),
            record.timestamp(),
            principal,
            severity,
            record.message(),
            record.cause().map(str::to_string),
        )
    }

    /// Name of the logger that produced the record
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// Audit events are always delivered asynchronously
    pub fn is_synchronous(&self) -> bool {
        self.synchronous
    }
}
