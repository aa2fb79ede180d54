//! Audit appender
//!
//! Republishes qualifying log records as [`AuditEvent`] messages.
//!
//! ## Lifecycle
//!
//! The appender is active while it is registered with its
//! [`LoggerRegistry`]. Container lifecycle events drive registration:
//!
//! | Event                 | Inactive          | Active                              |
//! |-----------------------|-------------------|-------------------------------------|
//! | `Started`/`Refreshed` | register          | no-op                               |
//! | `Stopped`             | no-op             | unregister, drop the channel        |
//! | `Closed`              | no-op             | no-op                               |
//!
//! [`AuditAppender::destroy`] unregisters unconditionally. The hot path
//! ([`Appender::append`]) never fails: records below the threshold, with
//! an unmapped level, or without a configured channel are dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use iew_core::config::AuditConfig;
use iew_messaging::{Message, MessageChannel};

use crate::event::AuditEvent;
use crate::level::{LogLevel, LogRecord};
use crate::registry::{Appender, LoggerRegistry};
use crate::security::{PrincipalProvider, SecurityContext};
use crate::severity::Severity;

/// Threshold used when none is configured or the configured name is unknown
pub const DEFAULT_THRESHOLD: LogLevel = LogLevel::Info;

/// Application container lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextEvent {
    Started,
    Refreshed,
    Stopped,
    Closed,
}

type AuditChannel = Arc<dyn MessageChannel<AuditEvent>>;

/// Appender forwarding log records to an audit channel
pub struct AuditAppender {
    name: String,
    enabled: bool,
    threshold: RwLock<LogLevel>,
    channel: Mutex<Option<AuditChannel>>,
    lifecycle: Mutex<()>,
    registry: Arc<dyn LoggerRegistry>,
    principals: Arc<dyn PrincipalProvider>,
}

impl AuditAppender {
    /// Creates an inactive appender reading principals from the [`SecurityContext`]
    pub fn new(name: impl Into<String>, registry: Arc<dyn LoggerRegistry>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            threshold: RwLock::new(DEFAULT_THRESHOLD),
            channel: Mutex::new(None),
            lifecycle: Mutex::new(()),
            registry,
            principals: Arc::new(SecurityContext),
        }
    }

    /// Creates an appender from the `audit` configuration section
    ///
    /// A disabled appender ignores lifecycle events and never registers.
    pub fn from_config(config: &AuditConfig, registry: Arc<dyn LoggerRegistry>) -> Self {
        let appender = Self {
            enabled: config.enabled,
            ..Self::new(config.appender_name.clone(), registry)
        };
        appender.set_threshold(&config.threshold);
        appender
    }

    pub fn with_principal_provider(mut self, provider: Arc<dyn PrincipalProvider>) -> Self {
        self.principals = provider;
        self
    }

    /// Returns true while registered with the logger registry
    pub fn is_active(&self) -> bool {
        self.registry.has_appender(&self.name)
    }

    /// Reacts to a container lifecycle event
    pub fn on_application_event(self: &Arc<Self>, event: ContextEvent) {
        if !self.enabled {
            return;
        }

        let _lifecycle = lock(&self.lifecycle);
        let active = self.is_active();
        match event {
            ContextEvent::Started | ContextEvent::Refreshed if !active => {
                self.registry.add_appender(Arc::clone(self) as Arc<dyn Appender>);
                tracing::debug!(appender = %self.name, ?event, "Audit appender registered");
            }
            ContextEvent::Stopped if active => {
                self.registry.remove_appender(&self.name);
                *lock(&self.channel) = None;
                tracing::debug!(appender = %self.name, "Audit appender unregistered");
            }
            _ => {}
        }
    }

    /// Unregisters the appender regardless of its state
    pub fn destroy(&self) {
        let _lifecycle = lock(&self.lifecycle);
        self.registry.remove_appender(&self.name);
    }

    /// Minimum level forwarded, as its level name
    pub fn threshold(&self) -> String {
        self.threshold_level().to_string()
    }

    pub fn threshold_level(&self) -> LogLevel {
        *self.threshold.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the minimum level by name; unknown names select [`DEFAULT_THRESHOLD`]
    pub fn set_threshold(&self, level: &str) {
        let parsed = LogLevel::parse_or(level, DEFAULT_THRESHOLD);
        *self.threshold.write().unwrap_or_else(PoisonError::into_inner) = parsed;
    }

    /// Sets the channel audit events are published on
    pub fn set_channel(&self, channel: AuditChannel) {
        *lock(&self.channel) = Some(channel);
    }

    pub fn has_channel(&self) -> bool {
        lock(&self.channel).is_some()
    }
}

impl Appender for AuditAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&self, record: &LogRecord) {
        if !record.level().is_greater_or_equal(self.threshold_level()) {
            return;
        }
        let Some(severity) = Severity::from_log_level(record.level()) else {
            return;
        };

        let principal = self.principals.current_principal();
        let channel = lock(&self.channel).clone();
        if let Some(channel) = channel {
            let event = AuditEvent::from_record(record, principal, severity);
            if let Err(e) = channel.send(Message::new(event)) {
                tracing::trace!(appender = %self.name, error = %e, "Audit event dropped");
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
