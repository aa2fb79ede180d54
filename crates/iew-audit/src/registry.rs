//! Logger registry and the `tracing` bridge feeding it
//!
//! [`RootLogger`] holds the appenders that receive every log record.
//! [`AppenderLayer`] turns `tracing` events into [`LogRecord`]s and
//! dispatches them to a root logger.

use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::level::{LogLevel, LogRecord};

/// Receiver of log records
pub trait Appender: Send + Sync {
    /// Unique name within a registry
    fn name(&self) -> &str;

    /// Handles one record; must not panic or block
    fn append(&self, record: &LogRecord);
}

/// Registration of appenders with the logging root
///
/// Injectable so tests can substitute their own registry for the
/// process-wide one.
pub trait LoggerRegistry: Send + Sync {
    /// Registers an appender; returns false if the name is already taken
    fn add_appender(&self, appender: Arc<dyn Appender>) -> bool;

    /// Unregisters the appender with this name; returns false if none was registered
    fn remove_appender(&self, name: &str) -> bool;

    fn has_appender(&self, name: &str) -> bool;
}

/// Appender list guarded by a single lock
#[derive(Default)]
pub struct RootLogger {
    appenders: RwLock<Vec<Arc<dyn Appender>>>,
}

impl RootLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide root logger
    pub fn global() -> Arc<RootLogger> {
        static GLOBAL: OnceLock<Arc<RootLogger>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(RootLogger::new())))
    }

    /// Delivers `record` to every registered appender
    ///
    /// The appender list is copied first, so appenders may register or
    /// unregister while records are in flight.
    pub fn dispatch(&self, record: &LogRecord) {
        let appenders = self
            .appenders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for appender in appenders {
            appender.append(record);
        }
    }

    pub fn appender_names(&self) -> Vec<String> {
        self.appenders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }
}

impl LoggerRegistry for RootLogger {
    fn add_appender(&self, appender: Arc<dyn Appender>) -> bool {
        let mut appenders = self.appenders.write().unwrap_or_else(PoisonError::into_inner);
        if appenders.iter().any(|a| a.name() == appender.name()) {
            return false;
        }
        appenders.push(appender);
        true
    }

    fn remove_appender(&self, name: &str) -> bool {
        let mut appenders = self.appenders.write().unwrap_or_else(PoisonError::into_inner);
        let before = appenders.len();
        appenders.retain(|a| a.name() != name);
        appenders.len() != before
    }

    fn has_appender(&self, name: &str) -> bool {
        self.appenders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|a| a.name() == name)
    }
}

// ============================================================================
// tracing bridge
// ============================================================================

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Clears the dispatch flag even if an appender panics
struct DispatchGuard;

impl DispatchGuard {
    /// Returns `None` if this thread is already dispatching
    fn enter() -> Option<Self> {
        if DISPATCHING.with(|flag| flag.replace(true)) {
            None
        } else {
            Some(DispatchGuard)
        }
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(false));
    }
}

/// Collects the message and cause fields of an event
#[derive(Default)]
struct RecordVisitor {
    message: String,
    cause: Option<String>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "error" | "cause" => self.cause = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        if matches!(field.name(), "error" | "cause") {
            let mut rendered = value.to_string();
            let mut source = value.source();
            while let Some(inner) = source {
                rendered.push_str(": ");
                rendered.push_str(&inner.to_string());
                source = inner.source();
            }
            self.cause = Some(rendered);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            "error" | "cause" => self.cause = Some(format!("{:?}", value)),
            _ => {}
        }
    }
}

/// `tracing` layer forwarding every event to a [`RootLogger`]
///
/// Events raised by appenders while a record is being dispatched are not
/// forwarded again.
pub struct AppenderLayer {
    root: Arc<RootLogger>,
}

impl AppenderLayer {
    pub fn new(root: Arc<RootLogger>) -> Self {
        Self { root }
    }
}

impl<S: Subscriber> Layer<S> for AppenderLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let Some(_guard) = DispatchGuard::enter() else {
            return;
        };

        let metadata = event.metadata();
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let mut record = LogRecord::new(
            metadata.target(),
            LogLevel::from(metadata.level()),
            visitor.message,
        );
        if let Some(cause) = visitor.cause {
            record = record.with_cause(cause);
        }
        self.root.dispatch(&record);
    }
}
