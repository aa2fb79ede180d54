//! IEW Audit - Log-to-audit bridge
//!
//! Provides:
//! - [`LogLevel`], [`LogRecord`]: Log records as seen by appenders
//! - [`Severity`]: Audit severity, mapped from log levels
//! - [`RootLogger`], [`AppenderLayer`]: Appender registry fed by `tracing`
//! - [`AuditAppender`]: Republishes qualifying records as [`AuditEvent`] messages
//! - [`SecurityContext`]: Current principal attached to each audit event
//! - [`init_tracing`]: Global subscriber setup from [`iew_core::config::LoggingConfig`]

pub mod appender;
pub mod event;
pub mod level;
pub mod logging;
pub mod registry;
pub mod security;
pub mod severity;

pub use appender::{AuditAppender, ContextEvent, DEFAULT_THRESHOLD};
pub use event::AuditEvent;
pub use level::{LogLevel, LogRecord, UnknownLevel};
pub use logging::init_tracing;
pub use registry::{Appender, AppenderLayer, LoggerRegistry, RootLogger};
pub use security::{NoPrincipal, Principal, PrincipalProvider, SecurityContext, SecurityScope};
pub use severity::Severity;
