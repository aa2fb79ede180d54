//! End-to-end tests: `tracing` event -> appender layer -> audit channel

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tracing_subscriber::layer::SubscriberExt;

use iew_audit::{
    AppenderLayer, AuditAppender, AuditEvent, ContextEvent, Principal, RootLogger,
    SecurityContext, Severity,
};
use iew_core::config::ConfigBuilder;
use iew_messaging::{
    DirectChannel, Message, MessageHandler, MessagingError, NullMessageSubscriber,
    PublishSubscribeChannel, SubscribableChannel,
};

// ============================================================================
// Test helpers
// ============================================================================

struct Pipeline {
    root: Arc<RootLogger>,
    appender: Arc<AuditAppender>,
    rx: UnboundedReceiver<Message<AuditEvent>>,
}

fn pipeline() -> Pipeline {
    let root = Arc::new(RootLogger::new());
    let appender = Arc::new(AuditAppender::new("audit", root.clone()));
    let (tx, rx) = unbounded_channel::<Message<AuditEvent>>();
    appender.set_channel(Arc::new(tx));
    appender.on_application_event(ContextEvent::Started);
    Pipeline { root, appender, rx }
}

/// Runs `f` with a subscriber that only feeds `root`
fn with_layer(root: &Arc<RootLogger>, f: impl FnOnce()) {
    let subscriber = tracing_subscriber::registry().with(AppenderLayer::new(root.clone()));
    tracing::subscriber::with_default(subscriber, f);
}

fn drain(rx: &mut UnboundedReceiver<Message<AuditEvent>>) -> Vec<AuditEvent> {
    let mut events = Vec::new();
    while let Ok(message) = rx.try_recv() {
        events.push(message.into_payload());
    }
    events
}

struct Collecting {
    events: Mutex<Vec<AuditEvent>>,
}

impl MessageHandler<AuditEvent> for Collecting {
    fn handle_message(&self, message: &Message<AuditEvent>) -> Result<(), MessagingError> {
        self.events.lock().unwrap().push(message.payload().clone());
        Ok(())
    }
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_tracing_events_become_audit_events() {
    let mut p = pipeline();

    with_layer(&p.root, || {
        tracing::debug!("below threshold");
        tracing::info!(target: "iew_store::dao", "account saved");
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        tracing::error!(target: "iew_store::pool", error = %err, "write failed");
    });

    let events = drain(&mut p.rx);
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].source(), "iew_store::dao");
    assert_eq!(events[0].severity(), Severity::Info);
    assert_eq!(events[0].message(), "account saved");
    assert!(events[0].principal().is_none());

    assert_eq!(events[1].severity(), Severity::Critical);
    assert_eq!(events[1].cause(), Some("disk full"));
}

#[test]
fn test_principal_is_attached() {
    let mut p = pipeline();

    with_layer(&p.root, || {
        let _scope = SecurityContext::enter(Principal::new("alice").with_authorities(["ROLE_ADMIN"]));
        tracing::warn!("password changed");
    });

    let events = drain(&mut p.rx);
    assert_eq!(events.len(), 1);
    let principal = events[0].principal().unwrap();
    assert_eq!(principal.name(), "alice");
    assert_eq!(principal.authorities(), &["ROLE_ADMIN"]);
}

#[test]
fn test_threshold_filters_records() {
    let mut p = pipeline();
    p.appender.set_threshold("ERROR");

    with_layer(&p.root, || {
        tracing::info!("ignored");
        tracing::warn!("ignored too");
        tracing::error!("kept");
    });

    let events = drain(&mut p.rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message(), "kept");
}

#[test]
fn test_stop_and_restart() {
    let mut p = pipeline();

    p.appender.on_application_event(ContextEvent::Stopped);
    with_layer(&p.root, || tracing::error!("while stopped"));
    assert!(drain(&mut p.rx).is_empty());

    // Stopping drops the channel, so a restart needs a new one
    let (tx, mut rx) = unbounded_channel::<Message<AuditEvent>>();
    p.appender.set_channel(Arc::new(tx));
    p.appender.on_application_event(ContextEvent::Started);
    with_layer(&p.root, || tracing::error!("after restart"));

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message(), "after restart");
}

#[test]
fn test_configured_appender_on_publish_subscribe_channel() {
    let config = ConfigBuilder::new()
        .audit_appender_name("audit-bridge")
        .audit_threshold("warn")
        .build();
    let root = Arc::new(RootLogger::new());
    let appender = Arc::new(AuditAppender::from_config(&config.audit, root.clone()));

    let channel = Arc::new(PublishSubscribeChannel::<AuditEvent>::new("auditEvents"));
    let collector = Arc::new(Collecting {
        events: Mutex::new(Vec::new()),
    });
    channel.subscribe(collector.clone());
    appender.set_channel(channel);
    appender.on_application_event(ContextEvent::Refreshed);
    assert_eq!(root.appender_names(), vec!["audit-bridge"]);

    with_layer(&root, || {
        tracing::info!("filtered");
        tracing::warn!("delivered");
    });

    let events = collector.events.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity(), Severity::Warn);
}

#[test]
fn test_direct_channel_with_null_subscriber_swallows_events() {
    let root = Arc::new(RootLogger::new());
    let appender = Arc::new(AuditAppender::new("audit", root.clone()));
    let channel = Arc::new(DirectChannel::<AuditEvent>::new("auditEvents"));
    let sink = NullMessageSubscriber::new();
    sink.set_message_channel(channel.clone() as Arc<dyn SubscribableChannel<AuditEvent>>);
    sink.initialize().unwrap();

    appender.set_channel(channel.clone());
    appender.on_application_event(ContextEvent::Started);
    with_layer(&root, || tracing::error!("discarded"));

    assert_eq!(channel.subscriber_count(), 1);
    assert!(appender.is_active());
}
