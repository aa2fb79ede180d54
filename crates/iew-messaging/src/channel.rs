//! Channel contracts and the in-process channel implementations
//!
//! Subscribers are identified by the allocation their `Arc` points to, so
//! unsubscribing needs a clone of the same `Arc` that was subscribed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc::UnboundedSender;

use crate::message::Message;
use crate::MessagingError;

/// Anything messages can be sent to
pub trait MessageChannel<T>: Send + Sync {
    /// Sends a message without waiting for it to be consumed
    fn send(&self, message: Message<T>) -> Result<(), MessagingError>;
}

/// Consumer of messages delivered by a [`SubscribableChannel`]
pub trait MessageHandler<T>: Send + Sync {
    fn handle_message(&self, message: &Message<T>) -> Result<(), MessagingError>;
}

/// A channel that pushes messages to subscribed handlers
pub trait SubscribableChannel<T>: MessageChannel<T> {
    /// Adds a handler; returns false if it was already subscribed
    fn subscribe(&self, handler: Arc<dyn MessageHandler<T>>) -> bool;

    /// Removes a handler; returns false if it was not subscribed
    fn unsubscribe(&self, handler: &Arc<dyn MessageHandler<T>>) -> bool;

    fn subscriber_count(&self) -> usize;
}

fn same_handler<T>(a: &Arc<dyn MessageHandler<T>>, b: &Arc<dyn MessageHandler<T>>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Ordered handler list shared by the subscribable channels
struct Subscribers<T> {
    handlers: RwLock<Vec<Arc<dyn MessageHandler<T>>>>,
}

impl<T> Subscribers<T> {
    fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    fn add(&self, handler: Arc<dyn MessageHandler<T>>) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        if handlers.iter().any(|h| same_handler(h, &handler)) {
            return false;
        }
        handlers.push(handler);
        true
    }

    fn remove(&self, handler: &Arc<dyn MessageHandler<T>>) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|h| !same_handler(h, handler));
        handlers.len() != before
    }

    fn len(&self) -> usize {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Copies the handler list so handlers run without the lock held
    fn snapshot(&self) -> Vec<Arc<dyn MessageHandler<T>>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ============================================================================
// DirectChannel
// ============================================================================

/// Point-to-point channel
///
/// Each message goes to exactly one subscriber, chosen round-robin.
/// Sending without subscribers fails with [`MessagingError::NoSubscribers`].
pub struct DirectChannel<T> {
    name: String,
    subscribers: Subscribers<T>,
    next: AtomicUsize,
}

impl<T> DirectChannel<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: Subscribers::new(),
            next: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> MessageChannel<T> for DirectChannel<T> {
    fn send(&self, message: Message<T>) -> Result<(), MessagingError> {
        let handlers = self.subscribers.snapshot();
        if handlers.is_empty() {
            return Err(MessagingError::NoSubscribers {
                channel: self.name.clone(),
            });
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % handlers.len();
        handlers[index].handle_message(&message)
    }
}

impl<T> SubscribableChannel<T> for DirectChannel<T> {
    fn subscribe(&self, handler: Arc<dyn MessageHandler<T>>) -> bool {
        let added = self.subscribers.add(handler);
        if added {
            tracing::debug!(channel = %self.name, subscribers = self.subscribers.len(), "Subscriber added");
        }
        added
    }

    fn unsubscribe(&self, handler: &Arc<dyn MessageHandler<T>>) -> bool {
        let removed = self.subscribers.remove(handler);
        if removed {
            tracing::debug!(channel = %self.name, subscribers = self.subscribers.len(), "Subscriber removed");
        }
        removed
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

// ============================================================================
// PublishSubscribeChannel
// ============================================================================

/// Broadcast channel
///
/// Every subscriber receives every message. Sending without subscribers
/// succeeds. If handlers fail, the remaining ones still run and the first
/// failure is returned.
pub struct PublishSubscribeChannel<T> {
    name: String,
    subscribers: Subscribers<T>,
}

impl<T> PublishSubscribeChannel<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: Subscribers::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> MessageChannel<T> for PublishSubscribeChannel<T> {
    fn send(&self, message: Message<T>) -> Result<(), MessagingError> {
        let mut first_error = None;
        for handler in self.subscribers.snapshot() {
            if let Err(e) = handler.handle_message(&message) {
                tracing::debug!(channel = %self.name, error = %e, "Subscriber failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl<T> SubscribableChannel<T> for PublishSubscribeChannel<T> {
    fn subscribe(&self, handler: Arc<dyn MessageHandler<T>>) -> bool {
        self.subscribers.add(handler)
    }

    fn unsubscribe(&self, handler: &Arc<dyn MessageHandler<T>>) -> bool {
        self.subscribers.remove(handler)
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

// ============================================================================
// Queue channel
// ============================================================================

/// An unbounded tokio sender is a queue channel; the receiver consumes
/// messages asynchronously.
impl<T: Send> MessageChannel<T> for UnboundedSender<Message<T>> {
    fn send(&self, message: Message<T>) -> Result<(), MessagingError> {
        UnboundedSender::send(self, message).map_err(|_| MessagingError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Handler recording the payloads it saw
    struct Recorder {
        seen: Mutex<Vec<u32>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<u32> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl MessageHandler<u32> for Recorder {
        fn handle_message(&self, message: &Message<u32>) -> Result<(), MessagingError> {
            self.seen.lock().unwrap().push(*message.payload());
            Ok(())
        }
    }

    struct Failing;

    impl MessageHandler<u32> for Failing {
        fn handle_message(&self, _message: &Message<u32>) -> Result<(), MessagingError> {
            Err(MessagingError::Handler("boom".to_string()))
        }
    }

    #[test]
    fn test_direct_without_subscribers_fails() {
        let channel = DirectChannel::<u32>::new("audit");
        assert_eq!(
            channel.send(Message::new(1)),
            Err(MessagingError::NoSubscribers {
                channel: "audit".to_string()
            })
        );
    }

    #[test]
    fn test_direct_round_robin() {
        let channel = DirectChannel::new("direct");
        let a = Recorder::new();
        let b = Recorder::new();
        channel.subscribe(a.clone());
        channel.subscribe(b.clone());

        for i in 0..4 {
            channel.send(Message::new(i)).unwrap();
        }
        assert_eq!(a.seen(), vec![0, 2]);
        assert_eq!(b.seen(), vec![1, 3]);
    }

    #[test]
    fn test_subscribe_is_idempotent_per_handler() {
        let channel = DirectChannel::new("direct");
        let handler: Arc<dyn MessageHandler<u32>> = Recorder::new();

        assert!(channel.subscribe(handler.clone()));
        assert!(!channel.subscribe(handler.clone()));
        assert_eq!(channel.subscriber_count(), 1);

        assert!(channel.unsubscribe(&handler));
        assert!(!channel.unsubscribe(&handler));
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_subscribe_broadcasts() {
        let channel = PublishSubscribeChannel::new("events");
        let a = Recorder::new();
        let b = Recorder::new();
        channel.subscribe(a.clone());
        channel.subscribe(b.clone());

        channel.send(Message::new(7)).unwrap();
        assert_eq!(a.seen(), vec![7]);
        assert_eq!(b.seen(), vec![7]);
    }

    #[test]
    fn test_publish_subscribe_without_subscribers_succeeds() {
        let channel = PublishSubscribeChannel::<u32>::new("events");
        assert!(channel.send(Message::new(1)).is_ok());
    }

    #[test]
    fn test_publish_subscribe_reports_failure_after_delivering() {
        let channel = PublishSubscribeChannel::new("events");
        let recorder = Recorder::new();
        channel.subscribe(Arc::new(Failing));
        channel.subscribe(recorder.clone());

        assert!(matches!(
            channel.send(Message::new(3)),
            Err(MessagingError::Handler(_))
        ));
        assert_eq!(recorder.seen(), vec![3]);
    }

    #[tokio::test]
    async fn test_unbounded_sender_is_a_channel() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Message<u32>>();
        let channel: Arc<dyn MessageChannel<u32>> = Arc::new(tx);

        channel.send(Message::new(5)).unwrap();
        assert_eq!(*rx.recv().await.unwrap().payload(), 5);

        drop(rx);
        assert_eq!(channel.send(Message::new(6)), Err(MessagingError::Closed));
    }
}
