//! Null message subscriber
//!
//! Subscribes to channels that must always have a consumer (a
//! [`crate::DirectChannel`] refuses messages otherwise) and discards
//! everything it receives.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::channel::{MessageHandler, SubscribableChannel};
use crate::message::Message;
use crate::MessagingError;

type Channels<T> = Vec<Arc<dyn SubscribableChannel<T>>>;

/// Subscriber that accepts and drops every message
///
/// Lifecycle: assign channels, then [`initialize`](Self::initialize) to
/// subscribe and [`destroy`](Self::destroy) to unsubscribe. Reassigning
/// channels unsubscribes from the previous set; the new set is only
/// subscribed by the next `initialize`.
pub struct NullMessageSubscriber<T> {
    channels: Mutex<Option<Channels<T>>>,
}

impl<T: 'static> NullMessageSubscriber<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            channels: Mutex::new(None),
        })
    }

    /// Assigns a single channel
    pub fn set_message_channel(self: &Arc<Self>, channel: Arc<dyn SubscribableChannel<T>>) {
        self.set_message_channels(vec![channel]);
    }

    /// Assigns the channel set, unsubscribing from the previous one
    pub fn set_message_channels(self: &Arc<Self>, channels: Vec<Arc<dyn SubscribableChannel<T>>>) {
        let handler = self.as_handler();
        let mut current = self.lock();
        if let Some(previous) = current.take() {
            for channel in &previous {
                channel.unsubscribe(&handler);
            }
        }
        *current = Some(channels);
    }

    /// Subscribes to every assigned channel
    ///
    /// # Errors
    ///
    /// Returns `MessagingError::NotConfigured` if no channel set was ever assigned.
    pub fn initialize(self: &Arc<Self>) -> Result<(), MessagingError> {
        let handler = self.as_handler();
        let current = self.lock();
        let channels = current.as_ref().ok_or(MessagingError::NotConfigured)?;
        for channel in channels {
            channel.subscribe(Arc::clone(&handler));
        }
        tracing::debug!(channels = channels.len(), "Null subscriber initialized");
        Ok(())
    }

    /// Unsubscribes from every assigned channel
    pub fn destroy(self: &Arc<Self>) {
        let handler = self.as_handler();
        for channel in self.lock().iter().flatten() {
            channel.unsubscribe(&handler);
        }
    }

    /// Number of assigned channels
    pub fn channel_count(&self) -> usize {
        self.lock().as_ref().map_or(0, Vec::len)
    }

    fn as_handler(self: &Arc<Self>) -> Arc<dyn MessageHandler<T>> {
        Arc::clone(self) as Arc<dyn MessageHandler<T>>
    }

    fn lock(&self) -> MutexGuard<'_, Option<Channels<T>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> MessageHandler<T> for NullMessageSubscriber<T> {
    fn handle_message(&self, _message: &Message<T>) -> Result<(), MessagingError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{DirectChannel, PublishSubscribeChannel};

    #[test]
    fn test_initialize_without_channels_fails() {
        let subscriber = NullMessageSubscriber::<u32>::new();
        assert_eq!(subscriber.initialize(), Err(MessagingError::NotConfigured));
    }

    #[test]
    fn test_initialize_with_empty_set_succeeds() {
        let subscriber = NullMessageSubscriber::<u32>::new();
        subscriber.set_message_channels(Vec::new());
        assert!(subscriber.initialize().is_ok());
        assert_eq!(subscriber.channel_count(), 0);
    }

    #[test]
    fn test_initialize_and_destroy() {
        let a = Arc::new(DirectChannel::<u32>::new("a"));
        let b = Arc::new(PublishSubscribeChannel::<u32>::new("b"));
        let subscriber = NullMessageSubscriber::new();
        subscriber.set_message_channels(vec![
            a.clone() as Arc<dyn SubscribableChannel<u32>>,
            b.clone(),
        ]);

        subscriber.initialize().unwrap();
        assert_eq!(a.subscriber_count(), 1);
        assert_eq!(b.subscriber_count(), 1);

        subscriber.destroy();
        assert_eq!(a.subscriber_count(), 0);
        assert_eq!(b.subscriber_count(), 0);
    }

    #[test]
    fn test_reassign_unsubscribes_previous_set() {
        let old = Arc::new(DirectChannel::<u32>::new("old"));
        let new = Arc::new(DirectChannel::<u32>::new("new"));
        let subscriber = NullMessageSubscriber::new();

        subscriber.set_message_channel(old.clone());
        subscriber.initialize().unwrap();
        assert_eq!(old.subscriber_count(), 1);

        subscriber.set_message_channel(new.clone());
        assert_eq!(old.subscriber_count(), 0);
        assert_eq!(new.subscriber_count(), 0);

        subscriber.initialize().unwrap();
        assert_eq!(new.subscriber_count(), 1);
    }

    #[test]
    fn test_handle_message_discards() {
        let subscriber = NullMessageSubscriber::<String>::new();
        assert!(subscriber
            .handle_message(&Message::new("ignored".to_string()))
            .is_ok());
    }
}
