//! IEW Messaging - Message channels and subscribers
//!
//! Provides:
//! - [`Message`]: Payload plus immutable headers (id, timestamp)
//! - [`MessageChannel`], [`SubscribableChannel`], [`MessageHandler`]: Channel contracts
//! - [`DirectChannel`]: Point-to-point dispatch, round-robin over subscribers
//! - [`PublishSubscribeChannel`]: Broadcast to every subscriber
//! - `tokio::sync::mpsc::UnboundedSender` as a queue channel for async consumers
//! - [`NullMessageSubscriber`]: Subscriber that accepts and discards messages
//!
//! Sending is synchronous and never blocks on a consumer, so channels can be
//! used from inside a `tracing` layer.

pub mod channel;
pub mod message;
pub mod subscriber;

pub use channel::{
    DirectChannel, MessageChannel, MessageHandler, PublishSubscribeChannel, SubscribableChannel,
};
pub use message::{Message, MessageHeaders};
pub use subscriber::NullMessageSubscriber;

/// Errors raised while sending or handling messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessagingError {
    /// A point-to-point channel had nobody to deliver to
    #[error("Channel '{channel}' has no subscribers")]
    NoSubscribers { channel: String },

    /// The receiving side of a queue channel was dropped
    #[error("Channel is closed")]
    Closed,

    /// A subscriber was initialised before any channel was assigned
    #[error("No message channel configured")]
    NotConfigured,

    /// A handler rejected the message
    #[error("Handler failed: {0}")]
    Handler(String),
}
