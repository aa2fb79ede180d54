//! Message envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Headers stamped on every message at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeaders {
    id: Uuid,
    timestamp: DateTime<Utc>,
}

impl MessageHeaders {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A payload travelling through a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message<T> {
    headers: MessageHeaders,
    payload: T,
}

impl<T> Message<T> {
    /// Wraps `payload` with fresh headers
    pub fn new(payload: T) -> Self {
        Self {
            headers: MessageHeaders::new(),
            payload,
        }
    }

    pub fn headers(&self) -> &MessageHeaders {
        &self.headers
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consumes the message, returning its payload
    pub fn into_payload(self) -> T {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_has_unique_id() {
        let a = Message::new("a");
        let b = Message::new("b");
        assert_ne!(a.headers().id(), b.headers().id());
        assert_eq!(*a.payload(), "a");
    }

    #[test]
    fn test_timestamp_is_now() {
        let before = Utc::now();
        let message = Message::new(1_u32);
        assert!(message.headers().timestamp() >= before);
        assert!(message.headers().timestamp() <= Utc::now());
    }

    #[test]
    fn test_serde_roundtrip_keeps_headers() {
        let message = Message::new("payload".to_string());
        let json = serde_json::to_string(&message).unwrap();
        let back: Message<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_into_payload() {
        assert_eq!(Message::new(vec![1, 2]).into_payload(), vec![1, 2]);
    }
}
