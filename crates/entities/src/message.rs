//! Chat message entity definitions.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A direct message between two users. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier.
    pub id: Uuid,
    /// Sending user.
    pub sender_id: Uuid,
    /// Receiving user.
    pub receiver_id: Uuid,
    /// Message text.
    pub message: String,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a new message stamped with the current time.
    pub fn new(sender_id: Uuid, receiver_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Returns true if this message belongs to the conversation between `a` and `b`,
    /// in either direction.
    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }

    /// Timestamp rendered as an RFC 3339 string with milliseconds.
    pub fn timestamp_string(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
