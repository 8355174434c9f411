//! Published-event types for the external publish collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default time-to-live for published events, in seconds.
pub const DEFAULT_EVENT_TTL: u32 = 60;

/// An event handed to the external publish/subscribe collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedEvent {
    /// Whether the event is visible beyond its owner.
    pub is_public: bool,
    /// Event name subscribers filter on.
    pub name: String,
    /// Identifier of the user the event belongs to.
    pub owner_id: String,
    /// Event payload, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Seconds the event stays available to subscribers.
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    /// When the event was published.
    pub published_at: DateTime<Utc>,
}

fn default_ttl() -> u32 {
    DEFAULT_EVENT_TTL
}

impl PublishedEvent {
    /// Create an event stamped now with the default ttl.
    pub fn new(
        is_public: bool,
        name: impl Into<String>,
        owner_id: impl Into<String>,
        data: Option<String>,
    ) -> Self {
        Self {
            is_public,
            name: name.into(),
            owner_id: owner_id.into(),
            data,
            ttl: DEFAULT_EVENT_TTL,
            published_at: Utc::now(),
        }
    }
}
