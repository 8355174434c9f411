use thiserror::Error;

use std::fmt;
use std::time::Duration;

use crate::id::EntityId;

/// Capability a resolved entity handle failed to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Inbound message delivery.
    Inbound,
    /// Outbound event stream subscription.
    Events,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Inbound => write!(f, "inbound delivery"),
            Capability::Events => write!(f, "event stream"),
        }
    }
}

/// Errors surfaced by relay link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no connected entity '{0}'")]
    RecipientNotFound(EntityId),

    #[error("entity '{id}' has no {capability} capability")]
    CapabilityMissing { id: EntityId, capability: Capability },

    #[error("request timed out after {0:?}")]
    RequestTimeout(Duration),
}

/// Errors from the external event publish collaborator.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish rejected: {0}")]
    Rejected(String),

    #[error("publish sink unavailable")]
    Unavailable,
}
