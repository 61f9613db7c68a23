//! Cache invalidation reasons
//!
//! Entries are never evicted during a session. Invalidation only marks an
//! entry so that the next `ensure` issues a new request; the previous data
//! stays readable until the new response lands.

use crate::model::PostId;
use serde::{Deserialize, Serialize};

/// Reason for cache invalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvalidationReason {
    /// Explicit invalidation by key
    Manual,

    /// User asked to retry a failed or stale view
    Retry,

    /// A created post made a collection of a different key shape outdated
    PostCreated { post_id: PostId },
}

impl std::fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidationReason::Manual => write!(f, "manual invalidation"),
            InvalidationReason::Retry => write!(f, "retry requested"),
            InvalidationReason::PostCreated { post_id } => {
                write!(f, "post {} created", post_id)
            }
        }
    }
}
