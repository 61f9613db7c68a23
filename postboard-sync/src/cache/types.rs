//! Core type definitions for the cache system

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::cache::key::CacheKey;
use crate::error::Result;

/// Fetches and maps the data for one key
///
/// A loader owns the whole read path for its resource kind: the request and
/// the wire-to-domain mapping. It must not touch cache state.
pub type Loader<T> = Arc<dyn Fn(CacheKey) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// What `ensure` did for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// A new request was issued
    Started,
    /// A request for this key was already in flight
    Coalesced,
    /// The entry holds data from a successful request
    Fresh,
    /// The last request failed; invalidate the key to try again
    Failed,
}

/// Counters for cache behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests issued to the loader
    pub fetches: u64,

    /// `ensure` calls absorbed by an in-flight request
    pub coalesced: u64,

    /// `ensure` calls answered by a fresh entry
    pub hits: u64,

    /// Responses dropped because their request was superseded
    pub discarded: u64,

    /// Requests that ended in an error
    pub errors: u64,

    /// Optimistic writes
    pub patches: u64,

    /// Explicit invalidations
    pub invalidations: u64,
}

impl CacheStats {
    /// Fraction of `ensure` calls that did not need a new request, as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.coalesced + self.fetches;
        if total == 0 {
            0.0
        } else {
            ((self.hits + self.coalesced) as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ fetches: {}, coalesced: {}, hits: {}, hit_rate: {:.2}%, discarded: {}, errors: {} }}",
            self.fetches,
            self.coalesced,
            self.hits,
            self.hit_rate(),
            self.discarded,
            self.errors
        )
    }
}
