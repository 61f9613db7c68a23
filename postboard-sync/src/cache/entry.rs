//! Cache entry state

use crate::cache::key::CacheKey;
use crate::error::SyncError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Lifecycle of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Never fetched, or invalidated and waiting for the next `ensure`
    Idle,
    /// A request is in flight
    Loading,
    /// Last request succeeded
    Success,
    /// Last request failed; previous data, if any, is kept
    Error,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Idle => "idle",
            CacheStatus::Loading => "loading",
            CacheStatus::Success => "success",
            CacheStatus::Error => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CacheStatus::Loading)
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one cached resource
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// The cache key
    pub key: CacheKey,

    /// Current lifecycle status
    pub status: CacheStatus,

    /// Last successfully mapped data
    pub data: Option<T>,

    /// Last error, cleared by the next success
    pub error: Option<SyncError>,

    /// When `data` was last written
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> CacheEntry<T> {
    /// An entry that has never been fetched
    pub fn idle(key: CacheKey) -> Self {
        Self {
            key,
            status: CacheStatus::Idle,
            data: None,
            error: None,
            fetched_at: None,
        }
    }

    /// Whether the entry should render a spinner: loading with nothing to show
    pub fn is_initial_load(&self) -> bool {
        self.status.is_loading() && self.data.is_none()
    }

    /// Whether data is shown while the last refresh failed
    pub fn is_stale_while_error(&self) -> bool {
        self.status == CacheStatus::Error && self.data.is_some()
    }

    /// Get the age of the data
    pub fn age(&self) -> Option<Duration> {
        self.fetched_at
            .map(|at| (Utc::now() - at).to_std().unwrap_or(Duration::from_secs(0)))
    }

    pub(crate) fn begin_loading(&mut self) {
        self.status = CacheStatus::Loading;
    }

    pub(crate) fn resolve(&mut self, data: T) {
        self.status = CacheStatus::Success;
        self.data = Some(data);
        self.error = None;
        self.fetched_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, error: SyncError) {
        self.status = CacheStatus::Error;
        self.error = Some(error);
    }

    /// Optimistic write; an entry with nothing fetched yet becomes `Success`
    pub(crate) fn patch(&mut self, data: T) {
        if self.status == CacheStatus::Idle && self.data.is_none() {
            self.status = CacheStatus::Success;
            self.fetched_at = Some(Utc::now());
        }
        self.data = Some(data);
    }
}
