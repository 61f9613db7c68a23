//! Read-through cache with request coalescing and stale-response protection

use crate::cache::{
    entry::{CacheEntry, CacheStatus},
    invalidation::InvalidationReason,
    key::CacheKey,
    types::{CacheStats, EnsureOutcome, Loader},
};
use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Key→entry cache for one remote resource type
///
/// This implementation provides:
/// - At most one entry and one in-flight request per key
/// - Write-back only for the request an entry is currently waiting on
/// - Stale-while-error: a failed refresh keeps the previous data
/// - A revision channel for re-rendering on change
///
/// Requests run as spawned Tokio tasks, so `ensure` must be called from
/// within a runtime. Locks are never held across an `.await`.
pub struct RemoteCollectionCache<T> {
    /// State shared with spawned request tasks
    shared: Arc<Shared<T>>,
}

/// Optimistic write kept for replay over an in-flight response
type Patch<T> = Arc<dyn Fn(Option<&T>) -> T + Send + Sync>;

struct Shared<T> {
    /// Label used in logs
    name: &'static str,

    /// Request and mapping for this resource type
    loader: Loader<T>,

    store: RwLock<CacheStore<T>>,
    revision: watch::Sender<u64>,
}

/// Internal cache storage
struct CacheStore<T> {
    /// Main storage: key -> slot
    slots: HashMap<CacheKey, Slot<T>>,

    stats: CacheStats,

    /// Source of request tickets
    next_ticket: u64,
}

/// Take the next request ticket and count the fetch
fn issue_ticket(next_ticket: &mut u64, stats: &mut CacheStats) -> u64 {
    let ticket = *next_ticket;
    *next_ticket += 1;
    stats.fetches += 1;
    ticket
}

struct Slot<T> {
    entry: CacheEntry<T>,

    /// Ticket of the request this entry accepts a response from
    in_flight: Option<u64>,

    /// Invalidated while loading: drop the in-flight response and fetch again
    refetch: bool,

    /// Patches written while loading, re-applied on top of the response
    replay: Vec<Patch<T>>,
}

impl<T> Slot<T> {
    fn idle(key: CacheKey) -> Self {
        Self {
            entry: CacheEntry::idle(key),
            in_flight: None,
            refetch: false,
            replay: Vec::new(),
        }
    }
}

impl<T: Send + Sync + 'static> Shared<T> {
    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    /// Run the loader for `key` and write its response back under `ticket`
    fn spawn_request(self: &Arc<Self>, key: CacheKey, ticket: u64) {
        debug!("[{}] fetching {} (ticket {})", self.name, key, ticket);

        let request = (self.loader)(key);
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let result = request.await;
            shared.complete(key, ticket, result);
        });
    }

    /// Write a response back if its request is still the entry's current one
    fn complete(self: &Arc<Self>, key: CacheKey, ticket: u64, result: Result<T>) {
        let name = self.name;
        let follow_up = {
            let mut store = self.store.write();
            let CacheStore {
                slots,
                stats,
                next_ticket,
            } = &mut *store;

            let Some(slot) = slots.get_mut(&key) else {
                return;
            };

            if slot.in_flight != Some(ticket) {
                stats.discarded += 1;
                debug!("[{}] discarding superseded response for {} (ticket {})", name, key, ticket);
                return;
            }

            if slot.refetch {
                slot.refetch = false;
                stats.discarded += 1;
                debug!("[{}] {} was invalidated while loading, fetching again", name, key);

                let next = issue_ticket(next_ticket, stats);
                slot.in_flight = Some(next);
                Some(next)
            } else {
                slot.in_flight = None;
                let replay = std::mem::take(&mut slot.replay);

                match result {
                    Ok(data) => {
                        debug!("[{}] loaded {}", name, key);
                        slot.entry.resolve(data);
                        for patch in &replay {
                            let next = patch(slot.entry.data.as_ref());
                            slot.entry.patch(next);
                        }
                    }
                    Err(e) => {
                        warn!("[{}] request for {} failed: {}", name, key, e);
                        stats.errors += 1;
                        slot.entry.fail(e);
                    }
                }
                None
            }
        };

        if let Some(next) = follow_up {
            self.spawn_request(key, next);
        }
        self.bump();
    }
}

impl<T> RemoteCollectionCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty cache backed by `loader`
    pub fn new(name: &'static str, loader: Loader<T>) -> Self {
        debug!("Initializing {} cache", name);

        let (revision, _) = watch::channel(0);
        let store = CacheStore {
            slots: HashMap::new(),
            stats: CacheStats::default(),
            next_ticket: 0,
        };

        Self {
            shared: Arc::new(Shared {
                name,
                loader,
                store: RwLock::new(store),
                revision,
            }),
        }
    }

    /// Current state of `key`; an unknown key reads as an idle entry
    pub fn get(&self, key: &CacheKey) -> CacheEntry<T> {
        let store = self.shared.store.read();
        store
            .slots
            .get(key)
            .map(|slot| slot.entry.clone())
            .unwrap_or_else(|| CacheEntry::idle(*key))
    }

    /// Start a request for `key` if its entry is idle or missing
    ///
    /// Failed entries are not retried here, so re-rendering a view never
    /// re-issues a failing request. Retrying means `invalidate` then `ensure`.
    pub fn ensure(&self, key: &CacheKey) -> EnsureOutcome {
        let name = self.shared.name;
        let ticket = {
            let mut store = self.shared.store.write();
            let CacheStore {
                slots,
                stats,
                next_ticket,
            } = &mut *store;

            let slot = slots.entry(*key).or_insert_with(|| Slot::idle(*key));

            match slot.entry.status {
                CacheStatus::Loading => {
                    stats.coalesced += 1;
                    debug!("[{}] coalescing request for {}", name, key);
                    return EnsureOutcome::Coalesced;
                }
                CacheStatus::Success => {
                    stats.hits += 1;
                    return EnsureOutcome::Fresh;
                }
                CacheStatus::Error => return EnsureOutcome::Failed,
                CacheStatus::Idle => {}
            }

            let ticket = issue_ticket(next_ticket, stats);
            slot.in_flight = Some(ticket);
            slot.entry.begin_loading();
            ticket
        };

        self.shared.bump();
        self.shared.spawn_request(*key, ticket);
        EnsureOutcome::Started
    }

    /// Ensure `key` and wait until its entry settles
    pub async fn fetch(&self, key: &CacheKey) -> CacheEntry<T> {
        let mut changes = self.subscribe();
        self.ensure(key);

        loop {
            let entry = self.get(key);
            if !entry.status.is_loading() {
                return entry;
            }
            if changes.changed().await.is_err() {
                return entry;
            }
        }
    }

    /// Force the next `ensure` on `key` to issue a new request
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.invalidate_with(key, InvalidationReason::Manual)
    }

    /// Invalidate with an explicit reason
    ///
    /// Existing data stays readable. A key that is loading stays loading: its
    /// in-flight response is dropped and exactly one new request follows it.
    /// Returns `false` when the key has no entry.
    pub fn invalidate_with(&self, key: &CacheKey, reason: InvalidationReason) -> bool {
        let name = self.shared.name;
        {
            let mut store = self.shared.store.write();
            let CacheStore { slots, stats, .. } = &mut *store;

            let Some(slot) = slots.get_mut(key) else {
                return false;
            };

            if slot.entry.status.is_loading() {
                slot.refetch = true;
                debug!("[{}] {} will be fetched again after the current request", name, key);
            } else {
                slot.entry.status = CacheStatus::Idle;
            }
            stats.invalidations += 1;
            debug!("[{}] invalidated {} ({})", name, key, reason);
        }

        self.shared.bump();
        true
    }

    /// Optimistically replace the data of `key` without issuing a request
    ///
    /// `f` receives the current data, if any. A missing entry is created in
    /// `success` state. While a request is in flight, `f` is applied now and
    /// again on top of the response when it lands.
    pub fn patch<F>(&self, key: &CacheKey, f: F)
    where
        F: Fn(Option<&T>) -> T + Send + Sync + 'static,
    {
        let name = self.shared.name;
        {
            let mut store = self.shared.store.write();
            let CacheStore { slots, stats, .. } = &mut *store;

            let slot = slots.entry(*key).or_insert_with(|| Slot::idle(*key));
            let next = f(slot.entry.data.as_ref());
            slot.entry.patch(next);
            if slot.in_flight.is_some() {
                slot.replay.push(Arc::new(f));
            }
            stats.patches += 1;
            debug!("[{}] patched {}", name, key);
        }

        self.shared.bump();
    }

    /// Receiver notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Entries that currently hold data
    pub fn snapshot(&self) -> Vec<CacheEntry<T>> {
        let store = self.shared.store.read();
        store
            .slots
            .values()
            .filter(|slot| slot.entry.data.is_some())
            .map(|slot| slot.entry.clone())
            .collect()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.shared.store.read().stats.clone()
    }

    /// Get number of entries in cache
    pub fn len(&self) -> usize {
        self.shared.store.read().slots.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.shared.store.read().slots.is_empty()
    }
}
