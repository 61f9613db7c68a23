//! Local star flags layered over server data
//!
//! Flags live for the session only and are never written by the network
//! layer, so re-fetching or invalidating a post leaves its flag intact.

use crate::model::Identified;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Deref;

/// An entity with its star flag appended for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Starred<T> {
    #[serde(flatten)]
    pub item: T,
    pub starred: bool,
}

impl<T> Deref for Starred<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

/// Session-scoped id→flag store
#[derive(Debug, Default, Clone)]
pub struct OverlayStore {
    flags: HashMap<u64, bool>,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag for `id` and return the new value
    ///
    /// An absent flag reads as `false`, so the first toggle stars the post.
    pub fn toggle(&mut self, id: u64) -> bool {
        let flag = self.flags.entry(id).or_insert(false);
        *flag = !*flag;
        tracing::debug!(id, starred = *flag, "toggled star");
        *flag
    }

    pub fn is_set(&self, id: u64) -> bool {
        self.flags.get(&id).copied().unwrap_or(false)
    }

    /// Pair an entity with its flag; the entity itself is cloned, never mutated
    pub fn merge<T: Identified + Clone>(&self, entity: &T) -> Starred<T> {
        Starred {
            starred: self.is_set(entity.id()),
            item: entity.clone(),
        }
    }

    pub fn merge_all<T: Identified + Clone>(&self, entities: &[T]) -> Vec<Starred<T>> {
        entities.iter().map(|e| self.merge(e)).collect()
    }

    /// Ids currently starred, ascending
    pub fn starred_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .flags
            .iter()
            .filter_map(|(id, set)| set.then_some(*id))
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of starred ids
    pub fn len(&self) -> usize {
        self.flags.values().filter(|set| **set).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
