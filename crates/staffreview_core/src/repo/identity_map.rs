//! Per-repository identity map for hydrated reviews.
//!
//! # Invariants
//! - At most one live `SharedReview` per primary key.
//! - Entries are a cache; the `reviews` row stays authoritative.

use crate::model::review::{ReviewId, SharedReview};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct IdentityMap {
    entries: HashMap<ReviewId, SharedReview>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle for `id`, sharing ownership with the map.
    pub fn get(&self, id: ReviewId) -> Option<SharedReview> {
        self.entries.get(&id).map(Rc::clone)
    }

    /// Registers `review` under `id`, replacing any previous entry.
    pub fn insert(&mut self, id: ReviewId, review: SharedReview) {
        self.entries.insert(id, review);
    }

    pub fn remove(&mut self, id: ReviewId) -> Option<SharedReview> {
        self.entries.remove(&id)
    }

    pub fn contains(&self, id: ReviewId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
