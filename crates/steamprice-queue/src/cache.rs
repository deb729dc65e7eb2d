//! In-memory result cache shared by all jobs on one queue.

use std::collections::HashMap;

use steamprice_market::{Cents, ItemId};

use crate::job::JobKind;

/// Cache key for a fetched price.
///
/// The kind is part of the key because a buy order lookup and a listing
/// lookup for the same item answer different questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub item: ItemId,
    pub kind: JobKind,
}

impl CacheKey {
    pub fn new(item: ItemId, kind: JobKind) -> Self {
        Self { item, kind }
    }

    pub fn for_job(job: &crate::job::Job) -> Self {
        Self::new(job.item().clone(), job.kind())
    }
}

/// Prices already fetched during this queue's lifetime.
///
/// Entries are never evicted. The queue lives as long as the page or
/// process that spawned it, and a price fetched seconds ago is good
/// enough for every later job asking the same question.
#[derive(Debug, Default)]
pub struct PriceCache {
    entries: HashMap<CacheKey, Cents>,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Cents> {
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, key: CacheKey, price: Cents) {
        self.entries.insert(key, price);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
