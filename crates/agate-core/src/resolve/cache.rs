//! Caller-owned cache of built indexes.
//!
//! Indexes are ephemeral read-side state. This cache is created by the
//! host's session/request scope and passed by handle, never ambient
//! process-global state. Eviction is TTL-based with a capacity bound:
//! expired entries drop on access, and inserting past capacity evicts the
//! oldest entry first.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::AssetIndex;

pub struct IndexCache {
    ttl: Duration,
    capacity: usize,
    entries: HashMap<String, (Instant, AssetIndex)>,
}

impl IndexCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: HashMap::new(),
        }
    }

    /// Insert an index keyed by its upload id, evicting as needed.
    pub fn insert(&mut self, index: AssetIndex) {
        self.evict_expired();
        if self.entries.len() >= self.capacity
            && !self.entries.contains_key(index.upload_id())
        {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, (at, _))| *at)
                .map(|(k, _)| k.clone())
            {
                self.entries.remove(&oldest);
            }
        }
        self.entries
            .insert(index.upload_id().to_string(), (Instant::now(), index));
    }

    /// Fetch an index by upload id; an expired entry is dropped and reported
    /// as absent.
    pub fn get(&mut self, upload_id: &str) -> Option<&AssetIndex> {
        let expired = match self.entries.get(upload_id) {
            Some((inserted_at, _)) => inserted_at.elapsed() > self.ttl,
            None => return None,
        };
        if expired {
            self.entries.remove(upload_id);
            return None;
        }
        self.entries.get(upload_id).map(|(_, index)| index)
    }

    pub fn remove(&mut self, upload_id: &str) -> bool {
        self.entries.remove(upload_id).is_some()
    }

    pub fn evict_expired(&mut self) {
        let ttl = self.ttl;
        self.entries.retain(|_, (at, _)| at.elapsed() <= ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
