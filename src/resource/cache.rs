//! LRU, budget-bound resource cache keyed by scratch key and unique key.

use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::resource::key::{ScratchKey, UniqueKey};
use crate::resource::resource::Resource;

pub const DEFAULT_CACHE_LIMIT_BYTES: u64 = 512 * 1024 * 1024;
pub const DEFAULT_EXPIRATION_FRAMES: u64 = 120;

struct PurgeableEntry {
    resource: Rc<Resource>,
    touched_at: Instant,
}

pub struct ResourceCache {
    /// Lookup indices only: these hold `Weak` handles so that they don't
    /// themselves count as an external reference for the `Rc::strong_count`
    /// purgeability check below. `all` is the sole strong owner.
    by_scratch: FxHashMap<ScratchKey, Vec<Weak<Resource>>>,
    by_unique: HashMap<UniqueKey, Weak<Resource>>,
    /// All resources the cache currently owns a strong reference to,
    /// regardless of purgeability; scanned by `process_unreferenced_resources`.
    all: Vec<Rc<Resource>>,
    purgeable: Vec<PurgeableEntry>,
    cache_limit: u64,
    expiration_frames: u64,
    frame_counter: u64,
    memory_usage: u64,
    purgeable_bytes: u64,
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceCache {
    pub fn new() -> Self {
        Self {
            by_scratch: FxHashMap::default(),
            by_unique: HashMap::new(),
            all: Vec::new(),
            purgeable: Vec::new(),
            cache_limit: DEFAULT_CACHE_LIMIT_BYTES,
            expiration_frames: DEFAULT_EXPIRATION_FRAMES,
            frame_counter: 0,
            memory_usage: 0,
            purgeable_bytes: 0,
        }
    }

    pub fn cache_limit(&self) -> u64 {
        self.cache_limit
    }

    pub fn set_cache_limit(&mut self, bytes: u64) {
        self.cache_limit = bytes;
        self.evict_until(self.cache_limit);
    }

    pub fn resource_expiration_frames(&self) -> u64 {
        self.expiration_frames
    }

    pub fn set_resource_expiration_frames(&mut self, frames: u64) {
        self.expiration_frames = frames;
    }

    pub fn memory_usage(&self) -> u64 {
        self.memory_usage
    }

    pub fn purgeable_bytes(&self) -> u64 {
        self.purgeable_bytes
    }

    /// Returns an unpinned resource matching `key`, if any, and marks it
    /// in-use for the current frame (P1). The caller's clone of the `Rc`
    /// makes the resource non-purgeable until all clones are dropped. The
    /// index's own `Weak` handle does not count toward that strong count.
    pub fn find(&mut self, key: &ScratchKey) -> Option<Rc<Resource>> {
        let bucket = self.by_scratch.get(key)?;
        let found = bucket
            .iter()
            .find(|w| w.strong_count() == 1 /* held only by `all` */)
            .and_then(Weak::upgrade);
        if let Some(r) = &found {
            r.touch(self.frame_counter);
        }
        found
    }

    pub fn find_by_unique_key(&self, key: &UniqueKey) -> Option<Rc<Resource>> {
        let r = self.by_unique.get(key)?.upgrade()?;
        r.touch(self.frame_counter);
        Some(r)
    }

    /// Inserts `resource`, evicting LRU purgeable entries until the total
    /// stays within budget. Returns the shared handle.
    pub fn add_to_cache(&mut self, resource: Resource) -> Rc<Resource> {
        resource.touch(self.frame_counter);
        let rc = Rc::new(resource);
        self.memory_usage += rc.byte_cost();
        if let Some(key) = rc.scratch_key.clone() {
            self.by_scratch.entry(key).or_default().push(Rc::downgrade(&rc));
        }
        if let Some(key) = rc.unique_key.clone() {
            self.by_unique.insert(key, Rc::downgrade(&rc));
        }
        self.all.push(rc.clone());
        self.evict_until(self.cache_limit);
        rc
    }

    /// Rebuilds the purgeable set by scanning every resource the cache
    /// still holds a strong reference to; a resource with no external
    /// holder (`Rc::strong_count == 1`) becomes purgeable.
    pub fn process_unreferenced_resources(&mut self) {
        self.purgeable.clear();
        self.purgeable_bytes = 0;
        self.all.retain(|r| Rc::strong_count(r) > 0);
        for r in &self.all {
            if Rc::strong_count(r) == 1 {
                self.purgeable_bytes += r.byte_cost();
                self.purgeable.push(PurgeableEntry {
                    resource: r.clone(),
                    touched_at: Instant::now(),
                });
            }
        }
    }

    /// Advances the frame counter and purges purgeable entries whose
    /// frames-since-last-use has reached the expiration horizon (P3). Only
    /// call this after a non-empty flush, per the frame-counting policy in
    /// section 4.2 — empty flushes must not advance the counter.
    pub fn advance_frame_and_purge(&mut self) {
        self.frame_counter += 1;
        self.process_unreferenced_resources();
        let horizon = self.frame_counter;
        let expiration = self.expiration_frames;
        let expired: Vec<Rc<Resource>> = self
            .purgeable
            .iter()
            .filter(|e| horizon.saturating_sub(e.resource.last_used_frame()) >= expiration)
            .map(|e| e.resource.clone())
            .collect();
        for r in expired {
            self.evict(&r);
        }
    }

    pub fn purge_not_used_since(&mut self, time: Instant) {
        self.process_unreferenced_resources();
        let expired: Vec<Rc<Resource>> = self
            .purgeable
            .iter()
            .filter(|e| e.touched_at < time)
            .map(|e| e.resource.clone())
            .collect();
        for r in expired {
            self.evict(&r);
        }
    }

    /// Evicts purgeable entries, least-recently-used first, until total
    /// memory usage is at or below `bytes_limit`. Returns whether the goal
    /// was reached.
    pub fn purge_until_memory_to(&mut self, bytes_limit: u64) -> bool {
        self.process_unreferenced_resources();
        self.evict_until(bytes_limit);
        self.memory_usage <= bytes_limit
    }

    fn evict_until(&mut self, bytes_limit: u64) {
        if self.memory_usage <= bytes_limit {
            return;
        }
        self.purgeable
            .sort_by_key(|e| e.resource.last_used_frame());
        let mut i = 0;
        while self.memory_usage > bytes_limit && i < self.purgeable.len() {
            let resource = self.purgeable[i].resource.clone();
            self.evict(&resource);
            i += 1;
        }
    }

    fn evict(&mut self, resource: &Rc<Resource>) {
        if let Some(key) = &resource.scratch_key {
            if let Some(bucket) = self.by_scratch.get_mut(key) {
                // Drop both the evicted entry and any weak handle that has
                // already gone dead (its strong owner left only via `all`).
                bucket.retain(|w| w.upgrade().map(|r| !Rc::ptr_eq(&r, resource)).unwrap_or(false));
                if bucket.is_empty() {
                    self.by_scratch.remove(key);
                }
            }
        }
        if let Some(key) = &resource.unique_key {
            self.by_unique.remove(key);
        }
        let before = self.all.len();
        self.all.retain(|r| !Rc::ptr_eq(r, resource));
        if self.all.len() != before {
            self.memory_usage = self.memory_usage.saturating_sub(resource.byte_cost());
            tracing::debug!(
                bytes = resource.byte_cost(),
                total = self.memory_usage,
                "resource cache evicted entry"
            );
        }
        self.purgeable.retain(|e| !Rc::ptr_eq(&e.resource, resource));
        self.purgeable_bytes = self.purgeable.iter().map(|e| e.resource.byte_cost()).sum();
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }
}
