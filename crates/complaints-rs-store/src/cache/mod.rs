//! Eviction-aware in-memory index over the file store.
//!
//! The cache is write-through: every mutation reaches disk before the index
//! changes, so the index is never ahead of durable state. Reads that miss fall
//! through to the store and populate the index.
//!
//! ## Locking
//!
//! One `RwLock` guards the index. Writes (`put`, `update`, `resolve`) hold it
//! exclusively across the disk write so disk and index agree on the order of
//! mutations for the same id. Lookups take the read lock, except under LRU
//! where a hit reorders the entry and needs exclusive access. Counters are
//! atomics and can be read without the lock.

mod metrics;
mod policy;

pub use metrics::CacheStats;
pub use policy::{
    CacheSettings, DEFAULT_CACHE_SIZE, EvictionPolicy, MAX_CACHE_SIZE, MIN_CACHE_SIZE,
};

use crate::error::StoreError;
use crate::model::ComplaintRecord;
use crate::store::FileComplaintStore;
use crate::trace::Tracer;
use chrono::{DateTime, Utc};
use linked_hash_map::LinkedHashMap;
use log::{debug, info, warn};
use metrics::CacheMetrics;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Cached view of a `FileComplaintStore`.
pub struct RecordCache {
    store: FileComplaintStore,
    settings: CacheSettings,
    tracer: Arc<dyn Tracer>,
    index: RwLock<CacheIndex>,
    metrics: CacheMetrics,
}

/// Entries in eviction order (front = next victim) plus bookkeeping.
struct CacheIndex {
    entries: LinkedHashMap<Uuid, Arc<ComplaintRecord>>,
    /// True while the index holds every durable record.
    complete: bool,
    /// Set once the unbounded policy has grown past `max_size`.
    over_capacity_warned: bool,
}

impl CacheIndex {
    fn empty() -> Self {
        Self {
            entries: LinkedHashMap::new(),
            complete: false,
            over_capacity_warned: false,
        }
    }

    /// Insert or overwrite an entry, evicting as the policy requires.
    fn insert(
        &mut self,
        record: Arc<ComplaintRecord>,
        settings: &CacheSettings,
        metrics: &CacheMetrics,
    ) {
        let id = record.id;
        if let Some(slot) = self.entries.get_mut(&id) {
            *slot = record;
            if settings.policy() == EvictionPolicy::Lru {
                self.entries.get_refresh(&id);
            }
            return;
        }

        match settings.policy() {
            EvictionPolicy::Lru | EvictionPolicy::Fifo => {
                while self.entries.len() >= settings.max_size() {
                    let Some((victim, _)) = self.entries.pop_front() else {
                        break;
                    };
                    metrics.record_eviction();
                    self.complete = false;
                    debug!("evicted complaint from cache (id={victim})");
                }
            }
            EvictionPolicy::None => {
                if self.entries.len() >= settings.max_size() && !self.over_capacity_warned {
                    warn!(
                        "complaint cache grew past max_size with eviction disabled (max_size={})",
                        settings.max_size()
                    );
                    self.over_capacity_warned = true;
                }
            }
        }
        self.entries.insert(id, record);
    }

    /// Insert only if the id is not cached yet.
    ///
    /// Used for entries read from disk outside the lock: a present entry was
    /// written through by a mutation and is at least as new.
    fn insert_if_absent(
        &mut self,
        record: Arc<ComplaintRecord>,
        settings: &CacheSettings,
        metrics: &CacheMetrics,
    ) -> Arc<ComplaintRecord> {
        if let Some(existing) = self.entries.get(&record.id) {
            return Arc::clone(existing);
        }
        self.insert(Arc::clone(&record), settings, metrics);
        record
    }
}

impl RecordCache {
    /// Build the cache and warm it from disk.
    ///
    /// A warm-up failure is logged and leaves the cache empty; it then fills
    /// lazily from lookups.
    pub fn new(
        store: FileComplaintStore,
        settings: CacheSettings,
        tracer: Arc<dyn Tracer>,
    ) -> Self {
        let cache = Self {
            store,
            settings,
            tracer,
            index: RwLock::new(CacheIndex::empty()),
            metrics: CacheMetrics::default(),
        };
        cache.warm();
        cache
    }

    /// Rebuild the index from disk, e.g. after evictions made it partial.
    pub fn reload(&self) -> Result<usize, StoreError> {
        let span = self.tracer.start("cache.reload");
        let result = self.store.load_all().map(|records| {
            let mut index = self.index.write();
            *index = CacheIndex::empty();
            self.fill(&mut index, records)
        });
        span.end();
        result
    }

    /// Fetch a record, falling through to disk on a miss.
    pub fn get(&self, id: Uuid) -> Result<Arc<ComplaintRecord>, StoreError> {
        let span = self.tracer.start("cache.get");
        let result = self.get_inner(id);
        span.end();
        result
    }

    /// Persist a record, then index what was written.
    pub fn put(&self, record: ComplaintRecord) -> Result<Arc<ComplaintRecord>, StoreError> {
        let span = self.tracer.start("cache.put");
        let result = self.write_through(|store| store.save(&record));
        span.end();
        result
    }

    /// Rewrite an existing record on disk, then refresh its entry.
    pub fn update(&self, record: ComplaintRecord) -> Result<Arc<ComplaintRecord>, StoreError> {
        let span = self.tracer.start("cache.update");
        let result = self.write_through(|store| store.update(&record));
        span.end();
        result
    }

    /// Resolve a record once; later calls return the original resolution.
    pub fn resolve(
        &self,
        id: Uuid,
        resolved_by: &str,
        at: DateTime<Utc>,
    ) -> Result<Arc<ComplaintRecord>, StoreError> {
        let span = self.tracer.start("cache.resolve");
        let result = self.resolve_inner(id, resolved_by, at);
        span.end();
        result
    }

    /// Every record in creation order, if the index holds all of them.
    ///
    /// Returns `None` once evictions or a failed warm-up made the index
    /// partial; callers then scan the store instead.
    pub fn snapshot(&self) -> Option<Vec<Arc<ComplaintRecord>>> {
        let index = self.index.read();
        if !index.complete {
            return None;
        }
        let mut records: Vec<_> = index.entries.values().cloned().collect();
        records.sort_by_key(|record| record.creation_key());
        Some(records)
    }

    /// Drop one entry. The index stops counting as complete.
    pub fn invalidate(&self, id: Uuid) -> bool {
        let mut index = self.index.write();
        let removed = index.entries.remove(&id).is_some();
        if removed {
            index.complete = false;
        }
        removed
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let mut index = self.index.write();
        *index = CacheIndex::empty();
    }

    /// Counter snapshot; safe to call while other threads mutate the cache.
    pub fn stats(&self) -> CacheStats {
        let current_size = self.index.read().entries.len();
        self.metrics.snapshot(current_size, self.settings.max_size())
    }

    pub fn len(&self) -> usize {
        self.index.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn settings(&self) -> CacheSettings {
        self.settings
    }

    /// Underlying file store.
    pub fn store(&self) -> &FileComplaintStore {
        &self.store
    }

    fn warm(&self) {
        let span = self.tracer.start("cache.warm");
        match self.store.load_all() {
            Ok(records) => {
                let mut index = self.index.write();
                let loaded = self.fill(&mut index, records);
                info!(
                    "complaint cache warmed (loaded={}, cached={}, policy={}, max_size={})",
                    loaded,
                    index.entries.len(),
                    self.settings.policy(),
                    self.settings.max_size()
                );
            }
            Err(err) => {
                warn!(
                    "complaint cache warm-up failed; starting empty (root={}): {err}",
                    self.store.root().display()
                );
            }
        }
        span.end();
    }

    /// Load `records` into an empty index; complete unless something was evicted.
    fn fill(&self, index: &mut CacheIndex, records: Vec<ComplaintRecord>) -> usize {
        let loaded = records.len();
        index.complete = true;
        for record in records {
            index.insert(Arc::new(record), &self.settings, &self.metrics);
        }
        loaded
    }

    fn get_inner(&self, id: Uuid) -> Result<Arc<ComplaintRecord>, StoreError> {
        let cached = if self.settings.policy() == EvictionPolicy::Lru {
            self.index.write().entries.get_refresh(&id).cloned()
        } else {
            self.index.read().entries.get(&id).cloned()
        };
        if let Some(record) = cached {
            self.metrics.record_hit();
            return Ok(record);
        }

        self.metrics.record_miss();
        let record = self.store.find_by_id(id)?.ok_or(StoreError::NotFound(id))?;
        let mut index = self.index.write();
        Ok(index.insert_if_absent(Arc::new(record), &self.settings, &self.metrics))
    }

    /// Run a disk mutation under the write lock and index its result on success.
    fn write_through<F>(&self, write: F) -> Result<Arc<ComplaintRecord>, StoreError>
    where
        F: FnOnce(&FileComplaintStore) -> Result<ComplaintRecord, StoreError>,
    {
        let mut index = self.index.write();
        let written = Arc::new(write(&self.store)?);
        index.insert(Arc::clone(&written), &self.settings, &self.metrics);
        Ok(written)
    }

    fn resolve_inner(
        &self,
        id: Uuid,
        resolved_by: &str,
        at: DateTime<Utc>,
    ) -> Result<Arc<ComplaintRecord>, StoreError> {
        let mut index = self.index.write();
        let current = match index.entries.get(&id).cloned() {
            Some(record) => {
                self.metrics.record_hit();
                record
            }
            None => {
                self.metrics.record_miss();
                let record = self.store.find_by_id(id)?.ok_or(StoreError::NotFound(id))?;
                Arc::new(record)
            }
        };

        let mut next = (*current).clone();
        if !next.resolve(resolved_by, at) {
            debug!("complaint already resolved (id={id})");
            index.insert(Arc::clone(&current), &self.settings, &self.metrics);
            return Ok(current);
        }
        let written = Arc::new(self.store.update(&next)?);
        index.insert(Arc::clone(&written), &self.settings, &self.metrics);
        info!("complaint resolved (id={id}, resolved_by={resolved_by})");
        Ok(written)
    }
}
