//! Repository backed by a `RecordCache`.

use super::{ComplaintRepository, run_blocking};
use crate::cache::{CacheStats, RecordCache};
use crate::error::StoreError;
use crate::model::ComplaintRecord;
use crate::query::Query;
use crate::trace::Tracer;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Cached repository. Queries read the cache when it holds every record and
/// scan the store otherwise; results are the same either way.
#[derive(Clone)]
pub struct CachedRepository {
    cache: Arc<RecordCache>,
    tracer: Arc<dyn Tracer>,
}

impl CachedRepository {
    pub fn new(cache: Arc<RecordCache>, tracer: Arc<dyn Tracer>) -> Self {
        info!(
            "using cached complaint repository (root={}, policy={}, max_size={})",
            cache.store().root().display(),
            cache.settings().policy(),
            cache.settings().max_size()
        );
        Self { cache, tracer }
    }

    pub fn cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }
}

#[async_trait]
impl ComplaintRepository for CachedRepository {
    async fn save(
        &self,
        record: ComplaintRecord,
        cancel: &CancellationToken,
    ) -> Result<ComplaintRecord, StoreError> {
        let span = self.tracer.start("repository.save");
        let cache = Arc::clone(&self.cache);
        let result = run_blocking(cancel, move || {
            cache.put(record).map(|saved| (*saved).clone())
        })
        .await;
        span.end();
        result
    }

    async fn find_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<ComplaintRecord, StoreError> {
        let span = self.tracer.start("repository.find_by_id");
        let cache = Arc::clone(&self.cache);
        let result =
            run_blocking(cancel, move || cache.get(id).map(|record| (*record).clone())).await;
        span.end();
        result
    }

    async fn query(
        &self,
        query: Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<ComplaintRecord>, StoreError> {
        let span = self.tracer.start("repository.query");
        let cache = Arc::clone(&self.cache);
        let result = run_blocking(cancel, move || {
            if let Some(records) = cache.snapshot() {
                debug!(
                    "answering query from cache (query={}, records={})",
                    query.name(),
                    records.len()
                );
                return Ok(query.run(&records));
            }
            let records = cache.store().load_all()?;
            debug!(
                "cache partial, scanning disk (query={}, records={})",
                query.name(),
                records.len()
            );
            Ok(query.run(&records))
        })
        .await;
        span.end();
        result
    }

    async fn update(
        &self,
        record: ComplaintRecord,
        cancel: &CancellationToken,
    ) -> Result<ComplaintRecord, StoreError> {
        let span = self.tracer.start("repository.update");
        let cache = Arc::clone(&self.cache);
        let result = run_blocking(cancel, move || {
            cache.update(record).map(|written| (*written).clone())
        })
        .await;
        span.end();
        result
    }

    async fn resolve(
        &self,
        id: Uuid,
        resolved_by: &str,
        cancel: &CancellationToken,
    ) -> Result<ComplaintRecord, StoreError> {
        let span = self.tracer.start("repository.resolve");
        let cache = Arc::clone(&self.cache);
        let resolved_by = resolved_by.to_string();
        let result = run_blocking(cancel, move || {
            cache
                .resolve(id, &resolved_by, Utc::now())
                .map(|record| (*record).clone())
        })
        .await;
        span.end();
        result
    }

    fn get_cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
