//! Async repository facade consumed by the tool layer.

mod cached;
mod file;

pub use cached::CachedRepository;
pub use file::FileRepository;

use crate::cache::{CacheSettings, CacheStats, RecordCache};
use crate::error::StoreError;
use crate::model::{ComplaintRecord, Severity};
use crate::query::Query;
use crate::store::FileComplaintStore;
use crate::trace::Tracer;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[async_trait]
/// Storage operations over complaint records.
///
/// Every method checks `cancel` before touching the filesystem and returns
/// `StoreError::Cancelled` if it already fired. Once I/O has started the
/// operation runs to completion and cannot be revoked.
pub trait ComplaintRepository: Send + Sync {
    /// Persist a new record and return it as stored.
    async fn save(
        &self,
        record: ComplaintRecord,
        cancel: &CancellationToken,
    ) -> Result<ComplaintRecord, StoreError>;

    /// Fetch one record; `NotFound` if it does not exist.
    async fn find_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<ComplaintRecord, StoreError>;

    /// Evaluate a read query over all records in creation order.
    async fn query(
        &self,
        query: Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<ComplaintRecord>, StoreError>;

    /// Rewrite an existing record. The stored creation timestamp is kept.
    async fn update(
        &self,
        record: ComplaintRecord,
        cancel: &CancellationToken,
    ) -> Result<ComplaintRecord, StoreError>;

    /// Mark a record resolved. Resolving twice returns the first resolution.
    async fn resolve(
        &self,
        id: Uuid,
        resolved_by: &str,
        cancel: &CancellationToken,
    ) -> Result<ComplaintRecord, StoreError>;

    /// Cache counters; `max_size == 0` when no cache is in use.
    fn get_cache_stats(&self) -> CacheStats;

    async fn list(
        &self,
        limit: usize,
        offset: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ComplaintRecord>, StoreError> {
        self.query(Query::Page { limit, offset }, cancel).await
    }

    async fn find_by_project(
        &self,
        project_name: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ComplaintRecord>, StoreError> {
        let query = Query::Project {
            name: project_name.to_string(),
            limit,
        };
        self.query(query, cancel).await
    }

    async fn find_by_severity(
        &self,
        severity: Severity,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ComplaintRecord>, StoreError> {
        self.query(Query::Severity { severity, limit }, cancel).await
    }

    async fn find_unresolved(
        &self,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ComplaintRecord>, StoreError> {
        self.query(Query::Unresolved { limit }, cancel).await
    }

    /// Case-insensitive text search; an empty query matches every record.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ComplaintRecord>, StoreError> {
        let query = Query::Text {
            query: query.to_string(),
            limit,
        };
        self.query(query, cancel).await
    }
}

/// Build a repository over `root`, cached when `cache` is set.
pub fn build_repository(
    root: impl AsRef<Path>,
    cache: Option<CacheSettings>,
    tracer: Arc<dyn Tracer>,
) -> Arc<dyn ComplaintRepository> {
    let store = FileComplaintStore::new(root);
    match cache {
        Some(settings) => {
            let cache = RecordCache::new(store, settings, Arc::clone(&tracer));
            Arc::new(CachedRepository::new(Arc::new(cache), tracer))
        }
        None => Arc::new(FileRepository::new(store, tracer)),
    }
}

/// Run blocking filesystem work off the async runtime.
///
/// Fails with `Cancelled` without spawning when `cancel` already fired.
pub(crate) async fn run_blocking<T, F>(
    cancel: &CancellationToken,
    work: F,
) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled);
    }
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| StoreError::Task(err.to_string()))?
}
