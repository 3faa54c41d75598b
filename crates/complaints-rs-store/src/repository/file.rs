//! Repository without an index; every call goes to disk.

use super::{ComplaintRepository, run_blocking};
use crate::cache::CacheStats;
use crate::error::StoreError;
use crate::model::ComplaintRecord;
use crate::query::Query;
use crate::store::FileComplaintStore;
use crate::trace::Tracer;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Uncached repository proxying to a `FileComplaintStore`.
///
/// Every write (`save`, `update`, `resolve`) is serialized by one mutex: each
/// of them reads the stored record before rewriting it.
#[derive(Clone)]
pub struct FileRepository {
    store: FileComplaintStore,
    write_lock: Arc<Mutex<()>>,
    tracer: Arc<dyn Tracer>,
}

impl FileRepository {
    pub fn new(store: FileComplaintStore, tracer: Arc<dyn Tracer>) -> Self {
        info!(
            "using uncached complaint repository (root={})",
            store.root().display()
        );
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
            tracer,
        }
    }

    pub fn store(&self) -> &FileComplaintStore {
        &self.store
    }
}

#[async_trait]
impl ComplaintRepository for FileRepository {
    async fn save(
        &self,
        record: ComplaintRecord,
        cancel: &CancellationToken,
    ) -> Result<ComplaintRecord, StoreError> {
        let span = self.tracer.start("repository.save");
        let store = self.store.clone();
        let lock = Arc::clone(&self.write_lock);
        let result = run_blocking(cancel, move || {
            let _guard = lock.lock();
            store.save(&record)
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
        let store = self.store.clone();
        let result = run_blocking(cancel, move || {
            store.find_by_id(id)?.ok_or(StoreError::NotFound(id))
        })
        .await;
        span.end();
        result
    }

    async fn query(
        &self,
        query: Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<ComplaintRecord>, StoreError> {
        let span = self.tracer.start("repository.query");
        let store = self.store.clone();
        let result = run_blocking(cancel, move || {
            let records = store.load_all()?;
            let matched = query.run(&records);
            debug!(
                "scanned complaints from disk (query={}, scanned={}, matched={})",
                query.name(),
                records.len(),
                matched.len()
            );
            Ok(matched)
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
        let store = self.store.clone();
        let lock = Arc::clone(&self.write_lock);
        let result = run_blocking(cancel, move || {
            let _guard = lock.lock();
            store.update(&record)
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
        let store = self.store.clone();
        let lock = Arc::clone(&self.write_lock);
        let resolved_by = resolved_by.to_string();
        let result = run_blocking(cancel, move || {
            let _guard = lock.lock();
            let mut record = store.find_by_id(id)?.ok_or(StoreError::NotFound(id))?;
            if !record.resolve(&resolved_by, Utc::now()) {
                debug!("complaint already resolved (id={id})");
                return Ok(record);
            }
            let written = store.update(&record)?;
            info!("complaint resolved (id={id}, resolved_by={resolved_by})");
            Ok(written)
        })
        .await;
        span.end();
        result
    }

    fn get_cache_stats(&self) -> CacheStats {
        CacheStats::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::FileRepository;
    use crate::error::StoreError;
    use crate::model::{ComplaintRecord, NewComplaint, Severity};
    use crate::repository::ComplaintRepository;
    use crate::store::FileComplaintStore;
    use crate::trace::NoopTracer;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;

    fn record() -> ComplaintRecord {
        ComplaintRecord::new(NewComplaint {
            agent_name: "agent".to_string(),
            session_name: String::new(),
            project_name: "atlas".to_string(),
            task_description: "x".to_string(),
            context_info: String::new(),
            missing_info: String::new(),
            confused_by: String::new(),
            future_wishes: String::new(),
            severity: Severity::High,
        })
    }

    #[tokio::test]
    async fn resolve_persists_once() {
        let temp = tempdir().expect("tempdir");
        let store = FileComplaintStore::new(temp.path());
        let repo = FileRepository::new(store, Arc::new(NoopTracer));
        let cancel = CancellationToken::new();
        let saved = repo.save(record(), &cancel).await.expect("save");

        let first = repo.resolve(saved.id, "alice", &cancel).await.expect("resolve");
        let second = repo.resolve(saved.id, "bob", &cancel).await.expect("again");
        assert_eq!(first, second);
        assert_eq!(repo.find_by_id(saved.id, &cancel).await.expect("find"), first);
        assert_eq!(repo.get_cache_stats().max_size, 0);
    }

    #[tokio::test]
    async fn cancelled_token_skips_io() {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("records");
        let repo = FileRepository::new(FileComplaintStore::new(&root), Arc::new(NoopTracer));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = repo.save(record(), &cancel).await.unwrap_err();
        assert!(matches!(err, StoreError::Cancelled));
        assert!(!root.exists(), "nothing written after cancellation");
    }
}
