//! File-backed complaint storage with an eviction-aware read cache.

pub mod cache;
pub mod error;
pub mod model;
pub mod query;
pub mod repository;
pub mod store;
pub mod trace;
pub mod validation;

/// Cache layer, settings and statistics.
pub use cache::{CacheSettings, CacheStats, EvictionPolicy, RecordCache};
/// Storage error type.
pub use error::StoreError;
/// Complaint record model.
pub use model::{ComplaintRecord, NewComplaint, Severity};
pub use query::Query;
/// Repository facade and its implementations.
pub use repository::{CachedRepository, ComplaintRepository, FileRepository, build_repository};
/// Persistent file store.
pub use store::FileComplaintStore;
/// Tracing capability injected into store components.
pub use trace::{LogTracer, NoopTracer, Span, Tracer};
pub use validation::{parse_severity, validate_new_complaint};
