//! Listing, filtering and text search over creation-ordered records.
//!
//! Every function expects its input sorted oldest first (as returned by
//! `FileComplaintStore::load_all` and `RecordCache::snapshot`) and preserves
//! that order, so results are identical whether they come from disk or cache.

use crate::model::{ComplaintRecord, Severity};
use std::borrow::Borrow;

/// A read-only query against the full record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// One page of all records.
    Page { limit: usize, offset: usize },
    /// Records whose project name equals `name`.
    Project { name: String, limit: usize },
    /// Records with the given severity.
    Severity { severity: Severity, limit: usize },
    /// Records not yet resolved.
    Unresolved { limit: usize },
    /// Case-insensitive substring search over the text fields.
    Text { query: String, limit: usize },
}

impl Query {
    /// Short name used for spans and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Query::Page { .. } => "list",
            Query::Project { .. } => "find_by_project",
            Query::Severity { .. } => "find_by_severity",
            Query::Unresolved { .. } => "find_unresolved",
            Query::Text { .. } => "search",
        }
    }

    /// Evaluate against creation-ordered records.
    pub fn run<R: Borrow<ComplaintRecord>>(&self, records: &[R]) -> Vec<ComplaintRecord> {
        match self {
            Query::Page { limit, offset } => paginate(records, *limit, *offset),
            Query::Project { name, limit } => filter_limited(records, by_project(name), *limit),
            Query::Severity { severity, limit } => {
                filter_limited(records, by_severity(*severity), *limit)
            }
            Query::Unresolved { limit } => filter_limited(records, unresolved, *limit),
            Query::Text { query, limit } => search(records, query, *limit),
        }
    }
}

/// Sort oldest first; ties broken by id so the order is total.
pub fn sort_by_creation(records: &mut [ComplaintRecord]) {
    records.sort_by_key(ComplaintRecord::creation_key);
}

/// `limit` records starting at `offset`; empty when `offset` is past the end.
pub fn paginate<R: Borrow<ComplaintRecord>>(
    records: &[R],
    limit: usize,
    offset: usize,
) -> Vec<ComplaintRecord> {
    records
        .iter()
        .skip(offset)
        .take(limit)
        .map(|record| Borrow::<ComplaintRecord>::borrow(record).clone())
        .collect()
}

/// First `limit` records matching `predicate`, stopping early once satisfied.
pub fn filter_limited<R, P>(records: &[R], predicate: P, limit: usize) -> Vec<ComplaintRecord>
where
    R: Borrow<ComplaintRecord>,
    P: Fn(&ComplaintRecord) -> bool,
{
    records
        .iter()
        .map(Borrow::<ComplaintRecord>::borrow)
        .filter(|record| predicate(*record))
        .take(limit)
        .cloned()
        .collect()
}

/// Exact, case-sensitive project name match.
pub fn by_project(name: &str) -> impl Fn(&ComplaintRecord) -> bool + '_ {
    move |record| record.project_name == name
}

pub fn by_severity(severity: Severity) -> impl Fn(&ComplaintRecord) -> bool {
    move |record| record.severity == severity
}

pub fn unresolved(record: &ComplaintRecord) -> bool {
    !record.is_resolved()
}

/// First `limit` records containing `query` in any searchable field, ignoring case.
pub fn search<R: Borrow<ComplaintRecord>>(
    records: &[R],
    query: &str,
    limit: usize,
) -> Vec<ComplaintRecord> {
    let needle = query.to_lowercase();
    filter_limited(records, |record| record.matches_text(&needle), limit)
}
