//! File-per-record persistent store; the source of truth for complaints.

use crate::error::StoreError;
use crate::model::ComplaintRecord;
use log::{debug, info, warn};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Extension of record files.
const RECORD_EXTENSION: &str = "json";
/// Suffix for in-flight writes; renamed over the target when complete.
const TEMP_SUFFIX: &str = "tmp";
/// Timestamp layout used in filenames (UTC).
const FILENAME_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Stores each complaint as `<id>-<YYYY-MM-DD_HH-MM-SS>.json` under a root directory.
///
/// Writes go to a temporary sibling and are renamed into place, so a reader
/// never observes a half-written record. The store does no locking of its
/// own; callers serialize mutations of the same record.
#[derive(Debug, Clone)]
pub struct FileComplaintStore {
    root: PathBuf,
}

impl FileComplaintStore {
    /// Create a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        info!("initialized file complaint store (root={})", root.display());
        Self { root }
    }

    /// Directory holding the record files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic path for a record, derived from its id and creation time.
    pub fn record_path(&self, record: &ComplaintRecord) -> PathBuf {
        self.root.join(format!(
            "{}-{}.{RECORD_EXTENSION}",
            record.id,
            record.timestamp.format(FILENAME_TIME_FORMAT)
        ))
    }

    /// Persist a record and return it as written.
    ///
    /// If a file for the same id already exists it is rewritten in place with
    /// the same rules as `update`: the stored creation time is kept and a
    /// stored resolution is never undone.
    pub fn save(&self, record: &ComplaintRecord) -> Result<ComplaintRecord, StoreError> {
        record.check_resolution()?;
        fs::create_dir_all(&self.root)
            .map_err(|err| StoreError::io("create directory", &self.root, err))?;
        let (path, next) = match self.locate(record.id)? {
            Some(existing) => {
                warn!(
                    "record already persisted; rewriting in place (id={}, path={})",
                    record.id,
                    existing.display()
                );
                let next = match read_record(&existing)? {
                    RecordFile::Parsed(stored) => record.clone().rewrite_of(&stored),
                    RecordFile::Missing | RecordFile::Malformed(_) => record.clone(),
                };
                (existing, next)
            }
            None => (self.record_path(record), record.clone()),
        };
        write_atomic(&path, &next)?;
        debug!(
            "saved complaint (id={}, severity={}, path={})",
            next.id,
            next.severity,
            path.display()
        );
        Ok(next)
    }

    /// Load every parseable record, oldest first.
    ///
    /// A missing directory yields no records. Files that fail to parse are
    /// skipped with a warning.
    pub fn load_all(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        let mut records = Vec::new();
        for path in self.record_files()? {
            match read_record(&path)? {
                RecordFile::Parsed(record) => records.push(record),
                RecordFile::Missing => {}
                RecordFile::Malformed(err) => {
                    warn!(
                        "skipping malformed complaint file (path={}): {err}",
                        path.display()
                    );
                }
            }
        }
        records.sort_by_key(ComplaintRecord::creation_key);
        debug!(
            "loaded complaints (root={}, count={})",
            self.root.display(),
            records.len()
        );
        Ok(records)
    }

    /// Find a record by id.
    ///
    /// Looks for the `<id>-` filename first and falls back to a full scan for
    /// files whose names do not follow the pattern.
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<ComplaintRecord>, StoreError> {
        if let Some(path) = self.locate(id)? {
            match read_record(&path)? {
                RecordFile::Parsed(record) if record.id == id => return Ok(Some(record)),
                RecordFile::Parsed(_) | RecordFile::Missing => {}
                RecordFile::Malformed(err) => {
                    warn!(
                        "complaint file unreadable, falling back to scan (path={}): {err}",
                        path.display()
                    );
                }
            }
        }
        Ok(self.load_all()?.into_iter().find(|record| record.id == id))
    }

    /// Rewrite an existing record's file in place.
    ///
    /// The filename is never changed and the creation timestamp stored in the
    /// file wins over whatever the caller passed. Resolution is terminal: a
    /// resolved record stays resolved with its original metadata. Returns the
    /// record as written.
    pub fn update(&self, record: &ComplaintRecord) -> Result<ComplaintRecord, StoreError> {
        record.check_resolution()?;
        let path = self.locate(record.id)?.ok_or(StoreError::NotFound(record.id))?;
        let stored = match read_record(&path)? {
            RecordFile::Parsed(stored) => stored,
            RecordFile::Missing => return Err(StoreError::NotFound(record.id)),
            RecordFile::Malformed(err) => {
                return Err(StoreError::io("parse record", &path, err.into()));
            }
        };
        if stored.is_resolved() && !record.is_resolved() {
            warn!(
                "ignoring attempt to reopen a resolved complaint (id={})",
                record.id
            );
        }
        let next = record.clone().rewrite_of(&stored);
        write_atomic(&path, &next)?;
        debug!(
            "updated complaint (id={}, resolved={}, path={})",
            next.id,
            next.is_resolved(),
            path.display()
        );
        Ok(next)
    }

    /// Path of the file holding `id`, if one exists.
    fn locate(&self, id: Uuid) -> Result<Option<PathBuf>, StoreError> {
        let prefix = format!("{id}-");
        Ok(self.record_files()?.into_iter().find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix))
        }))
    }

    /// All `*.json` files directly under the root, sorted by name.
    fn record_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io("read directory", &self.root, err)),
        };
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StoreError::io("read directory", &self.root, err))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if !path.is_file() {
                continue;
            }
            files.push(path);
        }
        files.sort();
        Ok(files)
    }
}

/// What a record file turned out to hold.
enum RecordFile {
    Parsed(ComplaintRecord),
    /// Vanished since the directory listing.
    Missing,
    Malformed(serde_json::Error),
}

/// Read one record file. Only filesystem failures are errors.
fn read_record(path: &Path) -> Result<RecordFile, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(RecordFile::Missing),
        Err(err) => return Err(StoreError::io("read record", path, err)),
    };
    match serde_json::from_slice::<ComplaintRecord>(&bytes) {
        Ok(mut record) => {
            if record.normalize_resolution() {
                debug!(
                    "normalized resolution fields (id={}, path={})",
                    record.id,
                    path.display()
                );
            }
            Ok(RecordFile::Parsed(record))
        }
        Err(err) => Ok(RecordFile::Malformed(err)),
    }
}

/// Write the record to a temporary sibling, then rename it over `path`.
fn write_atomic(path: &Path, record: &ComplaintRecord) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".");
    temp_name.push(TEMP_SUFFIX);
    let temp_path = PathBuf::from(temp_name);
    {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_path)
            .map_err(|err| StoreError::io("write record", &temp_path, err))?;
        file.write_all(&bytes)
            .and_then(|()| file.sync_all())
            .map_err(|err| StoreError::io("write record", &temp_path, err))?;
    }
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::io("rename record", path, err));
    }
    Ok(())
}
