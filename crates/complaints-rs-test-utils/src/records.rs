use chrono::{DateTime, Duration, TimeZone, Utc};
use complaints_rs_store::{ComplaintRecord, NewComplaint, Severity};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Fixed creation time so filenames and ordering are predictable.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Builder for complaint records with sensible defaults.
#[derive(Clone, Debug)]
pub struct ComplaintBuilder {
    id: Uuid,
    timestamp: DateTime<Utc>,
    input: NewComplaint,
}

impl ComplaintBuilder {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: base_time(),
            input: NewComplaint {
                agent_name: "test-agent".to_string(),
                session_name: "test-session".to_string(),
                project_name: "test-project".to_string(),
                task_description: "x".to_string(),
                context_info: String::new(),
                missing_info: String::new(),
                confused_by: String::new(),
                future_wishes: String::new(),
                severity: Severity::Medium,
            },
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Creation time as an offset from `base_time`.
    pub fn at_offset(mut self, seconds: i64) -> Self {
        self.timestamp = base_time() + Duration::seconds(seconds);
        self
    }

    pub fn project(mut self, project: &str) -> Self {
        self.input.project_name = project.to_string();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.input.severity = severity;
        self
    }

    pub fn task(mut self, task: &str) -> Self {
        self.input.task_description = task.to_string();
        self
    }

    pub fn missing_info(mut self, missing: &str) -> Self {
        self.input.missing_info = missing.to_string();
        self
    }

    pub fn build(self) -> ComplaintRecord {
        ComplaintRecord::with_identity(self.id, self.timestamp, self.input)
    }
}

impl Default for ComplaintBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Start a new complaint builder.
pub fn complaint() -> ComplaintBuilder {
    ComplaintBuilder::new()
}

/// `count` records one second apart, rotating projects and severities.
pub fn sample_records(count: usize) -> Vec<ComplaintRecord> {
    let projects = ["atlas", "borealis", "cygnus"];
    let severities = Severity::all();
    (0..count)
        .map(|i| {
            complaint()
                .at_offset(i as i64)
                .project(projects[i % projects.len()])
                .severity(severities[i % severities.len()])
                .task(&format!("task number {i}"))
                .build()
        })
        .collect()
}

/// Drop a truncated JSON file into `dir` and return its path.
pub fn write_corrupt_file(dir: &Path) -> PathBuf {
    let path = dir.join(format!("{}-2025-05-01_09-00-00.json", Uuid::new_v4()));
    std::fs::create_dir_all(dir).expect("create record dir");
    std::fs::write(&path, "{\"id\": \"truncated").expect("write corrupt record");
    path
}
