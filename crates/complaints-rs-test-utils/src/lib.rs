//! Test helpers shared across complaints-rs crates.

pub mod records;
pub mod tracer;

pub use records::{ComplaintBuilder, complaint, sample_records, write_corrupt_file};
pub use tracer::RecordingTracer;
