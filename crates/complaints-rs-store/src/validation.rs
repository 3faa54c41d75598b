//! Input checks applied at the tool boundary, before a record is built.
//!
//! Nothing in the store calls these implicitly.

use crate::error::StoreError;
use crate::model::{NewComplaint, Severity};

/// Longest accepted agent, session or project name, in characters.
pub const MAX_NAME_LEN: usize = 200;
/// Longest accepted free-text field, in characters.
pub const MAX_TEXT_LEN: usize = 10_000;

/// Check required fields and length limits of a new complaint.
pub fn validate_new_complaint(input: &NewComplaint) -> Result<(), StoreError> {
    require("agent_name", &input.agent_name)?;
    require("task_description", &input.task_description)?;

    for (field, value) in [
        ("agent_name", &input.agent_name),
        ("session_name", &input.session_name),
        ("project_name", &input.project_name),
    ] {
        check_len(field, value, MAX_NAME_LEN)?;
    }
    for (field, value) in [
        ("task_description", &input.task_description),
        ("context_info", &input.context_info),
        ("missing_info", &input.missing_info),
        ("confused_by", &input.confused_by),
        ("future_wishes", &input.future_wishes),
    ] {
        check_len(field, value, MAX_TEXT_LEN)?;
    }
    Ok(())
}

/// Parse a severity name supplied by a caller.
pub fn parse_severity(value: &str) -> Result<Severity, StoreError> {
    value.parse()
}

fn require(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::ValidationFailed {
            field,
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), StoreError> {
    let len = value.chars().count();
    if len > max {
        return Err(StoreError::ValidationFailed {
            field,
            message: format!("length {len} exceeds maximum {max}"),
        });
    }
    Ok(())
}
