use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// `(student, assignment)` key under which a submission is stored.
///
/// Both parts are used as path components by [`ArchiveStore`](crate::ArchiveStore),
/// so they must be non-empty and free of path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionIdentity {
    pub assignment: String,
    pub student_id: String,
}

impl SubmissionIdentity {
    /// Build a validated identity. Surrounding whitespace is trimmed.
    pub fn new(
        student_id: impl Into<String>,
        assignment: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let student_id = validate_part("student_id", student_id.into())?;
        let assignment = validate_part("assignment", assignment.into())?;
        Ok(Self {
            assignment,
            student_id,
        })
    }
}

fn validate_part(name: &str, value: String) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidIdentity(format!("{name} must not be empty")));
    }
    if trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\', '\0']) {
        return Err(StoreError::InvalidIdentity(format!(
            "{name} {trimmed:?} is not a valid path component"
        )));
    }
    Ok(trimmed.to_string())
}

impl fmt::Display for SubmissionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.assignment, self.student_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_displays() {
        let id = SubmissionIdentity::new(" 40131 ", "decision-tree").expect("valid");
        assert_eq!(id.student_id, "40131");
        assert_eq!(id.to_string(), "decision-tree/40131");
    }

    #[test]
    fn rejects_empty_and_path_like_parts() {
        assert!(SubmissionIdentity::new("", "hw1").is_err());
        assert!(SubmissionIdentity::new("s1", "  ").is_err());
        assert!(SubmissionIdentity::new("../s1", "hw1").is_err());
        assert!(SubmissionIdentity::new("s1", "..").is_err());
        assert!(SubmissionIdentity::new("a\\b", "hw1").is_err());
    }
}
