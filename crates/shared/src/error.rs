use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DocumentFormat;

/// One violated intake constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum FileRejection {
    #[error("Too many files")]
    TooManyFiles { selected: usize },
    #[error("File type must be one of {}", DocumentFormat::accepted_list())]
    InvalidType { file_name: String, media_type: String },
    #[error("File is larger than {limit} bytes")]
    TooLarge {
        file_name: String,
        size_bytes: u64,
        limit: u64,
    },
}

/// Ordered list of every constraint a selection violated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReason {
    violations: Vec<FileRejection>,
}

impl RejectionReason {
    pub fn new(violations: Vec<FileRejection>) -> Self {
        Self { violations }
    }

    pub fn push(&mut self, violation: FileRejection) {
        self.violations.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FileRejection] {
        &self.violations
    }

    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File rejected: {}", self.messages().join("; "))
    }
}

impl std::error::Error for RejectionReason {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_type_message_lists_allowed_formats() {
        let rejection = FileRejection::InvalidType {
            file_name: "photo.png".into(),
            media_type: "image/png".into(),
        };
        assert_eq!(
            rejection.to_string(),
            "File type must be one of application/pdf, .pdf, \
             application/vnd.openxmlformats-officedocument.wordprocessingml.document, .docx, \
             text/plain, .txt"
        );
    }

    #[test]
    fn reason_keeps_violation_order() {
        let mut reason = RejectionReason::default();
        reason.push(FileRejection::TooManyFiles { selected: 2 });
        reason.push(FileRejection::TooLarge {
            file_name: "a.pdf".into(),
            size_bytes: 20,
            limit: 10,
        });
        assert_eq!(
            reason.messages(),
            vec!["Too many files", "File is larger than 10 bytes"]
        );
        assert_eq!(
            reason.to_string(),
            "File rejected: Too many files; File is larger than 10 bytes"
        );
    }
}
