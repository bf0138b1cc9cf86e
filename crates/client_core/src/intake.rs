//! Intake filter: decides whether a user's selection may be uploaded.
//!
//! Validation only looks at the metadata the selection source declared
//! (name, size, media type). File contents are never opened here.

use shared::{
    domain::{CandidateFile, DocumentFormat, UploadSource},
    error::{FileRejection, RejectionReason},
};

/// Only one document may be summarized per submission.
pub const MAX_FILES: usize = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakePolicy {
    pub max_file_bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeDecision {
    /// Nothing was selected; callers treat this as a no-op.
    Empty,
    Accepted(AcceptedFile),
    Rejected(RejectionReason),
}

/// A candidate that passed the intake filter. Only constructible here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedFile {
    name: String,
    size_bytes: u64,
    media_type: String,
    format: DocumentFormat,
    source: UploadSource,
}

impl AcceptedFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn source(&self) -> &UploadSource {
        &self.source
    }

    pub(crate) async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            UploadSource::Memory(bytes) => Ok(bytes.clone()),
            UploadSource::Path(path) => tokio::fs::read(path).await,
        }
    }
}

impl IntakePolicy {
    pub fn with_max_file_bytes(max_file_bytes: Option<u64>) -> Self {
        Self { max_file_bytes }
    }

    /// Accepts or rejects the whole selection. Every violated constraint is
    /// reported, too-many-files first and then per file in selection order.
    pub fn validate(&self, selection: Vec<CandidateFile>) -> IntakeDecision {
        if selection.is_empty() {
            return IntakeDecision::Empty;
        }

        let mut reason = RejectionReason::default();
        if selection.len() > MAX_FILES {
            reason.push(FileRejection::TooManyFiles {
                selected: selection.len(),
            });
        }

        let mut formats = Vec::with_capacity(selection.len());
        for candidate in &selection {
            let format = declared_format(candidate);
            if format.is_none() {
                reason.push(FileRejection::InvalidType {
                    file_name: candidate.name.clone(),
                    media_type: candidate.media_type.clone(),
                });
            }
            if let Some(limit) = self.max_file_bytes {
                if candidate.size_bytes > limit {
                    reason.push(FileRejection::TooLarge {
                        file_name: candidate.name.clone(),
                        size_bytes: candidate.size_bytes,
                        limit,
                    });
                }
            }
            formats.push(format);
        }

        if !reason.is_empty() {
            return IntakeDecision::Rejected(reason);
        }

        let (Some(candidate), Some(Some(format))) =
            (selection.into_iter().next(), formats.into_iter().next())
        else {
            return IntakeDecision::Empty;
        };

        let media_type = if candidate.media_type.trim().is_empty() {
            format.media_type().to_string()
        } else {
            candidate.media_type
        };

        IntakeDecision::Accepted(AcceptedFile {
            name: candidate.name,
            size_bytes: candidate.size_bytes,
            media_type,
            format,
            source: candidate.source,
        })
    }
}

/// The declared media type and the file extension must name the same format.
/// A selection source that declared no media type is judged by extension.
fn declared_format(candidate: &CandidateFile) -> Option<DocumentFormat> {
    let by_extension = DocumentFormat::from_file_name(&candidate.name)?;
    if candidate.media_type.trim().is_empty() {
        return Some(by_extension);
    }
    DocumentFormat::from_media_type(&candidate.media_type).filter(|format| *format == by_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, media_type: &str) -> CandidateFile {
        CandidateFile::from_bytes(name, media_type, b"document body".to_vec())
    }

    #[test]
    fn accepts_each_allowed_format() {
        let policy = IntakePolicy::default();
        for format in DocumentFormat::ALL {
            let name = format!("report{}", format.extension());
            match policy.validate(vec![candidate(&name, format.media_type())]) {
                IntakeDecision::Accepted(file) => {
                    assert_eq!(file.name(), name);
                    assert_eq!(file.format(), format);
                    assert_eq!(file.size_bytes(), 13);
                }
                other => panic!("expected acceptance for {format}, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_selection_is_a_no_op() {
        assert_eq!(
            IntakePolicy::default().validate(Vec::new()),
            IntakeDecision::Empty
        );
    }

    #[test]
    fn rejects_types_outside_the_allow_list() {
        let decision = IntakePolicy::default().validate(vec![candidate("photo.png", "image/png")]);
        let IntakeDecision::Rejected(reason) = decision else {
            panic!("expected rejection");
        };
        assert_eq!(reason.violations().len(), 1);
        assert!(matches!(
            &reason.violations()[0],
            FileRejection::InvalidType { file_name, .. } if file_name == "photo.png"
        ));
    }

    #[test]
    fn rejects_mismatched_type_and_extension() {
        let decision =
            IntakePolicy::default().validate(vec![candidate("notes.txt", "application/pdf")]);
        assert!(matches!(decision, IntakeDecision::Rejected(_)));
    }

    #[test]
    fn undeclared_media_type_falls_back_to_extension() {
        let decision = IntakePolicy::default().validate(vec![candidate("notes.txt", "")]);
        let IntakeDecision::Accepted(file) = decision else {
            panic!("expected acceptance");
        };
        assert_eq!(file.media_type(), "text/plain");
    }

    #[test]
    fn multi_file_selection_is_rejected_in_full() {
        let decision = IntakePolicy::default().validate(vec![
            candidate("a.pdf", "application/pdf"),
            candidate("b.txt", "text/plain"),
        ]);
        let IntakeDecision::Rejected(reason) = decision else {
            panic!("expected rejection");
        };
        assert_eq!(reason.messages(), vec!["Too many files"]);
    }

    #[test]
    fn reports_every_violation_in_order() {
        let policy = IntakePolicy::with_max_file_bytes(Some(4));
        let decision = policy.validate(vec![
            candidate("a.exe", "application/octet-stream"),
            candidate("b.pdf", "application/pdf"),
        ]);
        let IntakeDecision::Rejected(reason) = decision else {
            panic!("expected rejection");
        };
        let violations = reason.violations();
        assert_eq!(violations.len(), 4);
        assert!(matches!(violations[0], FileRejection::TooManyFiles { selected: 2 }));
        assert!(matches!(violations[1], FileRejection::InvalidType { .. }));
        assert!(matches!(violations[2], FileRejection::TooLarge { limit: 4, .. }));
        assert!(matches!(violations[3], FileRejection::TooLarge { .. }));
    }

    #[test]
    fn size_limit_is_inclusive() {
        let policy = IntakePolicy::with_max_file_bytes(Some(13));
        assert!(matches!(
            policy.validate(vec![candidate("a.txt", "text/plain")]),
            IntakeDecision::Accepted(_)
        ));
    }

    #[tokio::test]
    async fn accepted_path_source_is_read_lazily() {
        let path = std::env::temp_dir().join(format!("intake-{}.txt", std::process::id()));
        let candidate = CandidateFile::from_path("missing.txt", "text/plain", 5, &path);
        let IntakeDecision::Accepted(file) = IntakePolicy::default().validate(vec![candidate])
        else {
            panic!("metadata alone must be enough to accept");
        };
        assert!(file.read_bytes().await.is_err());

        tokio::fs::write(&path, b"hello").await.expect("write");
        assert_eq!(file.read_bytes().await.expect("read"), b"hello");
        tokio::fs::remove_file(&path).await.expect("cleanup");
    }
}
