use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Document formats the summarizer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 3] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::PlainText,
    ];

    pub fn media_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentFormat::PlainText => "text/plain",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => ".pdf",
            DocumentFormat::Docx => ".docx",
            DocumentFormat::PlainText => ".txt",
        }
    }

    /// Matches on the bare MIME type, ignoring parameters such as `charset`.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let normalized = media_type
            .split(';')
            .next()
            .map(str::trim)
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.media_type() == normalized)
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| lower.ends_with(format.extension()))
    }

    /// Human readable allow-list, media types and extensions interleaved.
    pub fn accepted_list() -> String {
        Self::ALL
            .iter()
            .map(|format| format!("{}, {}", format.media_type(), format.extension()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::PlainText => "TXT",
        };
        f.write_str(label)
    }
}

/// Where the bytes of a selected file come from. Only read when the upload
/// payload is built.
#[derive(Clone, PartialEq, Eq)]
pub enum UploadSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

impl fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            UploadSource::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

/// A file picked by the user that has not been validated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub size_bytes: u64,
    pub media_type: String,
    pub source: UploadSource,
}

impl CandidateFile {
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            media_type: media_type.into(),
            source: UploadSource::Memory(bytes),
        }
    }

    pub fn from_path(
        name: impl Into<String>,
        media_type: impl Into<String>,
        size_bytes: u64,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            media_type: media_type.into(),
            source: UploadSource::Path(path.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response was obtained from the endpoint.
    ConnectivityFailure,
    /// The endpoint did not answer within the request timeout.
    TimeoutFailure,
    /// Non-2xx status.
    ServerFailure,
    /// 2xx status with a body that carries no usable summary.
    ProtocolFailure,
    /// The accepted file could not be read to build the upload.
    LocalFileFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::ConnectivityFailure => "connectivity failure",
            ErrorKind::TimeoutFailure => "timeout failure",
            ErrorKind::ServerFailure => "server failure",
            ErrorKind::ProtocolFailure => "protocol failure",
            ErrorKind::LocalFileFailure => "local file failure",
        };
        f.write_str(label)
    }
}

/// Outcome of one completed exchange with the summarizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmissionResult {
    Success { summary: String },
    Failure { message: String, kind: ErrorKind },
}

impl SubmissionResult {
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        SubmissionResult::Failure {
            message: message.into(),
            kind,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            SubmissionResult::Success { .. } => None,
            SubmissionResult::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// Current phase of the submission workflow as seen by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    #[default]
    Idle,
    Pending,
    Succeeded {
        summary: String,
    },
    Failed {
        message: String,
        kind: ErrorKind,
    },
}

impl WorkflowState {
    pub fn is_idle(&self) -> bool {
        matches!(self, WorkflowState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, WorkflowState::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Succeeded { .. } | WorkflowState::Failed { .. }
        )
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            WorkflowState::Succeeded { summary } => Some(summary),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<(ErrorKind, &str)> {
        match self {
            WorkflowState::Failed { message, kind } => Some((*kind, message)),
            _ => None,
        }
    }
}

impl From<SubmissionResult> for WorkflowState {
    fn from(value: SubmissionResult) -> Self {
        match value {
            SubmissionResult::Success { summary } => WorkflowState::Succeeded { summary },
            SubmissionResult::Failure { message, kind } => WorkflowState::Failed { message, kind },
        }
    }
}
