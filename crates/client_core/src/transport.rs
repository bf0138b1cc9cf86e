//! Wire side of a submission: one multipart POST per attempt, and the
//! classification of whatever came back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::{ErrorKind, SubmissionResult},
    protocol::{SummaryResponse, UPLOAD_FIELD_NAME},
};
use tracing::{debug, warn};
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Bytes and metadata of the single multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Raw result of one attempt, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Response { status: u16, body: String },
    Transport(TransportFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// No response was obtained: DNS, refused connection, TLS, reset.
    Unreachable(String),
    TimedOut(Duration),
    /// Status line arrived but the body could not be read.
    BodyRead(String),
}

#[async_trait]
pub trait SummaryTransport: Send + Sync {
    fn endpoint(&self) -> &str;
    async fn send(&self, payload: &UploadPayload) -> AttemptOutcome;
}

/// Maps a raw attempt outcome onto the failure taxonomy.
pub fn classify(endpoint: &str, outcome: AttemptOutcome) -> SubmissionResult {
    match outcome {
        AttemptOutcome::Response { status, body } if (200..300).contains(&status) => {
            match serde_json::from_str::<SummaryResponse>(&body) {
                Ok(response) => match response.into_summary() {
                    Some(summary) => SubmissionResult::Success { summary },
                    None => SubmissionResult::failure(
                        ErrorKind::ProtocolFailure,
                        "No summary field in response",
                    ),
                },
                Err(err) => SubmissionResult::failure(
                    ErrorKind::ProtocolFailure,
                    format!("Invalid JSON in response: {err}"),
                ),
            }
        }
        AttemptOutcome::Response { status, body } => SubmissionResult::failure(
            ErrorKind::ServerFailure,
            format!("Server error: {status} - {body}"),
        ),
        AttemptOutcome::Transport(TransportFailure::Unreachable(_)) => SubmissionResult::failure(
            ErrorKind::ConnectivityFailure,
            connectivity_message(endpoint),
        ),
        AttemptOutcome::Transport(TransportFailure::TimedOut(timeout)) => {
            SubmissionResult::failure(
                ErrorKind::TimeoutFailure,
                format!("Request to {endpoint} timed out after {timeout:?}"),
            )
        }
        AttemptOutcome::Transport(TransportFailure::BodyRead(detail)) => {
            SubmissionResult::failure(
                ErrorKind::ProtocolFailure,
                format!("Failed to read response body: {detail}"),
            )
        }
    }
}

pub fn connectivity_message(endpoint: &str) -> String {
    format!(
        "Cannot connect to the API server. Please ensure the server is running on {endpoint}"
    )
}

/// Posts documents to the summarizer over HTTP. No cookies or auth headers
/// are ever attached.
#[derive(Debug, Clone)]
pub struct HttpSummaryTransport {
    http: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpSummaryTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let endpoint = endpoint.into();
        let parsed = Url::parse(&endpoint).map_err(|source| ClientError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        if timeout.is_zero() {
            return Err(ClientError::ZeroTimeout);
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, err: &reqwest::Error) -> TransportFailure {
        if err.is_timeout() {
            TransportFailure::TimedOut(self.timeout)
        } else {
            TransportFailure::Unreachable(err.to_string())
        }
    }

    fn build_form(payload: &UploadPayload) -> Form {
        let part = Part::bytes(payload.bytes.clone()).file_name(payload.file_name.clone());
        let part = match part.mime_str(&payload.media_type) {
            Ok(part) => part,
            Err(err) => {
                warn!(
                    media_type = %payload.media_type,
                    "unparseable media type, sending part without content type: {err}"
                );
                Part::bytes(payload.bytes.clone()).file_name(payload.file_name.clone())
            }
        };
        Form::new().part(UPLOAD_FIELD_NAME, part)
    }
}

#[async_trait]
impl SummaryTransport for HttpSummaryTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, payload: &UploadPayload) -> AttemptOutcome {
        debug!(
            endpoint = %self.endpoint,
            file = %payload.file_name,
            size = payload.bytes.len(),
            media_type = %payload.media_type,
            "uploading document"
        );

        let response = match self
            .http
            .post(&self.endpoint)
            .multipart(Self::build_form(payload))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!(endpoint = %self.endpoint, "request failed before a response: {err}");
                return AttemptOutcome::Transport(self.map_error(&err));
            }
        };

        let status = response.status().as_u16();
        debug!(status, "summary endpoint responded");

        match response.text().await {
            Ok(body) => {
                debug!(status, body = %body, "summary endpoint body");
                AttemptOutcome::Response { status, body }
            }
            Err(err) if err.is_timeout() => {
                AttemptOutcome::Transport(TransportFailure::TimedOut(self.timeout))
            }
            Err(err) => AttemptOutcome::Transport(TransportFailure::BodyRead(err.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
