use thiserror::Error;

/// Failures while wiring up a client. Submission failures are not errors;
/// they end up in `WorkflowState::Failed`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid summary endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
    #[error("summary endpoint must use http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
