use thiserror::Error;

/// Failure talking to the search provider. Always scoped to one search
/// candidate or one detail fetch.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("could not decode provider response: {0}")]
    Decode(String),

    #[error("invalid provider request: {0}")]
    InvalidRequest(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("no search candidates were supplied")]
    EmptyInput,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {key} has an invalid value {value:?}")]
    Parse { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Validation(String),
}
