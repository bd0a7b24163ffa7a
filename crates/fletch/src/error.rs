//! Error types.

/// Errors surfaced by request construction and execution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed query fragment `{0}`: missing `=` separator")]
    MalformedQuery(String),

    #[error("failed to encode payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to read upload file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e)
    }
}
