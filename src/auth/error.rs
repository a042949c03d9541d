use thiserror::Error;

/// Failures while minting an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The accounts server answered 200 with an `error` payload.
    #[error("Token request rejected: {0}")]
    Rejected(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Token store error: {0}")]
    Store(String),
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidResponse(error.to_string())
    }
}
