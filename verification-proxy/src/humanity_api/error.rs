use thiserror::Error;

/// Error types for calls to the Humanity Protocol verification API
#[derive(Debug, Error)]
pub enum HumanityApiError {
    /// `HP_API_URL` is not configured, the upstream is never contacted
    #[error("API URL not configured")]
    MissingApiUrl,

    /// `HP_API_KEY` is not configured, the upstream is never contacted
    #[error("API key not configured")]
    MissingApiKey,

    /// DNS failure, refused connection, timeout or reset while talking to the upstream
    #[error("Network error: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The upstream answered with something that is not JSON
    #[error("Invalid response body: {0}")]
    InvalidBody(#[from] reqwest::Error),

    /// The upstream answered with JSON that is not an object
    #[error("Invalid response body: expected a JSON object")]
    NotAnObject,
}
