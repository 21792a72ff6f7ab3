use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Error types for a single verification request
#[derive(Debug, Error)]
pub enum VerifyError {
    /// A required setting for the chosen route is missing
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    /// The proxy base URL cannot carry a path
    #[error("Invalid proxy URL: {0}")]
    InvalidProxyUrl(String),

    /// The request never got a response
    #[error("Network error: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    /// The verification endpoint answered with a non-success status
    #[error("Verification endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The answer is not a verification envelope
    #[error("Invalid response body: {0}")]
    InvalidBody(#[from] reqwest::Error),

    /// No answer within the request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}
