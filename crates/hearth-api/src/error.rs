// Error taxonomy for hub API calls.
//
// Three failure classes reach callers: transport (network/connectivity),
// status (non-2xx response), decode (malformed payload). Consumers that
// only need a human-readable reason use the Display impl.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network-level failure: DNS, connect, TLS, timeout.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The hub answered with a non-success status code.
    #[error("hub returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The hub rejected the access token.
    #[error("authentication rejected: {message}")]
    Authentication { message: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode hub response: {message}")]
    Decode { message: String },

    /// The configured base URL is not a valid URL.
    #[error("invalid hub URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
