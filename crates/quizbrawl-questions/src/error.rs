//! Error types for question sourcing.

/// Errors from fetching or decoding questions.
#[derive(Debug, thiserror::Error)]
pub enum QuestionSourceError {
    /// Transport-level failure: connection refused, timeout, bad JSON.
    #[error("question service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("question service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The service answered successfully but sent no questions.
    #[error("question service returned an empty question list")]
    Empty,
}
