use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Tracker state could not be serialized or deserialized.
    #[error("tracker state: {0}")]
    TrackerState(#[from] serde_json::Error),
    /// A wage record references an employer missing from the employer pool.
    /// This aborts the write immediately; the partial file is left in place.
    #[error("employee {ssn} references unknown employer FEIN {fein}")]
    UnknownEmployer { ssn: String, fein: String },
    #[error("malformed fixed-width line: {0}")]
    MalformedLine(String),
    /// Error reported by the portal submission client.
    #[error("submission failed: {0}")]
    Submission(String),
    #[error("post-submission callback failed: {0}")]
    Callback(String),
    /// The fail-fast circuit breaker: too many failures in a row.
    #[error("{count} consecutive submission failures; stopping the stream")]
    ConsecutiveFailures { count: usize },
}
