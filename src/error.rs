//! Failure taxonomy for the rate-resolution engine.
//!
//! Expected absences never show up here: a cache miss, a date with no
//! published rates, and an exhausted search are all plain data (`None`) at
//! their call sites. Only conditions that abort a resolution are errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateError {
    /// Date input that survives neither the canonical nor the loose parser.
    #[error("could not interpret '{0}' as a date")]
    InvalidDate(String),

    /// Connectivity-level failure talking to the rate source.
    #[error("rate source request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success, non-404 status from the rate source.
    #[error("rate source returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// Response body that does not deserialize into a rate snapshot.
    #[error("malformed rate payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Cooperative abort requested by the caller.
    #[error("resolution cancelled")]
    Cancelled,
}
