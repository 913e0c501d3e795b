//! Error types for feedstock-automerge
//!
//! Only fatal conditions are errors. Policy blocks, pending or failing
//! signals and declined merges are reported as a
//! [`MergeDecision`](crate::types::MergeDecision) instead.

use thiserror::Error;

/// Errors that abort an evaluation
#[derive(Debug, Error)]
pub enum Error {
    /// The triggering event type is not one we know how to handle
    #[error("GitHub event {0} cannot be processed!")]
    UnrecognizedEvent(String),

    /// The event payload is missing a field we need
    #[error("invalid event payload: {0}")]
    EventPayload(String),

    /// The repository policy document is missing or unparseable
    #[error("configuration error: {0}")]
    Config(String),

    /// No usable API token was found
    #[error("authentication error: {0}")]
    Auth(String),

    /// GitHub API call failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
