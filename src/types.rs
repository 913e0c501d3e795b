//! Core types for feedstock-automerge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrComment {
    /// Comment ID
    pub id: u64,
    /// Comment body text
    pub body: String,
}

/// Platform configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom API base URL (None for api.github.com)
    pub api_base: Option<String>,
}

impl PlatformConfig {
    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open and can be merged
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// PR details needed to gate, evaluate and merge a PR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestDetails {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Login of the PR author
    pub author: String,
    /// Names of the labels on the PR
    pub labels: Vec<String>,
    /// Current state of the PR
    pub state: PrState,
    /// Whether PR is a draft
    pub is_draft: bool,
    /// Whether PR can be merged
    /// - `Some(true)` = mergeable
    /// - `Some(false)` = has conflicts
    /// - `None` = unknown (GitHub still computing)
    pub mergeable: Option<bool>,
    /// GitHub's `mergeable_state` (`clean`, `dirty`, `blocked`, ...)
    pub mergeable_state: Option<String>,
    /// SHA of the head commit
    pub head_sha: String,
}

impl PullRequestDetails {
    /// Whether the PR carries a label with this exact name
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }
}

/// A legacy commit status as reported by the statuses API.
///
/// The API returns every status event ever posted for the commit, so the
/// same context usually shows up several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSignal {
    /// Status context (e.g. `continuous-integration/travis-ci/pr`)
    pub context: String,
    /// Raw state (`pending`, `success`, `failure`, `error`)
    pub state: String,
    /// When this status event was last updated
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a check suite or check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Created but not started
    Queued,
    /// Running
    InProgress,
    /// Finished; the conclusion is meaningful
    Completed,
    /// Anything GitHub adds later (`requested`, `waiting`, ...)
    #[serde(other)]
    Other,
}

/// A check as reported by the check-suites API.
///
/// Checks carry no timestamp, so the last one seen for a name wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSignal {
    /// Reporter name (the app slug for check suites)
    pub name: String,
    /// Lifecycle status
    pub status: CheckStatus,
    /// Conclusion once completed (`success`, `failure`, `neutral`, ...)
    pub conclusion: Option<String>,
}

/// Tri-state outcome of one reporter or requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalState {
    /// Reported success
    Passing,
    /// Reported failure, error, cancellation, ...
    Failing,
    /// Not reported yet or still running
    Pending,
}

impl SignalState {
    /// Whether this is [`SignalState::Passing`]
    pub const fn is_passing(self) -> bool {
        matches!(self, Self::Passing)
    }
}

impl std::fmt::Display for SignalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passing => write!(f, "passed"),
            Self::Failing => write!(f, "failed"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// Outcome of one evaluation pass over a PR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeDecision {
    /// Whether the PR was merged
    pub allowed: bool,
    /// Human-readable explanation
    pub reason: String,
}

impl MergeDecision {
    /// A successful merge
    pub fn merged(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    /// Anything that stopped the merge
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// Result of a merge operation
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    /// Squash all commits into one
    Squash,
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// Parameters of a merge call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// Commit title
    pub title: String,
    /// Commit message
    pub message: String,
    /// Merge strategy
    pub method: MergeMethod,
    /// Head SHA the PR must still point at
    pub expected_sha: String,
}
