//! Platform services for GitHub
//!
//! Every effect the decision engine needs (reading signals and files,
//! commenting, merging) goes through these traits, so the engine can be
//! driven by a mock in tests.

mod github;
mod retry;

pub use github::GitHubService;
pub use retry::{RetryPolicy, retry_with_backoff};

use crate::error::Result;
use crate::types::{
    CheckSignal, MergeRequest, MergeResult, PlatformConfig, PrComment, PullRequestDetails,
    StatusSignal,
};
use async_trait::async_trait;

/// Read-only access to repository files at a given ref.
///
/// Replaces cloning the feedstock and probing the working directory.
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Read `path` at `git_ref`; `Ok(None)` if the file does not exist
    async fn read_file(&self, git_ref: &str, path: &str) -> Result<Option<Vec<u8>>>;
}

/// Platform service trait for PR operations
///
/// Mirrors the subset of the GitHub API the automerge flow consumes.
#[async_trait]
pub trait PlatformService: FileReader {
    /// List all open PRs (used by sweep events)
    async fn list_open_prs(&self) -> Result<Vec<PullRequestDetails>>;

    /// Get full PR details including labels and merge status
    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails>;

    /// All commit status events for `sha`, unreduced
    async fn fetch_statuses(&self, sha: &str) -> Result<Vec<StatusSignal>>;

    /// All check suites for `sha`, unreduced
    ///
    /// Implementations retry transient failures.
    async fn fetch_check_suites(&self, sha: &str) -> Result<Vec<CheckSignal>>;

    /// List comments on a PR
    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>>;

    /// Create a comment on a PR
    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()>;

    /// Update an existing comment on a PR
    async fn update_pr_comment(&self, pr_number: u64, comment_id: u64, body: &str) -> Result<()>;

    /// Merge a PR
    ///
    /// `request.expected_sha` guards against merging a head that moved
    /// after the PR was evaluated.
    async fn merge_pr(&self, pr_number: u64, request: &MergeRequest) -> Result<MergeResult>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
