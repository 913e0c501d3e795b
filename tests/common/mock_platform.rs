//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use feedstock_automerge::error::{Error, Result};
use feedstock_automerge::platform::{FileReader, PlatformService};
use feedstock_automerge::types::{
    CheckSignal, CheckStatus, MergeMethod, MergeRequest, MergeResult, PlatformConfig, PrComment,
    PrState, PullRequestDetails, StatusSignal,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `read_file`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFileCall {
    pub git_ref: String,
    pub path: String,
}

/// Call record for `create_pr_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentCall {
    pub pr_number: u64,
    pub body: String,
}

/// Call record for `update_pr_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCommentCall {
    pub pr_number: u64,
    pub comment_id: u64,
    pub body: String,
}

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub pr_number: u64,
    pub method: MergeMethod,
    pub title: String,
    pub message: String,
    pub expected_sha: String,
}

/// Simple mock platform service for testing
///
/// This manually implements `PlatformService` rather than using mockall,
/// because mockall has issues with methods returning references.
///
/// Features:
/// - Repository files, statuses and checks served from maps
/// - Comments are stored, so a second run sees the first run's comment
/// - A successful merge flips the PR to merged
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    next_comment_id: AtomicU64,
    files: Mutex<HashMap<String, Vec<u8>>>,
    statuses: Mutex<HashMap<String, Vec<StatusSignal>>>,
    checks: Mutex<HashMap<String, Vec<CheckSignal>>>,
    comments: Mutex<HashMap<u64, Vec<PrComment>>>,
    pr_details_responses: Mutex<HashMap<u64, PullRequestDetails>>,
    merge_responses: Mutex<HashMap<u64, MergeResult>>,
    // Call tracking
    read_file_calls: Mutex<Vec<ReadFileCall>>,
    fetch_statuses_calls: Mutex<Vec<String>>,
    fetch_checks_calls: Mutex<Vec<String>>,
    list_comments_calls: Mutex<Vec<u64>>,
    create_comment_calls: Mutex<Vec<CreateCommentCall>>,
    update_comment_calls: Mutex<Vec<UpdateCommentCall>>,
    get_pr_details_calls: Mutex<Vec<u64>>,
    merge_pr_calls: Mutex<Vec<MergePrCall>>,
    // Error injection
    error_on_fetch_statuses: Mutex<Option<String>>,
    error_on_fetch_checks: Mutex<Option<String>>,
    error_on_create_comment: Mutex<Option<String>>,
    error_on_merge_pr: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_comment_id: AtomicU64::new(1000),
            files: Mutex::new(HashMap::new()),
            statuses: Mutex::new(HashMap::new()),
            checks: Mutex::new(HashMap::new()),
            comments: Mutex::new(HashMap::new()),
            pr_details_responses: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            read_file_calls: Mutex::new(Vec::new()),
            fetch_statuses_calls: Mutex::new(Vec::new()),
            fetch_checks_calls: Mutex::new(Vec::new()),
            list_comments_calls: Mutex::new(Vec::new()),
            create_comment_calls: Mutex::new(Vec::new()),
            update_comment_calls: Mutex::new(Vec::new()),
            get_pr_details_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            error_on_fetch_statuses: Mutex::new(None),
            error_on_fetch_checks: Mutex::new(None),
            error_on_create_comment: Mutex::new(None),
            error_on_merge_pr: Mutex::new(None),
        }
    }

    // === Error injection methods ===

    /// Make `fetch_statuses` return an error
    pub fn fail_fetch_statuses(&self, msg: &str) {
        *self.error_on_fetch_statuses.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `fetch_check_suites` return an error
    pub fn fail_fetch_checks(&self, msg: &str) {
        *self.error_on_fetch_checks.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr_comment` return an error
    pub fn fail_create_comment(&self, msg: &str) {
        *self.error_on_create_comment.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pr` return an error
    pub fn fail_merge_pr(&self, msg: &str) {
        *self.error_on_merge_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === Response setup ===

    /// Add a repository file (served for every ref)
    pub fn set_file(&self, path: &str, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.as_bytes().to_vec());
    }

    /// Set the raw statuses returned for `sha`
    pub fn set_statuses(&self, sha: &str, statuses: Vec<StatusSignal>) {
        self.statuses
            .lock()
            .unwrap()
            .insert(sha.to_string(), statuses);
    }

    /// Set the raw checks returned for `sha`
    pub fn set_checks(&self, sha: &str, checks: Vec<CheckSignal>) {
        self.checks.lock().unwrap().insert(sha.to_string(), checks);
    }

    /// Set the existing comments on a PR
    pub fn set_comments(&self, pr_number: u64, comments: Vec<PrComment>) {
        self.comments.lock().unwrap().insert(pr_number, comments);
    }

    /// Set the response for `get_pr_details` for a specific PR
    pub fn set_pr_details_response(&self, pr_number: u64, details: PullRequestDetails) {
        self.pr_details_responses
            .lock()
            .unwrap()
            .insert(pr_number, details);
    }

    /// Set the response for `merge_pr` for a specific PR
    pub fn set_merge_response(&self, pr_number: u64, result: MergeResult) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert(pr_number, result);
    }

    /// Helper to set up a bot PR on a feedstock with automerge turned on
    ///
    /// The feedstock has `conda-forge.yml` with `bot.automerge: true` and
    /// the PR is mergeable. Signals are left for the test to set.
    pub fn setup_bot_pr(&self, pr: &PullRequestDetails) {
        self.set_file("conda-forge.yml", "bot:\n  automerge: true\n");
        self.set_pr_details_response(pr.number, pr.clone());
        self.set_merge_response(
            pr.number,
            MergeResult {
                merged: true,
                sha: Some(format!("merged_sha_{}", pr.number)),
                message: None,
            },
        );
    }

    // === Call verification methods ===

    /// Get all `read_file` calls
    pub fn get_read_file_calls(&self) -> Vec<ReadFileCall> {
        self.read_file_calls.lock().unwrap().clone()
    }

    /// Get all SHAs `fetch_statuses` was called with
    pub fn get_fetch_statuses_calls(&self) -> Vec<String> {
        self.fetch_statuses_calls.lock().unwrap().clone()
    }

    /// Get all SHAs `fetch_check_suites` was called with
    pub fn get_fetch_checks_calls(&self) -> Vec<String> {
        self.fetch_checks_calls.lock().unwrap().clone()
    }

    /// Get all `list_pr_comments` calls
    pub fn get_list_comments_calls(&self) -> Vec<u64> {
        self.list_comments_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr_comment` calls
    pub fn get_create_comment_calls(&self) -> Vec<CreateCommentCall> {
        self.create_comment_calls.lock().unwrap().clone()
    }

    /// Get all `update_pr_comment` calls
    pub fn get_update_comment_calls(&self) -> Vec<UpdateCommentCall> {
        self.update_comment_calls.lock().unwrap().clone()
    }

    /// Get all `get_pr_details` calls
    pub fn get_pr_details_calls(&self) -> Vec<u64> {
        self.get_pr_details_calls.lock().unwrap().clone()
    }

    /// Get all `merge_pr` calls
    pub fn get_merge_pr_calls(&self) -> Vec<MergePrCall> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// Current comments on a PR
    pub fn comments_on(&self, pr_number: u64) -> Vec<PrComment> {
        self.comments
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .unwrap_or_default()
    }

    /// Assert that `merge_pr` was called for a specific PR
    pub fn assert_merge_called(&self, pr_number: u64) {
        let calls = self.get_merge_pr_calls();
        assert!(
            calls.iter().any(|c| c.pr_number == pr_number),
            "Expected merge_pr({pr_number}) but got: {calls:?}"
        );
    }

    /// Assert that `merge_pr` was never called
    pub fn assert_no_merge(&self) {
        let calls = self.get_merge_pr_calls();
        assert!(calls.is_empty(), "Expected no merge but got: {calls:?}");
    }

    /// Assert that no CI signal or repository file was fetched
    pub fn assert_nothing_fetched(&self) {
        assert!(
            self.get_read_file_calls().is_empty(),
            "Expected no file reads but got: {:?}",
            self.get_read_file_calls()
        );
        assert!(self.get_fetch_statuses_calls().is_empty());
        assert!(self.get_fetch_checks_calls().is_empty());
    }
}

#[async_trait]
impl FileReader for MockPlatformService {
    async fn read_file(&self, git_ref: &str, path: &str) -> Result<Option<Vec<u8>>> {
        self.read_file_calls.lock().unwrap().push(ReadFileCall {
            git_ref: git_ref.to_string(),
            path: path.to_string(),
        });
        Ok(self.files.lock().unwrap().get(path).cloned())
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_open_prs(&self) -> Result<Vec<PullRequestDetails>> {
        let mut prs: Vec<_> = self
            .pr_details_responses
            .lock()
            .unwrap()
            .values()
            .filter(|pr| pr.state == PrState::Open)
            .cloned()
            .collect();
        prs.sort_by_key(|pr| pr.number);
        Ok(prs)
    }

    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        self.get_pr_details_calls.lock().unwrap().push(pr_number);
        self.pr_details_responses
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| Error::GitHubApi(format!("PR #{pr_number} not found")))
    }

    async fn fetch_statuses(&self, sha: &str) -> Result<Vec<StatusSignal>> {
        self.fetch_statuses_calls
            .lock()
            .unwrap()
            .push(sha.to_string());
        if let Some(msg) = self.error_on_fetch_statuses.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_check_suites(&self, sha: &str) -> Result<Vec<CheckSignal>> {
        self.fetch_checks_calls.lock().unwrap().push(sha.to_string());
        if let Some(msg) = self.error_on_fetch_checks.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(self
            .checks
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>> {
        self.list_comments_calls.lock().unwrap().push(pr_number);
        Ok(self.comments_on(pr_number))
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.create_comment_calls
            .lock()
            .unwrap()
            .push(CreateCommentCall {
                pr_number,
                body: body.to_string(),
            });
        if let Some(msg) = self.error_on_create_comment.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }
        let id = self.next_comment_id.fetch_add(1, Ordering::SeqCst);
        self.comments
            .lock()
            .unwrap()
            .entry(pr_number)
            .or_default()
            .push(PrComment {
                id,
                body: body.to_string(),
            });
        Ok(())
    }

    async fn update_pr_comment(&self, pr_number: u64, comment_id: u64, body: &str) -> Result<()> {
        self.update_comment_calls
            .lock()
            .unwrap()
            .push(UpdateCommentCall {
                pr_number,
                comment_id,
                body: body.to_string(),
            });
        let mut comments = self.comments.lock().unwrap();
        let comment = comments
            .get_mut(&pr_number)
            .and_then(|cs| cs.iter_mut().find(|c| c.id == comment_id))
            .ok_or_else(|| Error::GitHubApi(format!("comment {comment_id} not found")))?;
        comment.body = body.to_string();
        Ok(())
    }

    async fn merge_pr(&self, pr_number: u64, request: &MergeRequest) -> Result<MergeResult> {
        self.merge_pr_calls.lock().unwrap().push(MergePrCall {
            pr_number,
            method: request.method,
            title: request.title.clone(),
            message: request.message.clone(),
            expected_sha: request.expected_sha.clone(),
        });

        if let Some(msg) = self.error_on_merge_pr.lock().unwrap().as_ref() {
            return Err(Error::GitHubApi(msg.clone()));
        }

        let result = self
            .merge_responses
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .unwrap_or(MergeResult {
                merged: true,
                sha: Some(format!("merged_sha_{pr_number}")),
                message: None,
            });

        if result.merged
            && let Some(pr) = self.pr_details_responses.lock().unwrap().get_mut(&pr_number)
        {
            pr.state = PrState::Merged;
            pr.mergeable = None;
            pr.mergeable_state = None;
        }
        Ok(result)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

// === Signal builders ===

/// Fixed timestamp `secs` seconds after a base instant
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Build a raw status event
pub fn status(context: &str, state: &str, secs: i64) -> StatusSignal {
    StatusSignal {
        context: context.to_string(),
        state: state.to_string(),
        updated_at: at(secs),
    }
}

/// Build a completed check with a conclusion
pub fn check(name: &str, conclusion: &str) -> CheckSignal {
    CheckSignal {
        name: name.to_string(),
        status: CheckStatus::Completed,
        conclusion: Some(conclusion.to_string()),
    }
}

/// Build a check that has not completed yet
pub fn running_check(name: &str) -> CheckSignal {
    CheckSignal {
        name: name.to_string(),
        status: CheckStatus::InProgress,
        conclusion: None,
    }
}
