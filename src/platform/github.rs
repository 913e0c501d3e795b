//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::retry::{RetryPolicy, retry_with_backoff};
use crate::platform::{FileReader, PlatformService};
use crate::types::{
    CheckSignal, CheckStatus, MergeMethod, MergeRequest, MergeResult, PlatformConfig, PrComment,
    PrState, PullRequestDetails, StatusSignal,
};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const PER_PAGE: usize = 100;

// REST response types for the endpoints octocrab does not model

#[derive(Deserialize)]
struct RawStatus {
    context: String,
    state: String,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct CheckSuitesResponse {
    check_suites: Vec<RawCheckSuite>,
}

#[derive(Deserialize)]
struct RawCheckSuite {
    app: Option<RawApp>,
    status: Option<CheckStatus>,
    conclusion: Option<String>,
}

#[derive(Deserialize)]
struct RawApp {
    slug: String,
}

#[derive(Deserialize)]
struct RawContent {
    content: Option<String>,
    encoding: Option<String>,
}

impl From<RawStatus> for StatusSignal {
    fn from(s: RawStatus) -> Self {
        Self {
            context: s.context,
            state: s.state,
            updated_at: s.updated_at,
        }
    }
}

impl From<RawCheckSuite> for CheckSignal {
    fn from(s: RawCheckSuite) -> Self {
        Self {
            name: s.app.map_or_else(|| "unknown".to_string(), |a| a.slug),
            status: s.status.unwrap_or(CheckStatus::Other),
            conclusion: s.conclusion,
        }
    }
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests (statuses, check suites, contents)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API base URL for raw requests, without trailing slash
    api_base: String,
    /// Retry policy for check-suite fetches
    retry: RetryPolicy,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `api_base` overrides `https://api.github.com` (GitHub Enterprise or tests).
    pub fn new(
        token: &str,
        owner: String,
        repo: String,
        api_base: Option<String>,
    ) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        let base = api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        url::Url::parse(base)
            .map_err(|e| Error::GitHubApi(format!("invalid API base URL {base}: {e}")))?;
        if api_base.is_some() {
            builder = builder
                .base_uri(base)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("feedstock-automerge")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: base.trim_end_matches('/').to_string(),
            config: PlatformConfig {
                owner,
                repo,
                api_base,
            },
            token: token.to_string(),
            http_client,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy used for check-suite fetches
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn repo_url(&self, rest: &str) -> String {
        format!(
            "{}/repos/{}/{}/{rest}",
            self.api_base, self.config.owner, self.config.repo
        )
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn fetch_check_suites_once(&self, sha: &str) -> Result<Vec<CheckSignal>> {
        let url = self.repo_url(&format!("commits/{sha}/check-suites?per_page={PER_PAGE}"));

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to fetch check suites: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "Failed to fetch check suites: HTTP {}",
                response.status()
            )));
        }

        let suites: CheckSuitesResponse = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse check suites: {e}")))?;

        Ok(suites.check_suites.into_iter().map(Into::into).collect())
    }
}

/// Helper to convert octocrab PR to our `PullRequestDetails` type
fn details_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequestDetails {
    let state = match pr.state {
        Some(octocrab::models::IssueState::Open) => PrState::Open,
        Some(octocrab::models::IssueState::Closed) if pr.merged_at.is_some() => PrState::Merged,
        // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
        Some(_) | None => PrState::Closed,
    };

    // MergeableState is non-exhaustive too; go through its wire name
    let mergeable_state = pr
        .mergeable_state
        .as_ref()
        .and_then(|s| serde_json::to_value(s).ok())
        .and_then(|v| v.as_str().map(ToString::to_string));

    PullRequestDetails {
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        author: pr.user.as_ref().map(|u| u.login.clone()).unwrap_or_default(),
        labels: pr
            .labels
            .as_ref()
            .map(|labels| labels.iter().map(|l| l.name.clone()).collect())
            .unwrap_or_default(),
        state,
        is_draft: pr.draft.unwrap_or(false),
        mergeable: pr.mergeable,
        mergeable_state,
        head_sha: pr.head.sha.clone(),
    }
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl FileReader for GitHubService {
    async fn read_file(&self, git_ref: &str, path: &str) -> Result<Option<Vec<u8>>> {
        debug!(git_ref, path, "reading file");
        let url = self.repo_url(&format!(
            "contents/{}?ref={}",
            encode_path(path),
            urlencoding::encode(git_ref)
        ));

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to fetch {path}: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "file not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "Failed to fetch {path}: HTTP {}",
                response.status()
            )));
        }

        let raw: RawContent = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse contents of {path}: {e}")))?;

        let Some(content) = raw.content else {
            // Directories and submodules have no inline content
            return Ok(None);
        };
        if raw.encoding.as_deref().is_some_and(|enc| enc != "base64") {
            return Err(Error::GitHubApi(format!(
                "Unsupported encoding for {path}: {}",
                raw.encoding.unwrap_or_default()
            )));
        }

        let compact: String = content.split_whitespace().collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| Error::GitHubApi(format!("Failed to decode {path}: {e}")))?;
        debug!(path, len = bytes.len(), "read file");
        Ok(Some(bytes))
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_open_prs(&self) -> Result<Vec<PullRequestDetails>> {
        debug!("listing open PRs");
        let page = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(octocrab::params::State::Open)
            .per_page(100)
            .send()
            .await?;
        let prs = self.client.all_pages(page).await?;

        let result: Vec<PullRequestDetails> = prs.iter().map(details_from_octocrab).collect();
        debug!(count = result.len(), "listed open PRs");
        Ok(result)
    }

    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        debug!(pr_number, "getting PR details");

        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await?;

        let details = details_from_octocrab(&pr);
        debug!(
            pr_number,
            state = ?details.state,
            mergeable = ?details.mergeable,
            mergeable_state = ?details.mergeable_state,
            "got PR details"
        );
        Ok(details)
    }

    async fn fetch_statuses(&self, sha: &str) -> Result<Vec<StatusSignal>> {
        debug!(sha, "fetching commit statuses");
        let mut statuses = Vec::new();

        for page in 1.. {
            let url = self.repo_url(&format!(
                "commits/{sha}/statuses?per_page={PER_PAGE}&page={page}"
            ));
            let response = self
                .get(&url)
                .send()
                .await
                .map_err(|e| Error::GitHubApi(format!("Failed to fetch commit statuses: {e}")))?;

            if !response.status().is_success() {
                return Err(Error::GitHubApi(format!(
                    "Failed to fetch commit statuses: HTTP {}",
                    response.status()
                )));
            }

            let batch: Vec<RawStatus> = response
                .json()
                .await
                .map_err(|e| Error::GitHubApi(format!("Failed to parse commit statuses: {e}")))?;

            let done = batch.len() < PER_PAGE;
            statuses.extend(batch.into_iter().map(StatusSignal::from));
            if done {
                break;
            }
        }

        debug!(sha, count = statuses.len(), "fetched commit statuses");
        Ok(statuses)
    }

    async fn fetch_check_suites(&self, sha: &str) -> Result<Vec<CheckSignal>> {
        debug!(sha, "fetching check suites");
        let checks = retry_with_backoff(&self.retry, "fetch check suites", || {
            self.fetch_check_suites_once(sha)
        })
        .await?;
        debug!(sha, count = checks.len(), "fetched check suites");
        Ok(checks)
    }

    async fn list_pr_comments(&self, pr_number: u64) -> Result<Vec<PrComment>> {
        debug!(pr_number, "listing PR comments");
        let page = self
            .client
            .issues(&self.config.owner, &self.config.repo)
            .list_comments(pr_number)
            .per_page(100)
            .send()
            .await?;
        let comments = self.client.all_pages(page).await?;

        let result: Vec<PrComment> = comments
            .into_iter()
            .map(|c| PrComment {
                id: c.id.0,
                body: c.body.unwrap_or_default(),
            })
            .collect();
        debug!(pr_number, count = result.len(), "listed PR comments");
        Ok(result)
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        debug!(pr_number, "creating PR comment");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .create_comment(pr_number, body)
            .await?;
        debug!(pr_number, "created PR comment");
        Ok(())
    }

    async fn update_pr_comment(&self, _pr_number: u64, comment_id: u64, body: &str) -> Result<()> {
        debug!(comment_id, "updating PR comment");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .update_comment(octocrab::models::CommentId(comment_id), body)
            .await?;
        debug!(comment_id, "updated PR comment");
        Ok(())
    }

    async fn merge_pr(&self, pr_number: u64, request: &MergeRequest) -> Result<MergeResult> {
        debug!(pr_number, method = %request.method, sha = %request.expected_sha, "merging PR");

        let octocrab_method = match request.method {
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
        };

        let result = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .merge(pr_number)
            .method(octocrab_method)
            .title(request.title.as_str())
            .message(request.message.as_str())
            .sha(request.expected_sha.as_str())
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Merge failed: {e}")))?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
