//! GitHub Actions event dispatch

use feedstock_automerge::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Events the action is triggered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Status,
    CheckRun,
    CheckSuite,
    Schedule,
    Push,
    WorkflowDispatch,
    PullRequest,
    PullRequestReview,
}

/// Which PRs an event asks us to look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTarget {
    /// Every open PR in the repository
    AllOpen,
    /// The PR carried in the payload
    PayloadPr,
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "status" => Ok(Self::Status),
            "check_run" => Ok(Self::CheckRun),
            "check_suite" => Ok(Self::CheckSuite),
            "schedule" => Ok(Self::Schedule),
            "push" => Ok(Self::Push),
            "workflow_dispatch" => Ok(Self::WorkflowDispatch),
            "pull_request" => Ok(Self::PullRequest),
            "pull_request_review" => Ok(Self::PullRequestReview),
            other => Err(Error::UnrecognizedEvent(other.to_string())),
        }
    }
}

impl EventKind {
    pub const fn target(self) -> EventTarget {
        match self {
            Self::PullRequest | Self::PullRequestReview => EventTarget::PayloadPr,
            Self::Status
            | Self::CheckRun
            | Self::CheckSuite
            | Self::Schedule
            | Self::Push
            | Self::WorkflowDispatch => EventTarget::AllOpen,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PayloadPr {
    number: u64,
}

#[derive(Debug, Default, Deserialize)]
struct PayloadRepo {
    full_name: String,
}

/// The parts of an event payload we read
#[derive(Debug, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pull_request: Option<PayloadPr>,
    #[serde(default)]
    repository: Option<PayloadRepo>,
}

impl EventPayload {
    /// Parse a payload document
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::EventPayload(e.to_string()))
    }

    /// Read and parse the payload file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::EventPayload(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Number of the PR the event is about
    pub fn pr_number(&self) -> Result<u64> {
        self.pull_request
            .as_ref()
            .map(|pr| pr.number)
            .ok_or_else(|| Error::EventPayload("payload has no pull_request".to_string()))
    }

    /// `owner/repo` from the payload, if present
    pub fn repository(&self) -> Option<&str> {
        self.repository.as_ref().map(|r| r.full_name.as_str())
    }
}

/// Split `owner/repo`
pub fn split_repository(full_name: &str) -> Result<(String, String)> {
    match full_name.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::EventPayload(format!(
            "repository must be owner/repo, got '{full_name}'"
        ))),
    }
}
