//! Policy checks that run before any CI signal is looked at.

use crate::config::FeedstockConfig;
use crate::types::PullRequestDetails;

/// Label that lets maintainers force automerge on any PR
pub const AUTOMERGE_LABEL: &str = "automerge";

/// Authors whose PRs may be merged without the label
pub const ALLOWED_USERS: &[&str] = &["regro-cf-autotick-bot"];

/// Marker the bot puts in titles of PRs it wants merged
pub const TITLE_SLUG: &str = "[bot-automerge]";

/// Who and what may be automerged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePolicy {
    /// Label that bypasses every other check
    pub override_label: String,
    /// Allowed PR authors
    pub allowed_users: Vec<String>,
    /// Marker required in the PR title
    pub title_slug: String,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            override_label: AUTOMERGE_LABEL.to_string(),
            allowed_users: ALLOWED_USERS.iter().map(ToString::to_string).collect(),
            title_slug: TITLE_SLUG.to_string(),
        }
    }
}

/// Result of a gate check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Override label present; skip remaining policy checks
    Bypass,
    /// This check passed
    Allow,
    /// Stop here
    Block(String),
}

impl GateDecision {
    /// Reason if blocked
    pub fn blocked_reason(&self) -> Option<&str> {
        match self {
            Self::Block(reason) => Some(reason),
            Self::Bypass | Self::Allow => None,
        }
    }
}

impl GatePolicy {
    /// Checks that need only the PR: label, author, title.
    pub fn check_pr(&self, pr: &PullRequestDetails) -> GateDecision {
        if pr.has_label(&self.override_label) {
            return GateDecision::Bypass;
        }

        if !self.allowed_users.iter().any(|u| *u == pr.author) {
            return GateDecision::Block(format!("user {} cannot automerge", pr.author));
        }

        if !pr.title.contains(&self.title_slug) {
            return GateDecision::Block(format!(
                "PR does not have the '{}' slug in the title",
                self.title_slug
            ));
        }

        GateDecision::Allow
    }

    /// Check that needs the feedstock's policy document.
    pub fn check_config(&self, cfg: &FeedstockConfig) -> GateDecision {
        if cfg.automerge_enabled() {
            GateDecision::Allow
        } else {
            GateDecision::Block(
                "automated bot merges are turned off for this feedstock".to_string(),
            )
        }
    }
}
