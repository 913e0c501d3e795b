//! Single status comment per PR, found again by its greeting.

use crate::error::Result;
use crate::platform::PlatformService;
use crate::readiness::Verdict;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// First line of every comment; identifies our comment among the others
pub const GREETING: &str = "Hi! This is the friendly conda-forge automerge bot!";

/// What the comment reports as the final outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentOutcome {
    /// Required signals did not all pass
    NotPassing,
    /// Signals passed and the merge went through
    Merged,
    /// Signals passed but the merge did not happen
    NotMerged(String),
}

/// What [`comment_on_pr`] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    /// Some requirement is still pending; nothing posted
    Suppressed,
    /// A new comment was created
    Created,
    /// Our existing comment was edited
    Updated(u64),
}

/// How hard to look for a comment posted by a concurrent run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyOptions {
    /// Comment lookups before giving up and creating a new comment
    pub lookup_attempts: u32,
    /// Upper bound of the random sleep between lookups
    pub max_jitter: Duration,
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            lookup_attempts: 3,
            max_jitter: Duration::from_millis(1000),
        }
    }
}

/// Render the comment body (PURE)
pub fn format_comment(verdict: &Verdict, outcome: &CommentOutcome) -> String {
    let checks: String = verdict
        .iter()
        .map(|(token, state)| format!(" - {token}: {state}\n"))
        .collect();
    let conclusion = match outcome {
        CommentOutcome::NotPassing => "Thus the PR was not passing and not merged.".to_string(),
        CommentOutcome::Merged => "Thus the PR was passing and merged! Have a great day!".to_string(),
        CommentOutcome::NotMerged(reason) => {
            format!("Thus the PR was passing but not merged: {reason}")
        }
    };

    format!(
        "{GREETING}\n\nI considered the following status checks when analyzing this PR:\n{checks}\n{conclusion}"
    )
}

async fn find_our_comment(platform: &dyn PlatformService, pr_number: u64) -> Result<Option<u64>> {
    let comments = platform.list_pr_comments(pr_number).await?;
    Ok(comments
        .into_iter()
        .find(|c| c.body.contains(GREETING))
        .map(|c| c.id))
}

/// Post or edit our comment on the PR (EFFECTFUL)
///
/// Nothing is posted while any requirement is pending. Before creating a
/// comment the lookup is repeated with a random sleep in between, which
/// gives a concurrent run's comment time to show up. This narrows the race
/// between overlapping runs but does not close it.
pub async fn comment_on_pr(
    platform: &dyn PlatformService,
    pr_number: u64,
    verdict: &Verdict,
    outcome: &CommentOutcome,
    options: &NotifyOptions,
) -> Result<CommentAction> {
    if verdict.has_pending() {
        debug!(pr_number, "verdict incomplete, not commenting");
        return Ok(CommentAction::Suppressed);
    }

    let body = format_comment(verdict, outcome);
    let attempts = options.lookup_attempts.max(1);
    let max_jitter_ms = u64::try_from(options.max_jitter.as_millis()).unwrap_or(u64::MAX);

    for attempt in 1..=attempts {
        if let Some(comment_id) = find_our_comment(platform, pr_number).await? {
            platform
                .update_pr_comment(pr_number, comment_id, &body)
                .await?;
            return Ok(CommentAction::Updated(comment_id));
        }
        if attempt < attempts {
            let delay = Duration::from_millis(rand::thread_rng().gen_range(0..=max_jitter_ms));
            debug!(pr_number, attempt, delay = ?delay, "no comment yet, looking again");
            tokio::time::sleep(delay).await;
        }
    }

    platform.create_pr_comment(pr_number, &body).await?;
    Ok(CommentAction::Created)
}
