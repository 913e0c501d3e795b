//! One evaluation pass over a PR: gate, require, aggregate, evaluate,
//! merge, comment.

use crate::config::load_feedstock_config;
use crate::error::Result;
use crate::merge::execute::{execute_merge, merge_blocker};
use crate::merge::gate::{GateDecision, GatePolicy};
use crate::merge::notify::{CommentOutcome, NotifyOptions, comment_on_pr};
use crate::platform::PlatformService;
use crate::readiness::{
    NO_REQUIREMENTS, Verdict, aggregate_checks, aggregate_statuses, evaluate_default,
    resolve_required,
};
use crate::types::{MergeDecision, MergeMethod, PrState, PullRequestDetails};
use tracing::{error, info, warn};

/// Knobs for [`automerge_pr`]
#[derive(Debug, Clone)]
pub struct AutomergeOptions {
    /// Who may be merged
    pub gate: GatePolicy,
    /// Merge strategy
    pub method: MergeMethod,
    /// Status contexts to drop in addition to the derived ones
    pub ignored_statuses: Vec<String>,
    /// Comment lookup behavior
    pub notify: NotifyOptions,
}

impl Default for AutomergeOptions {
    fn default() -> Self {
        Self {
            gate: GatePolicy::default(),
            method: MergeMethod::Squash,
            ignored_statuses: Vec::new(),
            notify: NotifyOptions::default(),
        }
    }
}

/// Evaluate `pr` and merge it if every policy and signal allows it.
///
/// `Err` only for fatal conditions (missing policy document, API failures
/// while gathering). Everything else ends up in the decision's reason.
pub async fn automerge_pr(
    platform: &dyn PlatformService,
    pr: &PullRequestDetails,
    options: &AutomergeOptions,
) -> Result<MergeDecision> {
    let decision = evaluate_and_merge(platform, pr, options).await?;

    let repo = platform.config().full_name();
    if decision.allowed {
        info!(repo = %repo, pr_number = pr.number, reason = %decision.reason, "MERGED PR");
    } else {
        info!(repo = %repo, pr_number = pr.number, reason = %decision.reason, "DID NOT MERGE PR");
    }
    Ok(decision)
}

/// Run [`automerge_pr`] over every open PR.
///
/// Every PR is evaluated even if an earlier one fails fatally; the first
/// fatal error is returned once the sweep is done.
pub async fn automerge_open_prs(
    platform: &dyn PlatformService,
    options: &AutomergeOptions,
) -> Result<Vec<(u64, MergeDecision)>> {
    let prs = platform.list_open_prs().await?;
    info!(count = prs.len(), "evaluating open PRs");

    let mut decisions = Vec::with_capacity(prs.len());
    let mut first_error = None;
    for pr in &prs {
        match automerge_pr(platform, pr, options).await {
            Ok(decision) => decisions.push((pr.number, decision)),
            Err(e) => {
                error!(pr_number = pr.number, error = %e, "evaluation failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(decisions),
    }
}

async fn evaluate_and_merge(
    platform: &dyn PlatformService,
    pr: &PullRequestDetails,
    options: &AutomergeOptions,
) -> Result<MergeDecision> {
    // Policy first: nothing is fetched for PRs we would never merge.
    let pr_gate = options.gate.check_pr(pr);
    if let Some(reason) = pr_gate.blocked_reason() {
        return Ok(MergeDecision::blocked(reason));
    }

    let cfg = load_feedstock_config(platform, &pr.head_sha).await?;
    if pr_gate != GateDecision::Bypass
        && let Some(reason) = options.gate.check_config(&cfg).blocked_reason()
    {
        return Ok(MergeDecision::blocked(reason));
    }

    let required = resolve_required(platform, &pr.head_sha, &cfg).await?;
    if required.is_empty() {
        return Ok(MergeDecision::blocked(NO_REQUIREMENTS));
    }

    let mut ignored = options.ignored_statuses.clone();
    ignored.extend(required.extra_ignored_statuses());

    let raw_statuses = platform.fetch_statuses(&pr.head_sha).await?;
    let statuses = aggregate_statuses(&raw_statuses, &ignored);
    let raw_checks = platform.fetch_check_suites(&pr.head_sha).await?;
    let checks = aggregate_checks(&raw_checks);

    let verdict = evaluate_default(&required, &statuses, &checks);
    if let Some(reason) = verdict.not_ready_reason() {
        let decision = MergeDecision::blocked(reason);
        let outcome = CommentOutcome::NotPassing;
        return Ok(notify(platform, pr.number, &verdict, &outcome, options, decision).await);
    }

    // The listing endpoints do not compute mergeability, so ask again.
    let current = platform.get_pr_details(pr.number).await?;
    if let Some(reason) = merge_blocker(&current) {
        let decision = MergeDecision::blocked(reason.clone());
        if current.state != PrState::Open {
            return Ok(decision);
        }
        let outcome = CommentOutcome::NotMerged(reason);
        return Ok(notify(platform, pr.number, &verdict, &outcome, options, decision).await);
    }
    if current.head_sha != pr.head_sha {
        return Ok(MergeDecision::blocked(format!(
            "PR head moved from {} to {} during evaluation",
            pr.head_sha, current.head_sha
        )));
    }

    let decision = execute_merge(platform, &current, options.method).await;
    let outcome = if decision.allowed {
        CommentOutcome::Merged
    } else {
        CommentOutcome::NotMerged(decision.reason.clone())
    };
    Ok(notify(platform, pr.number, &verdict, &outcome, options, decision).await)
}

/// Post the comment; a failure to comment is appended to the reason.
async fn notify(
    platform: &dyn PlatformService,
    pr_number: u64,
    verdict: &Verdict,
    outcome: &CommentOutcome,
    options: &AutomergeOptions,
    mut decision: MergeDecision,
) -> MergeDecision {
    if let Err(e) = comment_on_pr(platform, pr_number, verdict, outcome, &options.notify).await {
        warn!(pr_number, error = %e, "failed to comment on PR");
        decision.reason = format!("{} (comment failed: {e})", decision.reason);
    }
    decision
}
