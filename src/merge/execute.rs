//! Merge execution - effectful operations
//!
//! Checks the platform's view of the PR one last time, then merges it with
//! the evaluated head SHA as a guard.

use crate::merge::COMMIT_MESSAGE;
use crate::platform::PlatformService;
use crate::types::{MergeDecision, MergeMethod, MergeRequest, PrState, PullRequestDetails};
use tracing::debug;

/// `mergeable_state` values that still allow a merge
pub const GOOD_MERGE_STATES: &[&str] = &["clean", "has_hooks", "unknown", "unstable"];

/// Reason reported when the PR is already merged
pub const ALREADY_MERGED: &str = "PR has already been merged";

/// Reason reported when the PR was closed without merging
pub const CLOSED_UNMERGED: &str = "PR is closed";

/// Reason reported for draft PRs
pub const DRAFT: &str = "PR is a draft";

/// Reason reported on success
pub const MERGED_OK: &str = "all is well :)";

/// Why the PR cannot be merged right now, if anything (PURE)
pub fn merge_blocker(pr: &PullRequestDetails) -> Option<String> {
    match pr.state {
        PrState::Merged => return Some(ALREADY_MERGED.to_string()),
        PrState::Closed => return Some(CLOSED_UNMERGED.to_string()),
        PrState::Open => {}
    }
    if pr.is_draft {
        return Some(DRAFT.to_string());
    }

    let healthy_state = pr
        .mergeable_state
        .as_deref()
        .is_some_and(|s| GOOD_MERGE_STATES.contains(&s));
    if pr.mergeable != Some(true) || !healthy_state {
        let mergeable = pr
            .mergeable
            .map_or_else(|| "None".to_string(), |m| m.to_string());
        let state = pr.mergeable_state.as_deref().unwrap_or("None");
        return Some(format!(
            "PR merge issue: mergeable|mergeable_state = {mergeable}|{state}"
        ));
    }

    None
}

/// Build the merge call for `pr`
pub fn merge_request(pr: &PullRequestDetails, method: MergeMethod) -> MergeRequest {
    MergeRequest {
        title: pr.title.clone(),
        message: COMMIT_MESSAGE.to_string(),
        method,
        expected_sha: pr.head_sha.clone(),
    }
}

/// Merge `pr` (EFFECTFUL)
///
/// The platform may decline the merge without erroring; its message is
/// forwarded in the reason. Platform errors are reported the same way
/// rather than propagated, since the merge is never retried.
pub async fn execute_merge(
    platform: &dyn PlatformService,
    pr: &PullRequestDetails,
    method: MergeMethod,
) -> MergeDecision {
    let request = merge_request(pr, method);

    match platform.merge_pr(pr.number, &request).await {
        Ok(result) if result.merged => {
            debug!(pr_number = pr.number, sha = ?result.sha, "merged");
            MergeDecision::merged(MERGED_OK)
        }
        Ok(result) => MergeDecision::blocked(format!(
            "PR could not be merged: message {}",
            result.message.unwrap_or_default()
        )),
        Err(e) => MergeDecision::blocked(format!("PR could not be merged: {e}")),
    }
}
