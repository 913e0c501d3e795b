//! Merge engine for feedstock PRs
//!
//! Four phases per PR:
//! 1. Gate - author, title, label and feedstock policy (pure)
//! 2. Readiness - required signals vs. reported signals (see `readiness`)
//! 3. Execute - merge with a head SHA guard (effectful)
//! 4. Notify - keep one status comment on the PR up to date (effectful)

mod automerge;
mod execute;
mod gate;
mod notify;

/// Commit message used for every automerge
pub const COMMIT_MESSAGE: &str = "automerged PR by conda-forge/automerge-action";

pub use automerge::{AutomergeOptions, automerge_open_prs, automerge_pr};
pub use execute::{
    ALREADY_MERGED, CLOSED_UNMERGED, DRAFT, GOOD_MERGE_STATES, MERGED_OK, execute_merge,
    merge_blocker, merge_request,
};
pub use gate::{ALLOWED_USERS, AUTOMERGE_LABEL, GateDecision, GatePolicy, TITLE_SLUG};
pub use notify::{
    CommentAction, CommentOutcome, GREETING, NotifyOptions, comment_on_pr, format_comment,
};
