//! Reduce raw status and check events into one state per reporter.

use crate::types::{CheckSignal, CheckStatus, SignalState, StatusSignal};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;

/// Check names the action itself reports under; never counted.
pub const SELF_CHECK_NAMES: &[&str] = &["github-actions", "regro-cf-autotick-bot-action"];

/// Status states that mean "not finished yet"
const PENDING_STATUS_STATES: &[&str] = &["pending"];

/// Status states that mean failure
const BAD_STATUS_STATES: &[&str] = &["failure", "error"];

/// Check conclusions that mean failure
const BAD_CHECK_CONCLUSIONS: &[&str] = &[
    "failure",
    "error",
    "cancelled",
    "timed_out",
    "action_required",
    "neutral",
];

/// One state per reporter name, in order of first appearance.
///
/// Re-inserting a name overwrites its state but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReducedSignals {
    entries: Vec<(String, SignalState)>,
}

impl ReducedSignals {
    /// Empty mapping
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or overwrite the state for `name`
    pub fn insert(&mut self, name: impl Into<String>, state: SignalState) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = state;
        } else {
            self.entries.push((name, state));
        }
    }

    /// State for `name`, if reported
    pub fn get(&self, name: &str) -> Option<SignalState> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }

    /// Iterate `(name, state)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, SignalState)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), *s))
    }

    /// Number of distinct reporters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, SignalState)> for ReducedSignals {
    fn from_iter<I: IntoIterator<Item = (S, SignalState)>>(iter: I) -> Self {
        let mut reduced = Self::new();
        for (name, state) in iter {
            reduced.insert(name, state);
        }
        reduced
    }
}

/// Map a raw status state to a tri-state
pub fn reduce_status_state(state: &str) -> SignalState {
    if PENDING_STATUS_STATES.contains(&state) {
        SignalState::Pending
    } else if BAD_STATUS_STATES.contains(&state) {
        SignalState::Failing
    } else {
        SignalState::Passing
    }
}

/// Map a raw check to a tri-state
pub fn reduce_check(status: CheckStatus, conclusion: Option<&str>) -> SignalState {
    if status != CheckStatus::Completed {
        return SignalState::Pending;
    }
    let bad = conclusion.is_some_and(|c| {
        let normalized = c.to_ascii_lowercase().replace('-', "_");
        BAD_CHECK_CONCLUSIONS.contains(&normalized.as_str())
    });
    if bad {
        SignalState::Failing
    } else {
        SignalState::Passing
    }
}

/// Keep the latest status per context and reduce it.
///
/// Contexts in `ignored` (case-insensitive exact match) are dropped first.
/// Among statuses with equal timestamps the later one in `statuses` wins.
pub fn aggregate_statuses<'a, I>(statuses: I, ignored: &[String]) -> ReducedSignals
where
    I: IntoIterator<Item = &'a StatusSignal>,
{
    let mut latest: HashMap<&str, DateTime<Utc>> = HashMap::new();
    let mut reduced = ReducedSignals::new();

    for status in statuses {
        if ignored
            .iter()
            .any(|i| i.eq_ignore_ascii_case(&status.context))
        {
            continue;
        }

        let newer = latest
            .get(status.context.as_str())
            .is_none_or(|seen| status.updated_at >= *seen);
        if newer {
            latest.insert(status.context.as_str(), status.updated_at);
            reduced.insert(status.context.as_str(), reduce_status_state(&status.state));
        }
    }

    for (context, state) in reduced.iter() {
        info!("status: name|state = {context}|{state}");
    }
    reduced
}

/// Reduce checks, last one per name wins.
///
/// The action's own check names are always dropped.
pub fn aggregate_checks<'a, I>(checks: I) -> ReducedSignals
where
    I: IntoIterator<Item = &'a CheckSignal>,
{
    let reduced: ReducedSignals = checks
        .into_iter()
        .filter(|c| !SELF_CHECK_NAMES.contains(&c.name.as_str()))
        .map(|c| (c.name.as_str(), reduce_check(c.status, c.conclusion.as_deref())))
        .collect();

    for (name, state) in reduced.iter() {
        info!("check: name|state = {name}|{state}");
    }
    reduced
}
