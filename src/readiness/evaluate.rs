//! Combine reduced signals into one verdict per requirement.
//!
//! Pure: no I/O, same inputs always give the same [`Verdict`].

use crate::readiness::aggregate::ReducedSignals;
use crate::readiness::requirements::RequiredSet;
use crate::types::SignalState;
use tracing::info;

/// Reason given when nothing is required
pub const NO_REQUIREMENTS: &str = "at least one signal must be required";

/// Decides whether a reporter name counts toward a requirement token.
pub trait SignalMatcher {
    /// Whether `reporter` reports for `requirement`
    fn matches(&self, requirement: &str, reporter: &str) -> bool;
}

/// Case-insensitive substring match of the token in the reporter name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl SignalMatcher for SubstringMatcher {
    fn matches(&self, requirement: &str, reporter: &str) -> bool {
        reporter
            .to_ascii_lowercase()
            .contains(&requirement.to_ascii_lowercase())
    }
}

/// Per-requirement outcome of an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    states: Vec<(String, SignalState)>,
}

impl Verdict {
    /// `(token, state)` in requirement order
    pub fn iter(&self) -> impl Iterator<Item = (&str, SignalState)> {
        self.states.iter().map(|(t, s)| (t.as_str(), *s))
    }

    /// State of one requirement
    pub fn get(&self, token: &str) -> Option<SignalState> {
        self.states.iter().find(|(t, _)| t == token).map(|(_, s)| *s)
    }

    /// Whether every requirement passed (false when there are none)
    pub fn is_ready(&self) -> bool {
        !self.states.is_empty() && self.states.iter().all(|(_, s)| s.is_passing())
    }

    /// Whether some requirement has not reported yet
    pub fn has_pending(&self) -> bool {
        self.states.iter().any(|(_, s)| *s == SignalState::Pending)
    }

    /// Whether some requirement failed
    pub fn has_failures(&self) -> bool {
        self.states.iter().any(|(_, s)| *s == SignalState::Failing)
    }

    /// Why the PR is not ready, or `None` if it is
    pub fn not_ready_reason(&self) -> Option<&'static str> {
        if self.states.is_empty() {
            Some(NO_REQUIREMENTS)
        } else if self.has_failures() {
            Some("PR has failing checks or statuses")
        } else if self.states.iter().all(|(_, s)| *s == SignalState::Pending) {
            Some("no checks or statuses returned for the required signals yet")
        } else if self.has_pending() {
            Some("PR has pending checks or statuses")
        } else {
            None
        }
    }
}

/// Fold the next matching signal into the running state of a requirement.
///
/// The first non-passing value sticks: later matches never change a
/// `Failing` or `Pending` that was already captured.
const fn combine(current: Option<SignalState>, next: SignalState) -> SignalState {
    match current {
        None | Some(SignalState::Passing) => next,
        Some(captured) => captured,
    }
}

/// Evaluate `required` against reduced statuses and checks.
///
/// Statuses are scanned before checks, each in first-seen order.
pub fn evaluate<M: SignalMatcher + ?Sized>(
    required: &RequiredSet,
    statuses: &ReducedSignals,
    checks: &ReducedSignals,
    matcher: &M,
) -> Verdict {
    let states = required
        .tokens()
        .iter()
        .map(|token| {
            let state = statuses
                .iter()
                .chain(checks.iter())
                .filter(|(name, _)| matcher.matches(token, name))
                .fold(None, |acc, (_, state)| Some(combine(acc, state)))
                .unwrap_or(SignalState::Pending);
            (token.clone(), state)
        })
        .collect();

    let verdict = Verdict { states };
    for (token, state) in verdict.iter() {
        info!("requirement: name|state = {token}|{state}");
    }
    verdict
}

/// [`evaluate`] with the default [`SubstringMatcher`].
pub fn evaluate_default(
    required: &RequiredSet,
    statuses: &ReducedSignals,
    checks: &ReducedSignals,
) -> Verdict {
    evaluate(required, statuses, checks, &SubstringMatcher)
}
