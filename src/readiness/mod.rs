//! Merge-readiness decision engine
//!
//! Three steps, each usable on its own:
//! 1. Aggregate - reduce raw status/check events to one state per reporter
//! 2. Require - infer which reporters the feedstock needs (reads files)
//! 3. Evaluate - match requirements against reporters (pure)

mod aggregate;
mod evaluate;
mod requirements;

pub use aggregate::{
    ReducedSignals, SELF_CHECK_NAMES, aggregate_checks, aggregate_statuses, reduce_check,
    reduce_status_state,
};
pub use evaluate::{
    NO_REQUIREMENTS, SignalMatcher, SubstringMatcher, Verdict, evaluate, evaluate_default,
};
pub use requirements::{
    APPVEYOR_PR_CONTEXT, LINTER, RequiredSet, circle_is_active, resolve_required,
};
