//! feedstock-automerge - merge bot PRs on conda-forge style feedstocks
//!
//! Decides, for each PR, whether the author and repository policy allow an
//! automatic merge and whether every required CI signal has passed, then
//! merges and leaves a single status comment.
//!
//! # Layout
//!
//! - [`readiness`]: signal aggregation, required-set inference, evaluation
//! - [`merge`]: policy gate, merge execution, comments, orchestration
//! - [`platform`]: the GitHub seam (`PlatformService`) and its client
//! - [`config`]: the feedstock's `conda-forge.yml`

pub mod auth;
pub mod config;
pub mod error;
pub mod merge;
pub mod platform;
pub mod readiness;
pub mod types;
