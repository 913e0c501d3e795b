//! Shared test helpers

#![allow(dead_code)]

pub mod mock_platform;

pub use mock_platform::{MockPlatformService, check, running_check, status};

use feedstock_automerge::merge::{AutomergeOptions, NotifyOptions};
use feedstock_automerge::types::{PlatformConfig, PrState, PullRequestDetails};
use std::time::Duration;

/// Author of bot PRs
pub const BOT: &str = "regro-cf-autotick-bot";

/// Head SHA used by [`make_pr`]
pub const HEAD_SHA: &str = "abc123";

/// Config for a feedstock repository
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "conda-forge".to_string(),
        repo: "foo-feedstock".to_string(),
        api_base: None,
    }
}

/// A fresh mock for [`github_config`]
pub fn mock() -> MockPlatformService {
    MockPlatformService::with_config(github_config())
}

/// An open, mergeable PR
pub fn make_pr(number: u64, author: &str, title: &str) -> PullRequestDetails {
    PullRequestDetails {
        number,
        title: title.to_string(),
        author: author.to_string(),
        labels: Vec::new(),
        state: PrState::Open,
        is_draft: false,
        mergeable: Some(true),
        mergeable_state: Some("clean".to_string()),
        head_sha: HEAD_SHA.to_string(),
    }
}

/// A bot PR that passes the policy gate
pub fn bot_pr(number: u64) -> PullRequestDetails {
    make_pr(number, BOT, "[bot-automerge] foo v1.2.3")
}

/// Options with no jitter so tests do not sleep
pub fn fast_options() -> AutomergeOptions {
    AutomergeOptions {
        notify: NotifyOptions {
            lookup_attempts: 2,
            max_jitter: Duration::ZERO,
        },
        ..AutomergeOptions::default()
    }
}
