//! Infer which CI reporters a feedstock must see pass before merging.
//!
//! Detection only looks at files in the PR head, read through a
//! [`FileReader`]. Nothing is cloned or checked out.

use crate::config::FeedstockConfig;
use crate::error::Result;
use crate::platform::FileReader;
use tracing::{debug, info};

/// Always required
pub const LINTER: &str = "linter";

/// Status context appveyor reports under; dropped when appveyor is not required
pub const APPVEYOR_PR_CONTEXT: &str = "continuous-integration/appveyor/pr";

/// Marker files for providers whose presence alone makes them required
const MARKER_FILES: &[(&str, &[&str])] = &[
    ("appveyor", &["appveyor.yml", ".appveyor.yml"]),
    ("drone", &[".drone.yml"]),
    ("travis", &[".travis.yml"]),
    ("azure", &["azure-pipelines.yml"]),
];

/// Circle config; its presence is not enough, see [`circle_is_active`]
const CIRCLE_CONFIG: &str = ".circleci/config.yml";

/// Lines of the filter block the re-renderer writes when circle is off
const CIRCLE_DISABLED_FINGERPRINT: [&str; 4] = ["filters:", "branches:", "ignore:", "- /.*/"];

/// Requirement tokens for one PR, in detection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredSet {
    tokens: Vec<String>,
}

impl RequiredSet {
    /// Build from tokens (lowercased, duplicates dropped)
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for token in tokens {
            set.push(token.as_ref());
        }
        set
    }

    fn push(&mut self, token: &str) {
        let token = token.to_ascii_lowercase();
        if !self.tokens.contains(&token) {
            self.tokens.push(token);
        }
    }

    /// Whether `token` is required
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Tokens in order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether nothing is required
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Status contexts to drop before aggregation given what is required
    pub fn extra_ignored_statuses(&self) -> Vec<String> {
        if self.contains("appveyor") {
            Vec::new()
        } else {
            vec![APPVEYOR_PR_CONTEXT.to_string()]
        }
    }

    fn remove_ignored(&mut self, ignored: &[String]) {
        self.tokens.retain(|token| {
            let hit = ignored.iter().find(|entry| {
                let entry = entry.to_ascii_lowercase();
                !entry.is_empty() && entry.contains(token.as_str())
            });
            if let Some(entry) = hit {
                info!(token = %token, ignored_by = %entry, "requirement ignored by feedstock config");
            }
            hit.is_none()
        });
    }
}

/// Whether circle builds anything, judged from its config text.
///
/// Circle is considered off when the config carries the four-line filter
/// block that ignores every branch, in that order.
pub fn circle_is_active(config: &str) -> bool {
    let mut expected = CIRCLE_DISABLED_FINGERPRINT.iter().peekable();
    for line in config.lines().map(str::trim) {
        if expected.peek().is_some_and(|want| **want == line) {
            expected.next();
        }
    }
    expected.peek().is_some()
}

async fn any_exists<F>(files: &F, git_ref: &str, paths: &[&str]) -> Result<bool>
where
    F: FileReader + ?Sized,
{
    for path in paths {
        if files.read_file(git_ref, path).await?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Determine required requirement tokens for the PR head at `git_ref`.
pub async fn resolve_required<F>(
    files: &F,
    git_ref: &str,
    cfg: &FeedstockConfig,
) -> Result<RequiredSet>
where
    F: FileReader + ?Sized,
{
    let mut required = RequiredSet::new([LINTER]);

    for (token, markers) in MARKER_FILES {
        if !any_exists(files, git_ref, markers).await? {
            continue;
        }
        if *token == "appveyor" && cfg.windows_uses_other_provider() {
            debug!("appveyor config present but windows builds use another provider");
            continue;
        }
        required.push(token);
    }

    if let Some(bytes) = files.read_file(git_ref, CIRCLE_CONFIG).await? {
        if circle_is_active(&String::from_utf8_lossy(&bytes)) {
            required.push("circle");
        } else {
            debug!("circle config present but every branch is filtered out");
        }
    }

    required.remove_ignored(cfg.ignored_statuses());

    info!(required = ?required.tokens(), "required checks and statuses");
    Ok(required)
}
