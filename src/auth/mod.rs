//! Authentication for GitHub
//!
//! The token comes from the command line or the environment the action
//! runs in.

use crate::error::{Error, Result};
use tracing::debug;

/// Environment variables checked for a token, in order
pub const TOKEN_ENV_VARS: &[&str] = &["INPUT_GITHUB_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

/// Source of authentication token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSource {
    /// Token passed on the command line
    Flag,
    /// Token from the named environment variable
    EnvVar(&'static str),
}

/// A resolved GitHub token
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// The token itself
    pub token: String,
    /// Where it came from
    pub source: AuthSource,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Resolve a token, preferring `explicit` over the environment.
pub fn get_github_auth(explicit: Option<&str>) -> Result<GitHubAuthConfig> {
    resolve_token(explicit, |name| std::env::var(name).ok())
}

fn resolve_token<F>(explicit: Option<&str>, lookup: F) -> Result<GitHubAuthConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(GitHubAuthConfig {
            token: token.to_string(),
            source: AuthSource::Flag,
        });
    }

    for name in TOKEN_ENV_VARS {
        if let Some(token) = lookup(name).filter(|t| !t.trim().is_empty()) {
            debug!(source = name, "using token from environment");
            return Ok(GitHubAuthConfig {
                token: token.trim().to_string(),
                source: AuthSource::EnvVar(name),
            });
        }
    }

    Err(Error::Auth(format!(
        "no GitHub token found; pass --token or set one of {}",
        TOKEN_ENV_VARS.join(", ")
    )))
}
