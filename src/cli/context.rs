//! Shared command context
//!
//! Resolves the repository, token and payload, then builds the platform
//! service the engine talks to.

use crate::cli::Args;
use crate::cli::event::{EventKind, EventPayload, split_repository};
use feedstock_automerge::auth::get_github_auth;
use feedstock_automerge::error::{Error, Result};
use feedstock_automerge::platform::{GitHubService, PlatformService};
use tracing::debug;

/// Everything a run needs after argument parsing
pub struct CommandContext {
    /// The triggering event
    pub event: EventKind,
    /// Parsed payload (empty when no payload file was given)
    pub payload: EventPayload,
    /// Platform service for the target repository
    pub platform: Box<dyn PlatformService>,
}

impl CommandContext {
    /// Build the context.
    ///
    /// The event name is checked before anything else so an unknown event
    /// fails without touching the network or needing a token.
    pub fn new(args: &Args) -> Result<Self> {
        let event: EventKind = args.event.parse()?;

        let payload = match &args.event_path {
            Some(path) => EventPayload::load(path)?,
            None => EventPayload::default(),
        };

        let full_name = args
            .repository
            .as_deref()
            .or_else(|| payload.repository())
            .ok_or_else(|| {
                Error::EventPayload(
                    "no repository given; set GITHUB_REPOSITORY or --repository".to_string(),
                )
            })?;
        let (owner, repo) = split_repository(full_name)?;

        let auth = get_github_auth(args.token.as_deref())?;
        debug!(source = ?auth.source, repo = %full_name, "resolved GitHub auth");

        let platform = GitHubService::new(&auth.token, owner, repo, args.api_url.clone())?;

        Ok(Self {
            event,
            payload,
            platform: Box::new(platform),
        })
    }
}
