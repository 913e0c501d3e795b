//! Command line surface of the `automerge` binary

mod context;
mod event;

use clap::Parser;
use context::CommandContext;
use event::EventTarget;
use feedstock_automerge::error::Result;
use feedstock_automerge::merge::{AutomergeOptions, automerge_open_prs, automerge_pr};
use std::path::PathBuf;
use tracing::info;

/// Merge bot PRs on a feedstock once every required CI signal has passed
#[derive(Parser, Debug)]
#[command(name = "automerge", version, about)]
pub struct Args {
    /// Name of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event: String,

    /// Path to the event payload JSON
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Target repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// API token (defaults to INPUT_GITHUB_TOKEN, GITHUB_TOKEN or GH_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Status context to ignore; may be repeated
    #[arg(long = "ignore-status", value_name = "CONTEXT")]
    pub ignored_statuses: Vec<String>,

    /// Only evaluate this PR, regardless of the event
    #[arg(long)]
    pub pr: Option<u64>,
}

/// Evaluate the PRs the event points at
pub async fn run(args: Args) -> Result<()> {
    let ctx = CommandContext::new(&args)?;
    let platform = ctx.platform.as_ref();

    let options = AutomergeOptions {
        ignored_statuses: args.ignored_statuses.clone(),
        ..AutomergeOptions::default()
    };

    let target_pr = match (args.pr, ctx.event.target()) {
        (Some(number), _) => Some(number),
        (None, EventTarget::PayloadPr) => Some(ctx.payload.pr_number()?),
        (None, EventTarget::AllOpen) => None,
    };

    match target_pr {
        Some(number) => {
            let pr = platform.get_pr_details(number).await?;
            automerge_pr(platform, &pr, &options).await?;
        }
        None => {
            let decisions = automerge_open_prs(platform, &options).await?;
            let merged = decisions.iter().filter(|(_, d)| d.allowed).count();
            info!(evaluated = decisions.len(), merged, "sweep finished");
        }
    }

    Ok(())
}
