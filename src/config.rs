//! Repository policy loaded from `conda-forge.yml`.

use crate::error::{Error, Result};
use crate::platform::FileReader;
use serde::Deserialize;
use tracing::debug;

/// Path of the policy document within the feedstock.
pub const CONFIG_FILE: &str = "conda-forge.yml";

/// The parts of `conda-forge.yml` the automerge bot cares about.
///
/// Unknown keys are ignored; every missing key takes its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedstockConfig {
    /// `bot:` section
    pub bot: BotConfig,
    /// `provider:` section
    pub provider: ProviderConfig,
}

/// `bot:` section of `conda-forge.yml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Whether bot PRs may be merged automatically (off unless set)
    pub automerge: bool,
    /// Fine-tuning of automerge behavior
    pub automerge_options: AutomergeOptions,
}

/// `bot.automerge_options:` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutomergeOptions {
    /// Requirement names the feedstock does not want to wait for
    pub ignored_statuses: Vec<String>,
}

/// `provider:` section (only the keys we read)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// CI provider for windows builds (`azure`, `appveyor`, `default`, ...)
    pub win: Option<String>,
}

impl FeedstockConfig {
    /// Parse a policy document.
    ///
    /// An empty document yields the defaults.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse {CONFIG_FILE}: {e}")))?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
            .map_err(|e| Error::Config(format!("failed to parse {CONFIG_FILE}: {e}")))
    }

    /// Whether the feedstock has opted into automerge.
    pub const fn automerge_enabled(&self) -> bool {
        self.bot.automerge
    }

    /// Requirement names the feedstock asked us to skip.
    pub fn ignored_statuses(&self) -> &[String] {
        &self.bot.automerge_options.ignored_statuses
    }

    /// Whether windows builds were explicitly moved off appveyor.
    pub fn windows_uses_other_provider(&self) -> bool {
        self.provider
            .win
            .as_deref()
            .is_some_and(|p| !p.eq_ignore_ascii_case("appveyor"))
    }
}

/// Load the policy document from the repository at `git_ref`.
///
/// A missing document is a configuration error, not a default.
pub async fn load_feedstock_config<F>(files: &F, git_ref: &str) -> Result<FeedstockConfig>
where
    F: FileReader + ?Sized,
{
    let bytes = files
        .read_file(git_ref, CONFIG_FILE)
        .await?
        .ok_or_else(|| Error::Config(format!("{CONFIG_FILE} not found at {git_ref}")))?;

    let content = String::from_utf8(bytes)
        .map_err(|e| Error::Config(format!("{CONFIG_FILE} is not valid UTF-8: {e}")))?;

    let cfg = FeedstockConfig::parse(&content)?;
    debug!(
        automerge = cfg.automerge_enabled(),
        ignored = ?cfg.ignored_statuses(),
        "loaded feedstock config"
    );
    Ok(cfg)
}
