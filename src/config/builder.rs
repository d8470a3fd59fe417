//! Type-safe builder for `LinkCheckConfig` using the typestate pattern
//!
//! The root directory is the only required field, so the builder has two
//! states: `()` before `root_dir` is set and `WithRootDir` after. `build` is
//! only available in the second state and validates the whole configuration.

use anyhow::{Context, Result, bail};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::types::LinkCheckConfig;
use crate::utils::is_valid_url;

// Type states for the builder
pub struct WithRootDir;

pub struct LinkCheckConfigBuilder<State = ()> {
    pub(crate) draft: LinkCheckConfig,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for LinkCheckConfigBuilder<()> {
    fn default() -> Self {
        Self {
            draft: LinkCheckConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl LinkCheckConfig {
    /// Create a builder for configuring a `LinkCheckConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> LinkCheckConfigBuilder<()> {
        LinkCheckConfigBuilder::default()
    }

    /// Reopen a configuration for further changes, e.g. CLI overrides
    #[must_use]
    pub fn into_builder(self) -> LinkCheckConfigBuilder<WithRootDir> {
        LinkCheckConfigBuilder {
            draft: self,
            _phantom: PhantomData,
        }
    }

    /// Load a JSON configuration file
    ///
    /// Missing fields take their defaults. A relative `root_dir` is resolved
    /// against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration does not validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: LinkCheckConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if config.root_dir.is_relative()
            && let Some(base) = path.parent()
        {
            config.root_dir = base.join(&config.root_dir);
        }
        config.validated()
    }

    /// Check every invariant and normalize paths to absolute form
    pub(crate) fn validated(mut self) -> Result<Self> {
        if !self.root_dir.is_dir() {
            bail!("root_dir {} is not a directory", self.root_dir.display());
        }
        self.root_dir = self
            .root_dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve root_dir {}", self.root_dir.display()))?;

        if let Some(report_dir) = &self.report_dir {
            self.report_dir = Some(
                std::path::absolute(report_dir)
                    .with_context(|| format!("Failed to resolve report_dir {}", report_dir.display()))?,
            );
        }

        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.probe_timeout_ms == 0 {
            bail!("probe_timeout_ms must be greater than 0");
        }
        if self.archive_timeout_ms == 0 {
            bail!("archive_timeout_ms must be greater than 0");
        }
        if self.archive_max_attempts == 0 {
            bail!("archive_max_attempts must be at least 1");
        }
        if self.checkpoint_interval == 0 {
            bail!("checkpoint_interval must be at least 1");
        }
        if self.extensions.is_empty() {
            bail!("extensions must not be empty");
        }
        if !is_valid_url(&self.archive_endpoint) {
            bail!("archive_endpoint is not a valid URL: {}", self.archive_endpoint);
        }
        if !is_valid_url(&self.archive_web_prefix) {
            bail!("archive_web_prefix is not a valid URL: {}", self.archive_web_prefix);
        }
        if let Some(timestamp) = &self.archive_timestamp
            && (timestamp.is_empty() || !timestamp.chars().all(|c| c.is_ascii_digit()))
        {
            bail!("archive_timestamp must be digits (YYYYMMDDhhmmss prefix), got {timestamp:?}");
        }

        Ok(self)
    }
}

impl LinkCheckConfigBuilder<()> {
    pub fn root_dir(mut self, dir: impl Into<PathBuf>) -> LinkCheckConfigBuilder<WithRootDir> {
        self.draft.root_dir = dir.into();
        LinkCheckConfigBuilder {
            draft: self.draft,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when all required fields are set
impl LinkCheckConfigBuilder<WithRootDir> {
    /// Replace the root directory
    #[must_use]
    pub fn root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.draft.root_dir = dir.into();
        self
    }

    /// Validate and produce the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not an existing directory or any
    /// numeric setting is out of range.
    pub fn build(self) -> Result<LinkCheckConfig> {
        self.draft.validated()
    }
}
