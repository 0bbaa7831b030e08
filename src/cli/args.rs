//! Command line argument parsing and validation.
//!
//! Every task runs its prerequisites first, so `push` also bumps, commits
//! and tags.

use crate::config::EnvConfig;
use crate::error::Result;
use crate::pipeline::Step;
use crate::version::{BumpRequest, VersionBump};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bump manifest versions, commit, tag, push and publish a release
#[derive(Parser, Debug)]
#[command(
    name = "manifest_release",
    version,
    about = "Bump manifest versions, commit, tag, push and publish a release",
    long_about = "Bump the version in every configured JSON/XML manifest, then commit, tag and push it.

Usage:
  manifest_release bump --minor
  manifest_release bump --ver=1.2.3
  manifest_release release
  manifest_release release-full --username jo --password secret
  BUMP=major manifest_release release"
)]
pub struct Args {
    /// Task to run
    #[command(subcommand)]
    pub command: Command,

    /// Bump the patch version (default)
    #[arg(long, global = true)]
    pub patch: bool,

    /// Bump the minor version
    #[arg(long, global = true)]
    pub minor: bool,

    /// Bump the major version
    #[arg(long, global = true)]
    pub major: bool,

    /// Bump the prerelease number
    #[arg(long, global = true)]
    pub prerelease: bool,

    /// Set this exact version instead of incrementing
    #[arg(long = "ver", value_name = "VERSION", global = true)]
    pub ver: Option<String>,

    /// Release API user for basic authentication
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Release API password or token for basic authentication
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Project root holding the manifests
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub project: PathBuf,

    /// Config file, relative to the project root (default: release.toml or .release.toml there)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show extra detail
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Release tasks
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Bump the version in every manifest
    Bump,
    /// Bump, then commit the manifests
    Commit,
    /// Bump, commit, then tag v<version>
    Tag,
    /// Bump, commit, tag, then push branch and tags
    Push,
    /// Publish a new release version (same as push)
    Release,
    /// Release, then create the hosted release from the changelog
    #[command(name = "release-full", alias = "release:full")]
    ReleaseFull,
    /// Print the release payload built from the changelog without sending it
    #[command(name = "changelog-preview", alias = "changelog:testFmt")]
    ChangelogPreview,
}

impl Command {
    /// Name shown in messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Bump => "bump",
            Command::Commit => "commit",
            Command::Tag => "tag",
            Command::Push => "push",
            Command::Release => "release",
            Command::ReleaseFull => "release-full",
            Command::ChangelogPreview => "changelog-preview",
        }
    }

    /// Last pipeline step this task runs; `None` for tasks outside the pipeline
    pub fn target_step(&self) -> Option<Step> {
        match self {
            Command::Bump => Some(Step::Bump),
            Command::Commit => Some(Step::Commit),
            Command::Tag => Some(Step::Tag),
            Command::Push | Command::Release => Some(Step::Push),
            Command::ReleaseFull => Some(Step::CreateRelease),
            Command::ChangelogPreview => None,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(ver) = &self.ver
            && ver.trim().is_empty()
        {
            return Err("--ver needs a version, e.g. --ver=1.2.3".to_string());
        }
        Ok(())
    }

    /// Bump type selected by flags alone.
    ///
    /// When several flags are given the last one checked wins:
    /// prerelease over major over minor over patch.
    pub fn flag_bump(&self) -> VersionBump {
        let mut bump = VersionBump::Patch;
        if self.minor {
            bump = VersionBump::Minor;
        }
        if self.major {
            bump = VersionBump::Major;
        }
        if self.prerelease {
            bump = VersionBump::Prerelease;
        }
        bump
    }

    /// Resolve what the bump step should do.
    ///
    /// `--ver` wins outright; otherwise `BUMP` overrides the flags.
    pub fn bump_request(&self, env: &EnvConfig) -> Result<BumpRequest> {
        if let Some(ver) = &self.ver {
            return Ok(BumpRequest::Explicit(ver.trim().to_string()));
        }
        let bump = match env.get("BUMP") {
            Some(value) => value.parse()?,
            None => self.flag_bump(),
        };
        Ok(BumpRequest::Increment(bump))
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Runtime configuration that prints nothing but errors
    pub fn quiet() -> Self {
        Self::new(false, true)
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print message only in verbose mode
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}
