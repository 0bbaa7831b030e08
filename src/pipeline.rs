//! The release task sequence: bump, commit, tag, push, create-release.
//!
//! Steps run strictly in order and the first failing step stops the run.
//! The one exception is release creation on the hosting service: its API
//! failures are reported in the result but leave the run successful.

use crate::changelog;
use crate::cli::RuntimeConfig;
use crate::config::ReleaseConfig;
use crate::error::{GitError, Result};
use crate::git::{CommitInfo, GitConfig, GitManager, GitOperations, PushInfo, SystemGit, TagInfo};
use crate::github::{
    Credentials, GitHubReleaseConfig, GitHubReleaseManager, GitHubReleaseResult, ReleaseRequest,
    RepositorySlug,
};
use crate::version::{self, BumpRequest, UpdateResult, VersionUpdater};
use semver::Version;
use std::fmt;
use std::path::{Path, PathBuf};

/// One step of the release sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Rewrite manifest versions
    Bump,
    /// Commit the manifests
    Commit,
    /// Tag `v<version>`
    Tag,
    /// Push branch and tags
    Push,
    /// Publish the hosted release
    CreateRelease,
}

impl Step {
    /// Step that must run immediately before this one
    pub fn prerequisite(self) -> Option<Step> {
        match self {
            Step::Bump => None,
            Step::Commit => Some(Step::Bump),
            Step::Tag => Some(Step::Commit),
            Step::Push => Some(Step::Tag),
            Step::CreateRelease => Some(Step::Push),
        }
    }

    /// Whether the step talks to git
    pub fn needs_git(self) -> bool {
        matches!(self, Step::Commit | Step::Tag | Step::Push)
    }

    /// Ordered steps needed to reach `target`, prerequisites first
    pub fn plan(target: Step) -> Vec<Step> {
        let mut steps = vec![target];
        while let Some(prev) = steps.last().and_then(|s| s.prerequisite()) {
            steps.push(prev);
        }
        steps.reverse();
        steps
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Bump => "bump",
            Step::Commit => "commit",
            Step::Tag => "tag",
            Step::Push => "push",
            Step::CreateRelease => "create-release",
        })
    }
}

/// Inputs shared by every step
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    /// Project root
    pub root: PathBuf,
    /// Project configuration
    pub config: ReleaseConfig,
    /// What the bump step does
    pub request: BumpRequest,
    /// Release API authentication
    pub credentials: Credentials,
}

impl ReleaseContext {
    /// Path of the manifest the version is read back from
    pub fn primary_manifest(&self) -> PathBuf {
        self.root.join(&self.config.primary_manifest)
    }

    /// Path of the changelog
    pub fn changelog(&self) -> PathBuf {
        self.root.join(&self.config.changelog)
    }

    /// Version currently in the primary manifest
    pub fn current_version(&self) -> Result<Version> {
        let text = version::read_release_version(&self.primary_manifest())?;
        version::parse_version(&text)
    }

    /// Git settings derived from the project config
    pub fn git_config(&self) -> GitConfig {
        GitConfig {
            remote: self.config.remote.clone(),
            branch: self.config.branch.clone(),
        }
    }
}

/// Build the release payload from the primary manifest and changelog
pub fn build_release_request(ctx: &ReleaseContext) -> Result<ReleaseRequest> {
    let repository = ctx
        .config
        .repository
        .as_deref()
        .ok_or(crate::error::GitHubError::MissingRepository)?;
    let slug = RepositorySlug::parse(repository)?;
    let version = ctx.current_version()?;
    let body = changelog::read_excerpt(&ctx.changelog())?;
    Ok(ReleaseRequest::new(&slug, &version, body))
}

/// How the create-release step ended
#[derive(Debug, Clone)]
pub enum ReleaseOutcome {
    /// Release was created
    Created(GitHubReleaseResult),
    /// Release creation failed; the run still succeeded
    Failed(String),
}

/// What a pipeline run did
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Steps that completed, in order
    pub completed: Vec<Step>,
    /// Bump result
    pub bump: Option<UpdateResult>,
    /// Release commit
    pub commit: Option<CommitInfo>,
    /// Release tag
    pub tag: Option<TagInfo>,
    /// Branch push followed by tag push
    pub pushes: Vec<PushInfo>,
    /// Hosted release
    pub release: Option<ReleaseOutcome>,
}

/// Runs a planned sequence of steps
pub struct ReleasePipeline<'a, G = SystemGit> {
    ctx: &'a ReleaseContext,
    output: &'a RuntimeConfig,
    git: Option<GitManager<G>>,
}

impl<'a> ReleasePipeline<'a, SystemGit> {
    /// Open the project's repository if `target` needs git
    pub async fn open(
        ctx: &'a ReleaseContext,
        output: &'a RuntimeConfig,
        target: Step,
    ) -> Result<Self> {
        let git = if Step::plan(target).iter().any(|s| s.needs_git()) {
            Some(GitManager::open(&ctx.root, ctx.git_config()).await?)
        } else {
            None
        };
        Ok(Self::new(ctx, output, git))
    }
}

impl<'a, G: GitOperations> ReleasePipeline<'a, G> {
    /// Pipeline over an already-open repository
    pub fn new(ctx: &'a ReleaseContext, output: &'a RuntimeConfig, git: Option<GitManager<G>>) -> Self {
        Self { ctx, output, git }
    }

    fn git(&self) -> Result<&GitManager<G>> {
        self.git.as_ref().ok_or_else(|| {
            GitError::NotRepository {
                path: self.ctx.root.clone(),
            }
            .into()
        })
    }

    /// Run every step up to and including `target`
    pub async fn run(&self, target: Step) -> Result<PipelineReport> {
        let mut report = PipelineReport::default();

        for step in Step::plan(target) {
            log::info!("step: {}", step);
            match step {
                Step::Bump => {
                    self.output.println(&format!("📦 Bumping versions ({})...", self.ctx.request));
                    let result = self.bump()?;
                    self.output.success_println(&format!(
                        "Bumped {} -> {}",
                        if result.previous_version.is_empty() { "?" } else { result.previous_version.as_str() },
                        result.new_version
                    ));
                    for file in &result.modified_files {
                        self.output.indent(&file.display().to_string());
                    }
                    for file in &result.skipped_files {
                        self.output
                            .warning_println(&format!("Skipped {} (not JSON or XML)", file.display()));
                    }
                    report.bump = Some(result);
                }
                Step::Commit => {
                    self.output.println("📝 Creating git commit...");
                    let version = self.ctx.current_version()?;
                    let commit = self.git()?.commit_release(&version).await?;
                    self.output
                        .success_println(&format!("Committed: \"{}\" ({})", commit.message, commit.short_hash));
                    report.commit = Some(commit);
                }
                Step::Tag => {
                    self.output.println("🏷  Tagging release...");
                    let version = self.ctx.current_version()?;
                    let tag = self.git()?.tag_release(&version).await?;
                    self.output.success_println(&format!("Tagged: {}", tag.name));
                    report.tag = Some(tag);
                }
                Step::Push => {
                    let git = self.git()?;
                    self.output.println(&format!(
                        "🚀 Pushing {} to {}...",
                        git.config().branch,
                        git.config().remote
                    ));
                    report.pushes = git.push_release().await?;
                    self.output.success_println(&format!("Pushed to {}", git.config().remote));
                }
                Step::CreateRelease => {
                    self.output.println("📰 Creating release...");
                    let outcome = match self.create_release().await {
                        Ok(created) => {
                            self.output.success_println(&format!(
                                "Response: \"{}\": {}",
                                created.status, created.html_url
                            ));
                            ReleaseOutcome::Created(created)
                        }
                        Err(e) if !e.halts_pipeline() => {
                            log::error!("Error: {}", e);
                            self.output.warning_println(&format!("Release not created: {}", e));
                            ReleaseOutcome::Failed(e.to_string())
                        }
                        Err(e) => return Err(e),
                    };
                    report.release = Some(outcome);
                }
            }
            report.completed.push(step);
        }

        Ok(report)
    }

    fn bump(&self) -> Result<UpdateResult> {
        VersionUpdater::new(&self.ctx.root, self.ctx.config.version_files.clone())
            .with_client_folder(self.ctx.config.client_folder.clone())
            .update(&self.ctx.request)
    }

    async fn create_release(&self) -> Result<GitHubReleaseResult> {
        let request = build_release_request(self.ctx)?;
        self.output.verbose_println(&format!(
            "{}/{} {} \"{}\"",
            request.owner, request.repo, request.tag_name, request.name
        ));
        let manager = GitHubReleaseManager::new(GitHubReleaseConfig::from_release_config(
            &self.ctx.config,
            self.ctx.credentials.clone(),
        ))?;
        manager.create_release(&request).await
    }
}

/// Open the repository if needed and run `target`
pub async fn run_task(
    ctx: &ReleaseContext,
    output: &RuntimeConfig,
    target: Step,
) -> Result<PipelineReport> {
    ReleasePipeline::open(ctx, output, target).await?.run(target).await
}

/// Resolve the project root the way the CLI does
pub fn project_root(path: &Path) -> Result<PathBuf> {
    Ok(std::fs::canonicalize(path)?)
}
