//! Release-level git steps: commit, tag and push.

use crate::error::Result;
use crate::git::{CommitInfo, GitOperations, PushInfo, SystemGit, TagInfo};
use semver::Version;
use std::path::Path;

/// Configuration for Git operations
#[derive(Debug, Clone)]
pub struct GitConfig {
    /// Remote name for push operations
    pub remote: String,
    /// Branch pushed to the remote
    pub branch: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            branch: "master".to_string(),
        }
    }
}

/// Release commit message: `docs(changelog): version 1.2.3`
pub fn commit_message(version: &Version) -> String {
    format!("docs(changelog): version {}", version)
}

/// Tag name for a version: `v1.2.3`
pub fn tag_name(version: &Version) -> String {
    format!("v{}", version)
}

/// Runs the git half of a release against one repository
#[derive(Debug)]
pub struct GitManager<G = SystemGit> {
    repository: G,
    config: GitConfig,
}

impl GitManager<SystemGit> {
    /// Open the repository at `path` with the system git backend
    pub async fn open(path: &Path, config: GitConfig) -> Result<Self> {
        Ok(Self::new(SystemGit::open(path).await?, config))
    }
}

impl<G: GitOperations> GitManager<G> {
    /// Wrap an existing backend
    pub fn new(repository: G, config: GitConfig) -> Self {
        Self { repository, config }
    }

    /// Git configuration in use
    pub fn config(&self) -> &GitConfig {
        &self.config
    }

    /// Stage everything and commit the bump
    pub async fn commit_release(&self, version: &Version) -> Result<CommitInfo> {
        if self.repository.is_working_directory_clean().await? {
            log::warn!("working tree is clean; the release commit will fail");
        }
        self.repository.stage_all().await?;
        let message = commit_message(version);
        let commit = self.repository.commit(&message).await?;
        log::info!("committed {} \"{}\"", commit.short_hash, commit.message);
        Ok(commit)
    }

    /// Create the annotated `v<version>` tag on HEAD
    pub async fn tag_release(&self, version: &Version) -> Result<TagInfo> {
        let name = tag_name(version);
        let message = version.to_string();
        let tag = self.repository.create_annotated_tag(&name, &message).await?;
        log::info!("tagged {} at {}", tag.name, tag.target_commit);
        Ok(tag)
    }

    /// Push the branch, then push it again with tags
    pub async fn push_release(&self) -> Result<Vec<PushInfo>> {
        let current = self.repository.current_branch().await?;
        if current != self.config.branch {
            log::warn!(
                "checked out branch is '{}' but '{}' will be pushed",
                current,
                self.config.branch
            );
        }

        let mut pushes = Vec::with_capacity(2);
        for with_tags in [false, true] {
            let info = self
                .repository
                .push(&self.config.remote, &self.config.branch, with_tags)
                .await?;
            for warning in &info.warnings {
                log::warn!("{}", warning);
            }
            pushes.push(info);
        }
        log::info!("pushed {} to {}", self.config.branch, self.config.remote);
        Ok(pushes)
    }
}
