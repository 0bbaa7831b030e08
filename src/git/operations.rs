//! Core Git operations trait and types for release management.
//!
//! This module defines the GitOperations trait that specifies the Git
//! operations the release steps need. The implementation lives in
//! `system_git`, which drives the `git` executable.

use crate::error::Result;
use std::future::Future;

/// Trait defining all required Git operations for release management
pub trait GitOperations {
    /// Stage every change in the working tree (`git add .`)
    fn stage_all(&self) -> impl Future<Output = Result<()>>;

    /// Commit the index with `message`
    fn commit(&self, message: &str) -> impl Future<Output = Result<CommitInfo>>;

    /// Check if tag exists
    fn tag_exists(&self, tag_name: &str) -> impl Future<Output = Result<bool>>;

    /// Create an annotated tag on HEAD
    fn create_annotated_tag(
        &self,
        tag_name: &str,
        message: &str,
    ) -> impl Future<Output = Result<TagInfo>>;

    /// Push `branch` to `remote`, optionally pushing all tags as well
    fn push(
        &self,
        remote: &str,
        branch: &str,
        with_tags: bool,
    ) -> impl Future<Output = Result<PushInfo>>;

    /// Name of the checked-out branch (`HEAD` when detached)
    fn current_branch(&self) -> impl Future<Output = Result<String>>;

    /// Check if working directory is clean
    fn is_working_directory_clean(&self) -> impl Future<Output = Result<bool>>;
}

/// Information about a Git commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// Commit hash (full SHA)
    pub hash: String,
    /// Short commit hash
    pub short_hash: String,
    /// Commit subject
    pub message: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Commit timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Information about a Git tag
#[derive(Debug, Clone)]
pub struct TagInfo {
    /// Tag name
    pub name: String,
    /// Tag message
    pub message: String,
    /// Target commit hash
    pub target_commit: String,
}

/// Information about a push operation
#[derive(Debug, Clone)]
pub struct PushInfo {
    /// Remote name that was pushed to
    pub remote_name: String,
    /// Branch that was pushed
    pub branch: String,
    /// Whether tags were included
    pub tags_pushed: bool,
    /// `warning:` lines reported by git
    pub warnings: Vec<String>,
}
