//! Git operations and management for release workflows.
//!
//! Git is driven through the system `git` executable; the release steps only
//! see the `GitOperations` trait.

mod manager;
mod operations;
mod system_git;

pub use manager::{GitConfig, GitManager, commit_message, tag_name};
pub use operations::{CommitInfo, GitOperations, PushInfo, TagInfo};
pub use system_git::SystemGit;
