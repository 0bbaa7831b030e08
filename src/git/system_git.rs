//! GitOperations backed by the system `git` executable.

use crate::error::{GitError, Result};
use crate::git::{CommitInfo, GitOperations, PushInfo, TagInfo};
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

/// Field separator for `git log --format`
const SEP: &str = "\u{1f}";

/// Git backend using the system git binary
#[derive(Debug, Clone)]
pub struct SystemGit {
    /// Resolved git executable
    git: PathBuf,
    /// Working tree root
    work_tree: PathBuf,
}

impl SystemGit {
    /// Open the repository containing `path`
    pub async fn open(path: &Path) -> Result<Self> {
        let git = which::which("git").map_err(|e| GitError::GitNotFound {
            reason: e.to_string(),
        })?;

        let output = Command::new(&git)
            .arg("-C")
            .arg(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("not a git repository") {
                return Err(GitError::NotRepository {
                    path: path.to_path_buf(),
                }
                .into());
            }
            return Err(GitError::CommandFailed {
                command: "git rev-parse --show-toplevel".to_string(),
                stderr: stderr.trim().to_string(),
            }
            .into());
        }

        let work_tree = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        log::debug!("opened git repository at {}", work_tree.display());

        Ok(Self { git, work_tree })
    }

    /// Create a git command rooted at the working tree.
    ///
    /// Terminal prompts are disabled so a push needing credentials fails
    /// instead of hanging.
    fn git_cmd(&self) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.arg("-C").arg(&self.work_tree);
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.kill_on_drop(true);
        cmd
    }

    async fn output(&self, args: &[&str]) -> Result<Output> {
        log::debug!("git {}", args.join(" "));
        let output = self.git_cmd().args(args).output().await?;
        log::trace!(
            "git {} exited with {}: {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        Ok(output)
    }

    /// Run git and return trimmed stdout, failing on a non-zero exit
    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args).await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                stderr: failure_text(&output),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn head_commit_info(&self) -> Result<CommitInfo> {
        let format = ["%H", "%h", "%s", "%an", "%ae", "%at"].join(SEP);
        let raw = self
            .run(&["log", "-1", &format!("--format={}", format)])
            .await?;
        parse_commit_line(&raw).ok_or_else(|| {
            GitError::CommandFailed {
                command: "git log -1".to_string(),
                stderr: format!("unexpected output: {}", raw),
            }
            .into()
        })
    }
}

/// Prefer stderr, fall back to stdout (`git commit` reports "nothing to commit" there)
fn failure_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    }
}

fn parse_commit_line(raw: &str) -> Option<CommitInfo> {
    let mut fields = raw.split(SEP);
    let hash = fields.next()?.to_string();
    let short_hash = fields.next()?.to_string();
    let message = fields.next()?.to_string();
    let author_name = fields.next()?.to_string();
    let author_email = fields.next()?.to_string();
    let timestamp = fields
        .next()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(chrono::Utc::now);

    Some(CommitInfo {
        hash,
        short_hash,
        message,
        author_name,
        author_email,
        timestamp,
    })
}

impl GitOperations for SystemGit {
    async fn stage_all(&self) -> Result<()> {
        self.run(&["add", "."])
            .await
            .map_err(|e| GitError::CommitFailed {
                reason: format!("Failed to add files: {}", e),
            })?;
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<CommitInfo> {
        let output = self.output(&["commit", "-m", message]).await?;
        if !output.status.success() {
            return Err(GitError::CommitFailed {
                reason: failure_text(&output),
            }
            .into());
        }
        self.head_commit_info().await
    }

    async fn tag_exists(&self, tag_name: &str) -> Result<bool> {
        let refname = format!("refs/tags/{}", tag_name);
        let output = self
            .output(&["rev-parse", "--quiet", "--verify", &refname])
            .await?;
        Ok(output.status.success())
    }

    async fn create_annotated_tag(&self, tag_name: &str, message: &str) -> Result<TagInfo> {
        if self.tag_exists(tag_name).await? {
            return Err(GitError::TagExists {
                tag: tag_name.to_string(),
            }
            .into());
        }

        self.run(&["tag", "-a", tag_name, "-m", message]).await?;
        let target_commit = self
            .run(&["rev-parse", &format!("{}^{{commit}}", tag_name)])
            .await?;

        Ok(TagInfo {
            name: tag_name.to_string(),
            message: message.to_string(),
            target_commit,
        })
    }

    async fn push(&self, remote: &str, branch: &str, with_tags: bool) -> Result<PushInfo> {
        let mut args = vec!["push", remote, branch];
        if with_tags {
            args.push("--tags");
        }

        let output = self.output(&args).await?;
        if !output.status.success() {
            return Err(GitError::PushFailed {
                reason: format!("git {}: {}", args.join(" "), failure_text(&output)),
            }
            .into());
        }

        let warnings = String::from_utf8_lossy(&output.stderr)
            .lines()
            .filter(|l| l.starts_with("warning:"))
            .map(str::to_string)
            .collect();

        Ok(PushInfo {
            remote_name: remote.to_string(),
            branch: branch.to_string(),
            tags_pushed: with_tags,
            warnings,
        })
    }

    async fn current_branch(&self) -> Result<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn is_working_directory_clean(&self) -> Result<bool> {
        Ok(self.run(&["status", "--porcelain"]).await?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commit_line() {
        let line = format!(
            "abc123def{s}abc123d{s}docs(changelog): version 1.2.4{s}Jo Dev{s}jo@example.com{s}1456790400",
            s = SEP
        );
        let info = parse_commit_line(&line).unwrap();
        assert_eq!(info.short_hash, "abc123d");
        assert_eq!(info.message, "docs(changelog): version 1.2.4");
        assert_eq!(info.author_email, "jo@example.com");
        assert_eq!(info.timestamp.timestamp(), 1_456_790_400);
    }

    #[test]
    fn test_parse_commit_line_truncated() {
        assert!(parse_commit_line("abc").is_none());
    }
}
