//! Error types for manifest_release operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for manifest_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all manifest_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Version management errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Release hosting errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Changelog could not be read
    #[error("Failed to read changelog {path}: {source}")]
    Changelog {
        /// Changelog path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Version management errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Invalid version format
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Version parsing failed
    #[error("Failed to parse version '{version}': {source}")]
    ParseFailed {
        /// Version string
        version: String,
        /// Parsing error
        #[source]
        source: semver::Error,
    },

    /// Manifest carries no version field
    #[error("No version field found in {path}")]
    MissingVersion {
        /// Manifest path
        path: PathBuf,
    },

    /// Failed to read or parse a manifest
    #[error("Failed to read manifest {path}: {reason}")]
    ManifestReadFailed {
        /// Manifest path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Failed to write a manifest
    #[error("Failed to update manifest {path}: {reason}")]
    ManifestUpdateFailed {
        /// Manifest path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Nothing to bump
    #[error("No JSON or XML version files configured")]
    NoManifests,
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// git executable not on PATH
    #[error("git executable not found on PATH: {reason}")]
    GitNotFound {
        /// Reason for the error
        reason: String,
    },

    /// Not a git repository
    #[error("Not a git repository: {path}")]
    NotRepository {
        /// Path that was probed
        path: PathBuf,
    },

    /// A git subprocess exited unsuccessfully
    #[error("'{command}' failed: {stderr}")]
    CommandFailed {
        /// Command line that was run
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// Tag already exists
    #[error("Git tag '{tag}' already exists. Choose a different version.")]
    TagExists {
        /// Tag name
        tag: String,
    },

    /// Commit failed
    #[error("Git commit failed: {reason}")]
    CommitFailed {
        /// Reason for the error
        reason: String,
    },

    /// Push failed
    #[error("Git push failed: {reason}")]
    PushFailed {
        /// Reason for the error
        reason: String,
    },
}

/// Release hosting API errors
#[derive(Error, Debug)]
pub enum GitHubError {
    /// No repository configured
    #[error("No repository configured. Set `repository` in release.toml.")]
    MissingRepository,

    /// Repository string did not yield owner and name
    #[error("Cannot derive owner/repo from '{repository}'")]
    InvalidRepository {
        /// Configured repository string
        repository: String,
    },

    /// Transport level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message reported by the API
        message: String,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    ReadFailed {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this tool
    #[error("Failed to parse config {path}: {source}")]
    ParseFailed {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Git(GitError::GitNotFound { .. }) => vec![
                "Install git and make sure it is on PATH".to_string(),
            ],
            ReleaseError::Git(GitError::NotRepository { .. }) => vec![
                "Run from inside the project repository or pass --project <dir>".to_string(),
                "Initialize a repository: git init".to_string(),
            ],
            ReleaseError::Git(GitError::TagExists { tag }) => vec![
                format!("Delete the stale tag: git tag -d {}", tag),
                "Pass --ver=<version> to release a different version".to_string(),
            ],
            ReleaseError::Git(GitError::PushFailed { .. }) => vec![
                "Verify git remote URL: git remote -v".to_string(),
                "Check SSH key configuration: ssh -T git@github.com".to_string(),
                "The version bump, commit and tag are already applied locally".to_string(),
            ],
            ReleaseError::Version(VersionError::NoManifests) => vec![
                "List your manifests under `version_files` in release.toml".to_string(),
            ],
            ReleaseError::Version(VersionError::InvalidVersion { .. })
            | ReleaseError::Version(VersionError::ParseFailed { .. }) => vec![
                "Use a semantic version such as 1.2.3 or 1.2.3-beta.1".to_string(),
            ],
            ReleaseError::Changelog { path, .. } => vec![
                format!("Create {} or point `changelog` in release.toml at it", path.display()),
            ],
            ReleaseError::GitHub(GitHubError::MissingRepository) => vec![
                "Add `repository = \"owner/repo\"` to release.toml".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Whether the pipeline must stop when this error occurs
    pub fn halts_pipeline(&self) -> bool {
        !matches!(self, ReleaseError::GitHub(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_errors_do_not_halt() {
        let err = ReleaseError::from(GitHubError::Api {
            status: 422,
            message: "Validation Failed".to_string(),
        });
        assert!(!err.halts_pipeline());

        let err = ReleaseError::from(GitError::PushFailed {
            reason: "rejected".to_string(),
        });
        assert!(err.halts_pipeline());
    }

    #[test]
    fn tag_exists_suggests_deleting_tag() {
        let err = ReleaseError::from(GitError::TagExists {
            tag: "v1.0.0".to_string(),
        });
        let suggestions = err.recovery_suggestions();
        assert!(suggestions.iter().any(|s| s.contains("git tag -d v1.0.0")));
    }
}
