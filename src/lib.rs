//! # manifest_release
//!
//! Release automation for projects whose version lives in JSON and XML
//! manifests (`package.json`, `bower.json`, Cordova `config.xml`, ...).
//!
//! A release is a fixed sequence of steps, each running its prerequisites
//! first:
//!
//! ```text
//! bump -> commit -> tag -> push -> create-release
//! ```
//!
//! - **Bump**: increment (or overwrite) the version of the first JSON
//!   manifest and write that exact version into every configured manifest
//! - **Commit / Tag / Push**: `docs(changelog): version X`, tag `vX`, push
//!   branch and tags to the configured remote
//! - **Create release**: publish the newest `CHANGELOG.md` section as the
//!   release notes on GitHub
//!
//! ## Usage
//!
//! ```bash
//! manifest_release bump --minor
//! manifest_release release --ver=2.0.0
//! manifest_release release-full --username jo --password secret
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod pipeline;
pub mod version;

pub use cli::Args;
pub use config::{EnvConfig, ReleaseConfig};
pub use error::{ReleaseError, Result};
pub use git::{GitManager, GitOperations, SystemGit};
pub use github::{GitHubReleaseManager, ReleaseRequest};
pub use pipeline::{PipelineReport, ReleaseContext, ReleasePipeline, Step};
pub use version::{BumpRequest, VersionBump, VersionUpdater};
