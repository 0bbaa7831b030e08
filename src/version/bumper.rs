//! Semantic version bumping.

use crate::error::{CliError, ReleaseError, Result, VersionError};
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;
use std::str::FromStr;

/// Which component of a version to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionBump {
    /// `X.0.0`
    Major,
    /// `x.Y.0`
    Minor,
    /// `x.y.Z`
    #[default]
    Patch,
    /// `x.y.z-N`
    Prerelease,
}

impl VersionBump {
    /// Lowercase name as accepted on the command line and in `BUMP`
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
            VersionBump::Prerelease => "prerelease",
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionBump {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            "prerelease" => Ok(VersionBump::Prerelease),
            other => Err(CliError::InvalidArguments {
                reason: format!(
                    "unknown bump type '{}' (expected major, minor, patch or prerelease)",
                    other
                ),
            }
            .into()),
        }
    }
}

/// What a bump should do to the current version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpRequest {
    /// Increment one component
    Increment(VersionBump),
    /// Overwrite with a literal version
    Explicit(String),
}

impl Default for BumpRequest {
    fn default() -> Self {
        BumpRequest::Increment(VersionBump::Patch)
    }
}

impl BumpRequest {
    /// Compute the next version string from `current`.
    ///
    /// An explicit request ignores `current` entirely, so a manifest with a
    /// malformed version can still be repaired with `--ver`.
    pub fn apply(&self, current: &str) -> Result<Version> {
        match self {
            BumpRequest::Explicit(literal) => parse_version(literal),
            BumpRequest::Increment(bump) => {
                let current = parse_version(current)?;
                VersionBumper::new(current).bump(*bump)
            }
        }
    }
}

impl fmt::Display for BumpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpRequest::Increment(bump) => write!(f, "{} bump", bump),
            BumpRequest::Explicit(v) => write!(f, "explicit version {}", v),
        }
    }
}

/// Parse a version string, reporting the offending text on failure
pub fn parse_version(text: &str) -> Result<Version> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(VersionError::InvalidVersion {
            version: text.to_string(),
            reason: "version is empty".to_string(),
        }
        .into());
    }
    Version::parse(trimmed).map_err(|source| {
        VersionError::ParseFailed {
            version: trimmed.to_string(),
            source,
        }
        .into()
    })
}

/// Applies increments to a single version
#[derive(Debug, Clone)]
pub struct VersionBumper {
    current: Version,
}

impl VersionBumper {
    /// Wrap the version to bump
    pub fn new(current: Version) -> Self {
        Self { current }
    }

    /// Increment following npm's semver rules.
    ///
    /// A prerelease of the target version is promoted rather than skipped:
    /// `2.0.0-rc.1` bumped `major` is `2.0.0`.
    pub fn bump(&self, bump: VersionBump) -> Result<Version> {
        let mut next = self.current.clone();
        next.build = BuildMetadata::EMPTY;
        let had_pre = !next.pre.is_empty();

        match bump {
            VersionBump::Major => {
                if !(had_pre && next.minor == 0 && next.patch == 0) {
                    next.major += 1;
                }
                next.minor = 0;
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            VersionBump::Minor => {
                if !(had_pre && next.patch == 0) {
                    next.minor += 1;
                }
                next.patch = 0;
                next.pre = Prerelease::EMPTY;
            }
            VersionBump::Patch => {
                if !had_pre {
                    next.patch += 1;
                }
                next.pre = Prerelease::EMPTY;
            }
            VersionBump::Prerelease => {
                if had_pre {
                    next.pre = next_prerelease(&next.pre)?;
                } else {
                    next.patch += 1;
                    next.pre = Prerelease::new("0").map_err(|source| VersionError::ParseFailed {
                        version: "0".to_string(),
                        source,
                    })?;
                }
            }
        }

        Ok(next)
    }
}

/// Increment the last numeric identifier, or append `.0` if there is none
fn next_prerelease(pre: &Prerelease) -> Result<Prerelease> {
    let mut ids: Vec<String> = pre.as_str().split('.').map(str::to_string).collect();

    let numeric = ids
        .iter()
        .rposition(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()));

    match numeric {
        Some(idx) => {
            let n: u64 = ids[idx].parse().map_err(|_| VersionError::InvalidVersion {
                version: pre.to_string(),
                reason: format!("prerelease identifier '{}' overflows", ids[idx]),
            })?;
            ids[idx] = (n + 1).to_string();
        }
        None => ids.push("0".to_string()),
    }

    let joined = ids.join(".");
    Prerelease::new(&joined).map_err(|source| {
        VersionError::ParseFailed {
            version: joined,
            source,
        }
        .into()
    })
}
