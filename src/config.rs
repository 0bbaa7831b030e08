//! Project configuration (`release.toml`) and environment snapshot.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Config file names searched in the project root, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["release.toml", ".release.toml"];

/// Environment variables the tool reads
const ENV_KEYS: [&str; 3] = ["BUMP", "GH_TOKEN", "GITHUB_TOKEN"];

/// Release settings for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Manifests carrying the version (JSON and XML), relative to the project root
    pub version_files: Vec<PathBuf>,
    /// Manifest the commit, tag and release read the version from
    pub primary_manifest: PathBuf,
    /// Output folder for bumped XML manifests
    pub client_folder: Option<PathBuf>,
    /// Changelog whose newest section becomes the release body
    pub changelog: PathBuf,
    /// Hosting repository: `owner/repo` or any URL ending in it
    pub repository: Option<String>,
    /// Remote to push to
    pub remote: String,
    /// Branch to push
    pub branch: String,
    /// Release API root
    pub api_base: String,
    /// Release API request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            version_files: vec![PathBuf::from("package.json")],
            primary_manifest: PathBuf::from("package.json"),
            client_folder: None,
            changelog: PathBuf::from("CHANGELOG.md"),
            repository: None,
            remote: "origin".to_string(),
            branch: "master".to_string(),
            api_base: "https://api.github.com".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl ReleaseConfig {
    /// Load from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the first config file found in `root`, or defaults
    pub fn discover(root: &Path) -> Result<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = root.join(name);
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }
        log::debug!("no config file in {}, using defaults", root.display());
        Ok(Self::default())
    }
}

/// Snapshot of the environment variables this tool consults.
///
/// Taken once at start-up and passed explicitly so tests never depend on the
/// ambient process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture from the process environment
    pub fn from_env() -> Self {
        let vars = ENV_KEYS
            .iter()
            .filter_map(|k| std::env::var(k).ok().map(|v| (k.to_string(), v)))
            .collect();
        Self { vars }
    }

    /// Build from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Non-empty value of `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.trim().is_empty()).cloned()
    }

    /// API token from `GH_TOKEN`, then `GITHUB_TOKEN`
    pub fn github_token(&self) -> Option<String> {
        self.get("GH_TOKEN").or_else(|| self.get("GITHUB_TOKEN"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReleaseConfig::discover(dir.path()).unwrap();
        assert_eq!(config, ReleaseConfig::default());
        assert_eq!(config.remote, "origin");
        assert_eq!(config.branch, "master");
        assert_eq!(config.timeout_ms, 5000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".release.toml"),
            r#"
version_files = ["package.json", "bower.json", "client/config.xml"]
client_folder = "client"
repository = "https://github.com/acme/widget.git"
"#,
        )
        .unwrap();

        let config = ReleaseConfig::discover(dir.path()).unwrap();
        assert_eq!(config.version_files.len(), 3);
        assert_eq!(config.client_folder, Some(PathBuf::from("client")));
        assert_eq!(config.changelog, PathBuf::from("CHANGELOG.md"));
        assert_eq!(config.api_base, "https://api.github.com");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("release.toml");
        std::fs::write(&path, "versionFiles = []\n").unwrap();
        assert!(ReleaseConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_token_precedence() {
        let env = EnvConfig::from_pairs([("GITHUB_TOKEN", "b"), ("GH_TOKEN", "a")]);
        assert_eq!(env.github_token().as_deref(), Some("a"));
        let env = EnvConfig::from_pairs([("GH_TOKEN", " "), ("GITHUB_TOKEN", "b")]);
        assert_eq!(env.github_token().as_deref(), Some("b"));
    }
}
