//! GitHub Release creation over the REST API

use crate::config::{EnvConfig, ReleaseConfig};
use crate::error::{GitHubError, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Owner and name of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySlug {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepositorySlug {
    /// Take the last two path segments of `owner/repo`, an https URL or an
    /// scp-style `git@host:owner/repo.git` address.
    pub fn parse(repository: &str) -> Result<Self> {
        let trimmed = repository.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let path = if let Some((_, rest)) = trimmed.split_once("://") {
            rest.split_once('/').map(|(_, path)| path).unwrap_or("")
        } else if let Some((host, path)) = trimmed.split_once(':')
            && host.contains('@')
        {
            path
        } else {
            trimmed
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [.., owner, repo] => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(GitHubError::InvalidRepository {
                repository: repository.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Everything needed to create one release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRequest {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Tag the release points at: `v<version>`
    pub tag_name: String,
    /// Release title: `v<version>: version <version>`
    pub name: String,
    /// Release notes
    pub body: String,
}

impl ReleaseRequest {
    /// Build the request for `version` with `body` as release notes
    pub fn new(slug: &RepositorySlug, version: &Version, body: impl Into<String>) -> Self {
        let tag_name = crate::git::tag_name(version);
        Self {
            owner: slug.owner.clone(),
            repo: slug.repo.clone(),
            name: format!("{}: version {}", tag_name, version),
            tag_name,
            body: body.into(),
        }
    }
}

/// Wire body of `POST /repos/{owner}/{repo}/releases`
#[derive(Serialize)]
struct CreateReleaseBody<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    id: u64,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// How requests authenticate
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// HTTP basic auth
    Basic {
        /// Account name
        username: String,
        /// Password or personal access token
        password: String,
    },
    /// Bearer token
    Token(String),
    /// No authentication
    Anonymous,
}

impl Credentials {
    /// Basic auth needs both halves; otherwise fall back to a token from the
    /// environment, then to no auth at all.
    pub fn resolve(username: Option<&str>, password: Option<&str>, env: &EnvConfig) -> Self {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Credentials::Basic {
                username: u.to_string(),
                password: p.to_string(),
            },
            _ => env
                .github_token()
                .map(Credentials::Token)
                .unwrap_or(Credentials::Anonymous),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => {
                f.debug_struct("Basic").field("username", username).finish_non_exhaustive()
            }
            Credentials::Token(_) => f.write_str("Token(..)"),
            Credentials::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Configuration for GitHub releases
#[derive(Debug, Clone)]
pub struct GitHubReleaseConfig {
    /// API root, e.g. `https://api.github.com`
    pub api_base: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Authentication
    pub credentials: Credentials,
}

impl GitHubReleaseConfig {
    /// Derive from project config and resolved credentials
    pub fn from_release_config(config: &ReleaseConfig, credentials: Credentials) -> Self {
        Self {
            api_base: config.api_base.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            credentials,
        }
    }
}

/// Result of GitHub release operation
#[derive(Debug, Clone)]
pub struct GitHubReleaseResult {
    /// Release ID
    pub release_id: u64,
    /// HTTP status of the create call
    pub status: u16,
    /// Release page URL
    pub html_url: String,
    /// API URL of the release
    pub api_url: String,
    /// Whether this was a draft
    pub draft: bool,
    /// Whether this was a prerelease
    pub prerelease: bool,
    /// Creation time reported by the API
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// GitHub release manager
#[derive(Debug)]
pub struct GitHubReleaseManager {
    client: reqwest::Client,
    config: GitHubReleaseConfig,
}

impl GitHubReleaseManager {
    /// Create new GitHub release manager
    pub fn new(config: GitHubReleaseConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GitHubError::Request)?;
        Ok(Self { client, config })
    }

    /// Create a published release
    pub async fn create_release(&self, request: &ReleaseRequest) -> Result<GitHubReleaseResult> {
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.config.api_base.trim_end_matches('/'),
            request.owner,
            request.repo
        );
        let version = request.tag_name.trim_start_matches('v');
        let prerelease = Version::parse(version).is_ok_and(|v| !v.pre.is_empty());

        let body = CreateReleaseBody {
            tag_name: &request.tag_name,
            name: &request.name,
            body: &request.body,
            draft: false,
            prerelease,
        };

        log::debug!("POST {} ({:?})", url, self.config.credentials);
        let mut builder = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(&body);

        builder = match &self.config.credentials {
            Credentials::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
            Credentials::Token(token) => builder.bearer_auth(token),
            Credentials::Anonymous => builder,
        };

        let response = builder.send().await.map_err(GitHubError::Request)?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or(text);
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let created: ReleaseResponse = response.json().await.map_err(GitHubError::Request)?;
        Ok(GitHubReleaseResult {
            release_id: created.id,
            status: status.as_u16(),
            html_url: created.html_url,
            api_url: created.url,
            draft: created.draft,
            prerelease: created.prerelease,
            created_at: created.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_various_forms() {
        for input in [
            "acme/widget",
            "https://github.com/acme/widget",
            "https://github.com/acme/widget.git",
            "https://github.com/acme/widget/",
            "git@github.com:acme/widget.git",
        ] {
            let slug = RepositorySlug::parse(input).unwrap();
            assert_eq!(slug.owner, "acme", "{}", input);
            assert_eq!(slug.repo, "widget", "{}", input);
        }
    }

    #[test]
    fn test_slug_needs_two_segments() {
        assert!(RepositorySlug::parse("widget").is_err());
        assert!(RepositorySlug::parse("https://github.com").is_err());
    }

    #[test]
    fn test_request_tag_and_name() {
        let slug = RepositorySlug::parse("acme/widget").unwrap();
        let request = ReleaseRequest::new(&slug, &Version::parse("1.2.4").unwrap(), "### 1.2.4");
        assert_eq!(request.tag_name, "v1.2.4");
        assert_eq!(request.name, "v1.2.4: version 1.2.4");
        assert_eq!(request.body, "### 1.2.4");
    }

    #[test]
    fn test_credentials_need_both_halves() {
        let env = EnvConfig::from_pairs([("GITHUB_TOKEN", "t0k")]);
        assert_eq!(
            Credentials::resolve(Some("jo"), None, &env),
            Credentials::Token("t0k".to_string())
        );
        assert!(matches!(
            Credentials::resolve(Some("jo"), Some("pw"), &env),
            Credentials::Basic { .. }
        ));
        assert_eq!(
            Credentials::resolve(None, None, &EnvConfig::default()),
            Credentials::Anonymous
        );
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let creds = Credentials::Basic {
            username: "jo".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
