//! Provider abstraction for the two upstream catalogs.
//!
//! [`ReleaseSource`] covers the source-hosting platform (projects, releases,
//! release assets) and [`BuildSource`] the server build platform (versions and
//! build numbers). Both normalize their wire formats into the types below.

mod github;
mod paper;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use github::GitHubProvider;
pub use paper::PaperProvider;

/// A project on the hosting platform, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub owner: String,
    pub name: String,
}

impl Project {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Browsable page of the project.
    pub fn url(&self) -> String {
        format!("https://www.github.com/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for Project {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Invalid project format. Expected 'owner/name'.")
        } else {
            Ok(Project::new(parts[0], parts[1]))
        }
    }
}

/// A tagged publication of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Project the release belongs to
    pub project: Project,
    /// Upstream numeric id
    pub id: u64,
    /// Release title, may be unset upstream
    pub name: Option<String>,
    /// Version tag (e.g., "2.7.3")
    pub tag: String,
    /// Release page
    pub url: String,
    pub draft: bool,
    pub prerelease: bool,
}

impl Release {
    /// Neither a draft nor a prerelease.
    pub fn is_final(&self) -> bool {
        !self.draft && !self.prerelease
    }
}

/// A file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Id of the release the file is attached to
    pub release_id: u64,
    pub name: String,
    pub content_type: String,
    /// Direct download link, as reported upstream
    pub download_url: String,
}

/// Source-hosting platform: project search, releases and release files.
///
/// A non-success status is returned as [`crate::http::ResolveError::Upstream`];
/// deciding whether that means "empty" is left to the catalogs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Get the API base URL.
    fn api_url(&self) -> &str;

    /// Search projects matching `query`, in upstream ranking order.
    async fn search(&self, query: &str) -> Result<Vec<Project>>;

    /// All releases of a project, newest first.
    async fn releases(&self, project: &Project) -> Result<Vec<Release>>;

    /// The release the platform marks as latest.
    async fn latest_release(&self, project: &Project) -> Result<Release>;

    /// Every file attached to a release, unfiltered.
    async fn assets(&self, release: &Release) -> Result<Vec<Asset>>;
}

/// Build server: server versions, their builds and download locations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildSource: Send + Sync {
    /// Get the API base URL.
    fn api_url(&self) -> &str;

    /// Every supported version label, oldest first.
    async fn versions(&self) -> Result<Vec<String>>;

    /// Build numbers of one version, ascending.
    async fn builds(&self, version: &str) -> Result<Vec<u32>>;

    /// Download location of a build. Composed locally, no request is made.
    fn download_url(&self, version: &str, build: u32) -> Result<Url>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(name: Option<&str>, draft: bool, prerelease: bool) -> Release {
        Release {
            project: Project::new("SkriptLang", "Skript"),
            id: 1,
            name: name.map(str::to_string),
            tag: "2.7.3".to_string(),
            url: "https://github.com/SkriptLang/Skript/releases/tag/2.7.3".to_string(),
            draft,
            prerelease,
        }
    }

    #[test]
    fn test_project_parse() {
        let project: Project = "SkriptLang/Skript".parse().unwrap();
        assert_eq!(project.owner, "SkriptLang");
        assert_eq!(project.name, "Skript");
    }

    #[test]
    fn test_project_invalid() {
        assert!("invalid".parse::<Project>().is_err());
        assert!("".parse::<Project>().is_err());
        assert!("/Skript".parse::<Project>().is_err());
        assert!("SkriptLang/".parse::<Project>().is_err());
        assert!("a/b/c".parse::<Project>().is_err());
    }

    #[test]
    fn test_project_names() {
        let project = Project::new("SkriptLang", "Skript");
        assert_eq!(project.full_name(), "SkriptLang/Skript");
        assert_eq!(project.to_string(), "SkriptLang/Skript");
        assert_eq!(project.url(), "https://www.github.com/SkriptLang/Skript");
    }

    #[test]
    fn test_release_is_final() {
        assert!(release(None, false, false).is_final());
        assert!(!release(None, true, false).is_final());
        assert!(!release(None, false, true).is_final());
    }
}
