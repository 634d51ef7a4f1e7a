//! GitHub provider implementation.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Url;

use crate::http::{HttpClient, ResolveError, endpoint};

use super::{Asset, Project, Release, ReleaseSource};

/// Media type GitHub documents for its REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";

const PER_PAGE: usize = 100;
const MAX_PAGES: usize = 10;

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct SearchResults {
        pub total_count: u64,
        pub items: Vec<Repository>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Repository {
        pub name: String,
        pub owner: Owner,
    }

    #[derive(Deserialize, Debug)]
    pub struct Owner {
        pub login: String,
    }

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub id: u64,
        pub name: Option<String>,
        pub tag_name: String,
        pub html_url: String,
        pub draft: bool,
        pub prerelease: bool,
    }

    #[derive(Deserialize, Debug)]
    pub struct Asset {
        pub name: String,
        pub content_type: String,
        pub browser_download_url: String,
    }
}

/// GitHub provider implementation.
///
/// Searches are always narrowed to one implementation language, fixed when
/// the provider is built.
pub struct GitHubProvider {
    http_client: HttpClient,
    api_url: String,
    language: String,
}

impl GitHubProvider {
    /// Create from an existing HttpClient.
    pub fn from_http_client(http_client: HttpClient, api_url: &str, language: &str) -> Self {
        Self {
            http_client: http_client.with_accept(GITHUB_ACCEPT),
            api_url: api_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        }
    }

    /// `{api}/repos/{owner}/{name}/releases/...segments`
    fn releases_url(&self, project: &Project, segments: &[&str]) -> Result<Url> {
        let mut path = vec!["repos", project.owner.as_str(), project.name.as_str(), "releases"];
        path.extend_from_slice(segments);
        endpoint(&self.api_url, &path)
    }

    /// Fetches every page of the release list.
    ///
    /// A failure on the first page is returned as is. A failure on a later
    /// page becomes [`ResolveError::Incomplete`], so a partial list is never
    /// mistaken for a project without releases.
    async fn fetch_releases(&self, project: &Project) -> Result<Vec<api::Release>> {
        let url = self.releases_url(project, &[])?;
        let mut releases = Vec::new();
        let mut page = 1;

        // Limit to 10 pages (1000 releases) to prevent infinite loop
        while page <= MAX_PAGES {
            debug!("Fetching releases page {} from {}...", page, url);

            let fetched = self
                .http_client
                .get_json_with_query::<Vec<api::Release>>(
                    url.as_str(),
                    &[
                        ("per_page", &PER_PAGE.to_string()),
                        ("page", &page.to_string()),
                    ],
                )
                .await;
            let parsed = match fetched {
                Ok(parsed) => parsed,
                Err(e) if page > 1 => {
                    warn!(
                        "Release list of {} stopped at page {} after {} release(s)",
                        project,
                        page,
                        releases.len()
                    );
                    return Err(ResolveError::Incomplete {
                        url: url.to_string(),
                        page,
                        message: e.to_string(),
                    }
                    .into());
                }
                Err(e) => return Err(e),
            };

            let len = parsed.len();
            releases.extend(parsed);

            if len < PER_PAGE {
                break;
            }

            page += 1;
        }

        Ok(releases)
    }
}

#[async_trait]
impl ReleaseSource for GitHubProvider {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Project>> {
        let url = format!("{}/search/repositories", self.api_url);
        let q = format!("{} language:{}", query, self.language);
        debug!("Searching repositories at {} for {:?}...", url, q);

        let results: api::SearchResults = self
            .http_client
            .get_json_with_query(&url, &[("q", &q)])
            .await?;
        debug!(
            "{} repositories match {:?}, {} returned",
            results.total_count,
            q,
            results.items.len()
        );

        Ok(results
            .items
            .into_iter()
            .map(|repo| Project::new(repo.owner.login, repo.name))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn releases(&self, project: &Project) -> Result<Vec<Release>> {
        let releases = self.fetch_releases(project).await?;
        Ok(releases
            .into_iter()
            .map(|r| r.into_release(project))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn latest_release(&self, project: &Project) -> Result<Release> {
        let url = self.releases_url(project, &["latest"])?;
        debug!("Fetching latest release from {}...", url);
        let release: api::Release = self.http_client.get_json(url.as_str()).await?;
        Ok(release.into_release(project))
    }

    #[tracing::instrument(skip(self, release), fields(project = %release.project, tag = %release.tag))]
    async fn assets(&self, release: &Release) -> Result<Vec<Asset>> {
        let id = release.id.to_string();
        let url = self.releases_url(&release.project, &[id.as_str(), "assets"])?;
        debug!("Fetching release assets from {}...", url);

        let assets: Vec<api::Asset> = self
            .http_client
            .get_json_with_query(url.as_str(), &[("per_page", &PER_PAGE.to_string())])
            .await?;

        Ok(assets
            .into_iter()
            .map(|a| a.into_asset(release.id))
            .collect())
    }
}

impl api::Release {
    fn into_release(self, project: &Project) -> Release {
        Release {
            project: project.clone(),
            id: self.id,
            name: self.name,
            tag: self.tag_name,
            url: self.html_url,
            draft: self.draft,
            prerelease: self.prerelease,
        }
    }
}

impl api::Asset {
    fn into_asset(self, release_id: u64) -> Asset {
        Asset {
            release_id,
            name: self.name,
            content_type: self.content_type,
            download_url: self.browser_download_url,
        }
    }
}
