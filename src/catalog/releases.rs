//! Per-project release lists, "latest" resolution and installable files.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, info};
use reqwest::Url;

use crate::cache::Memo;
use crate::http::{ResolveError, is_unresolvable};
use crate::provider::{Asset, Project, Release, ReleaseSource};

/// Content type of the files that can be installed as plugins.
pub const INSTALLABLE_CONTENT_TYPE: &str = "application/java-archive";

/// Cached view of the releases of every project it is asked about.
///
/// A project's release list and a release's files are each fetched at most
/// once per catalog and never refreshed.
pub struct ReleaseCatalog {
    source: Arc<dyn ReleaseSource>,
    releases: Memo<Project, Arc<Vec<Release>>>,
    assets: Memo<u64, Arc<Vec<Asset>>>,
}

/// First release in upstream order that is neither a draft nor a prerelease.
pub fn first_final(releases: &[Release]) -> Option<&Release> {
    releases.iter().find(|r| r.is_final())
}

impl ReleaseCatalog {
    pub fn new(source: Arc<dyn ReleaseSource>) -> Self {
        Self {
            source,
            releases: Memo::new(),
            assets: Memo::new(),
        }
    }

    /// All releases of `project`, newest first.
    ///
    /// A non-success answer is remembered as "no releases"; a transport
    /// failure or an incomplete listing is returned and nothing is cached.
    #[tracing::instrument(skip(self))]
    pub async fn releases(&self, project: &Project) -> Result<Arc<Vec<Release>>> {
        self.releases
            .get_or_try_init(project, || async {
                match self.source.releases(project).await {
                    Ok(releases) => {
                        debug!("{} has {} release(s)", project, releases.len());
                        Ok(Arc::new(releases))
                    }
                    Err(e) if is_unresolvable(&e) => {
                        info!("No releases for {}: {}", project, e);
                        Ok(Arc::new(Vec::new()))
                    }
                    Err(e) => Err(e),
                }
            })
            .await
    }

    /// The newest release that is neither a draft nor a prerelease.
    ///
    /// Answers from the cached list when there is one. Otherwise asks the
    /// platform's "latest" endpoint directly, without loading the full list.
    #[tracing::instrument(skip(self))]
    pub async fn latest_release(&self, project: &Project) -> Result<Option<Release>> {
        if let Some(releases) = self.releases.peek(project) {
            return Ok(first_final(&releases).cloned());
        }

        match self.source.latest_release(project).await {
            Ok(release) => Ok(Some(release).filter(Release::is_final)),
            Err(e) if is_unresolvable(&e) => {
                info!("No latest release for {}: {}", project, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The release of `project` tagged exactly `tag`.
    #[tracing::instrument(skip(self))]
    pub async fn release(&self, project: &Project, tag: &str) -> Result<Option<Release>> {
        let releases = self.releases(project).await?;
        Ok(releases.iter().find(|r| r.tag == tag).cloned())
    }

    /// Files of `release` that are Java archives.
    ///
    /// Unlike the release list, a failed fetch here is an error: the release
    /// is known to exist, so its files must be retrievable. Every kept file
    /// must carry a valid download URL; other files are not checked.
    #[tracing::instrument(skip(self, release), fields(project = %release.project, tag = %release.tag))]
    pub async fn installable_assets(&self, release: &Release) -> Result<Arc<Vec<Asset>>> {
        self.assets
            .get_or_try_init(&release.id, || async {
                let assets = self.source.assets(release).await?;
                let total = assets.len();
                let jars: Vec<Asset> = assets
                    .into_iter()
                    .filter(|a| a.content_type == INSTALLABLE_CONTENT_TYPE)
                    .collect();
                for jar in &jars {
                    Url::parse(&jar.download_url).map_err(|e| {
                        ResolveError::malformed(
                            self.source.api_url(),
                            format!("asset '{}' has an invalid download URL: {}", jar.name, e),
                        )
                    })?;
                }
                debug!(
                    "{} {} has {} jar(s) among {} file(s)",
                    release.project,
                    release.tag,
                    jars.len(),
                    total
                );
                Ok(Arc::new(jars))
            })
            .await
    }
}
