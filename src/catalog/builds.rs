//! Server versions and their builds on the build server.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::cache::Memo;
use crate::http::{ResolveError, is_unresolvable};
use crate::provider::BuildSource;

/// A server version tracked by the build server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildVersion {
    pub label: String,
}

impl BuildVersion {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Cached view of the build server.
///
/// The version list is fetched once per catalog, and each version's build
/// list once per version. Upstream ordering (ascending) is trusted.
pub struct BuildCatalog {
    source: Arc<dyn BuildSource>,
    versions: OnceCell<Arc<Vec<BuildVersion>>>,
    builds: Memo<String, Arc<Vec<u32>>>,
}

impl BuildCatalog {
    pub fn new(source: Arc<dyn BuildSource>) -> Self {
        Self {
            source,
            versions: OnceCell::new(),
            builds: Memo::new(),
        }
    }

    /// Every supported version, oldest first. Any failure is an error.
    #[tracing::instrument(skip(self))]
    pub async fn versions(&self) -> Result<Arc<Vec<BuildVersion>>> {
        let versions = self
            .versions
            .get_or_try_init(|| async {
                let labels = self
                    .source
                    .versions()
                    .await
                    .context("Failed to get server versions")?;
                debug!("Build server lists {} version(s)", labels.len());
                Ok::<_, anyhow::Error>(Arc::new(
                    labels.into_iter().map(BuildVersion::new).collect(),
                ))
            })
            .await?;
        Ok(versions.clone())
    }

    /// The newest version, i.e. the last one listed.
    #[tracing::instrument(skip(self))]
    pub async fn latest_version(&self) -> Result<BuildVersion> {
        let versions = self.versions().await?;
        versions.last().cloned().ok_or_else(|| {
            ResolveError::malformed(self.source.api_url(), "the version list is empty").into()
        })
    }

    /// A version by label. Nothing is checked until its builds are asked for.
    pub fn version(&self, label: &str) -> BuildVersion {
        BuildVersion::new(label)
    }

    /// Build numbers of `version`, ascending.
    ///
    /// A non-success answer, or a label that cannot name a version, is
    /// remembered as "no builds".
    #[tracing::instrument(skip(self, version), fields(version = %version))]
    pub async fn builds(&self, version: &BuildVersion) -> Result<Arc<Vec<u32>>> {
        self.builds
            .get_or_try_init(&version.label, || async {
                match self.source.builds(&version.label).await {
                    Ok(builds) => {
                        debug!("{} has {} build(s)", version, builds.len());
                        Ok(Arc::new(builds))
                    }
                    Err(e) if is_unresolvable(&e) => {
                        info!("No builds for {}: {}", version, e);
                        Ok(Arc::new(Vec::new()))
                    }
                    Err(e) => Err(e),
                }
            })
            .await
    }

    /// The highest build of `version`. Fails with
    /// [`ResolveError::NoBuilds`] when the version has none; check
    /// [`BuildCatalog::is_valid`] first.
    pub async fn latest_build(&self, version: &BuildVersion) -> Result<u32> {
        let builds = self.builds(version).await?;
        last_build(version, &builds)
    }

    /// Whether `version` has at least one build.
    pub async fn is_valid(&self, version: &BuildVersion) -> Result<bool> {
        Ok(!self.builds(version).await?.is_empty())
    }

    /// Download location of the latest build of `version`.
    ///
    /// Composed from already fetched builds, so no request is made. The
    /// builds must have been loaded, by [`BuildCatalog::is_valid`] for
    /// instance, before calling this.
    pub fn download_location(&self, version: &BuildVersion) -> Result<Url> {
        let builds = self.builds.peek(&version.label).with_context(|| {
            format!("Builds of version '{}' have not been resolved yet", version)
        })?;
        let build = last_build(version, &builds)?;
        self.source.download_url(&version.label, build)
    }
}

fn last_build(version: &BuildVersion, builds: &[u32]) -> Result<u32> {
    builds.last().copied().ok_or_else(|| {
        ResolveError::NoBuilds {
            version: version.label.clone(),
        }
        .into()
    })
}
