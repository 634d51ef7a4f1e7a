//! PaperMC build API (v2) provider.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::Url;

use crate::http::{HttpClient, endpoint};

use super::BuildSource;

/// Project on the build server whose server jars are resolved.
pub const PAPER_PROJECT: &str = "paper";

/// PaperMC API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Project {
        pub versions: Vec<String>,
    }

    #[derive(Deserialize, Debug)]
    pub struct Version {
        pub builds: Vec<u32>,
    }
}

/// PaperMC provider implementation.
pub struct PaperProvider {
    http_client: HttpClient,
    api_url: String,
}

impl PaperProvider {
    /// Create from an existing HttpClient.
    pub fn from_http_client(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{api}/projects/paper/...segments`, each segment percent-encoded.
    fn project_url(&self, segments: &[&str]) -> Result<Url> {
        let mut path = vec!["projects", PAPER_PROJECT];
        path.extend_from_slice(segments);
        endpoint(&self.api_url, &path)
    }
}

/// Canonical jar name of a build, e.g. `paper-1.20.2-12.jar`.
pub fn jar_name(version: &str, build: u32) -> String {
    format!("{}-{}-{}.jar", PAPER_PROJECT, version, build)
}

#[async_trait]
impl BuildSource for PaperProvider {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    #[tracing::instrument(skip(self))]
    async fn versions(&self) -> Result<Vec<String>> {
        let url = self.project_url(&[])?;
        debug!("Fetching versions from {}...", url);
        let project: api::Project = self.http_client.get_json(url.as_str()).await?;
        Ok(project.versions)
    }

    #[tracing::instrument(skip(self))]
    async fn builds(&self, version: &str) -> Result<Vec<u32>> {
        let url = self.project_url(&["versions", version])?;
        debug!("Fetching builds from {}...", url);
        let version: api::Version = self.http_client.get_json(url.as_str()).await?;
        Ok(version.builds)
    }

    fn download_url(&self, version: &str, build: u32) -> Result<Url> {
        let build_number = build.to_string();
        let jar = jar_name(version, build);
        self.project_url(&[
            "versions",
            version,
            "builds",
            build_number.as_str(),
            "downloads",
            jar.as_str(),
        ])
    }
}
