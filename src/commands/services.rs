//! Service factory for building command dependencies.
//!
//! Construction of the providers and catalogs is kept apart from the
//! configuration: services are built from configuration values but are not
//! part of it.

use std::sync::Arc;

use anyhow::Result;
use log::debug;
use reqwest::Client;

use crate::{
    catalog::{BuildCatalog, ProjectDirectory, ReleaseCatalog},
    http::HttpClient,
    plan::Planner,
    provider::{GitHubProvider, PaperProvider},
};

use super::config::Config;

/// Build an HTTP client carrying the user agent and request timeout
pub fn build_http_client(config: &Config) -> Result<HttpClient> {
    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .build()?;
    debug!(
        "HTTP client configured with a {}s timeout",
        config.timeout.as_secs()
    );
    Ok(HttpClient::new(client))
}

/// Build the hosting platform provider from configuration
pub fn build_release_source(config: &Config, http_client: HttpClient) -> GitHubProvider {
    GitHubProvider::from_http_client(http_client, &config.github_url, &config.language)
}

/// Build the build server provider from configuration
pub fn build_build_source(config: &Config, http_client: HttpClient) -> PaperProvider {
    PaperProvider::from_http_client(http_client, &config.paper_url)
}

/// Catalogs shared by every command for one run. Each cache lives as long
/// as this container.
pub struct Services {
    pub directory: ProjectDirectory,
    pub releases: ReleaseCatalog,
    pub builds: BuildCatalog,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = build_http_client(config)?;
        let release_source = Arc::new(build_release_source(config, http_client.clone()));
        let build_source = Arc::new(build_build_source(config, http_client));

        Ok(Self {
            directory: ProjectDirectory::with_max_distance(
                release_source.clone(),
                config.max_distance,
            ),
            releases: ReleaseCatalog::new(release_source),
            builds: BuildCatalog::new(build_source),
        })
    }

    pub fn planner(&self) -> Planner<'_> {
        Planner::new(&self.directory, &self.releases, &self.builds)
    }
}
