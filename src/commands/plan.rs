use anyhow::{Context, Result};
use log::debug;

use crate::plan::{AddonSpec, PlanRequest};
use crate::resolve::VersionQuery;

use super::config::Config;
use super::services::Services;

/// Options of the `plan` command
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub server_name: String,
    pub server_version: Option<String>,
    pub skript_version: Option<String>,
    pub skript_jar: Option<usize>,
    pub addons: Vec<String>,
    pub json: bool,
}

impl PlanOptions {
    fn into_request(self) -> Result<PlanRequest> {
        let addons = self
            .addons
            .iter()
            .map(|a| a.parse::<AddonSpec>())
            .collect::<Result<Vec<_>>>()
            .context("Failed to parse --addon")?;

        Ok(PlanRequest {
            server_name: self.server_name,
            server_version: VersionQuery::from_option(self.server_version.as_deref()),
            skript_version: VersionQuery::from_option(self.skript_version.as_deref()),
            skript_jar: self.skript_jar,
            addons,
        })
    }
}

/// Resolve a server setup and print its summary
#[tracing::instrument(skip(config))]
pub async fn plan(config: Config, options: PlanOptions) -> Result<()> {
    let json = options.json;
    let request = options.into_request()?;
    debug!("Planning {:?}", request);
    let services = Services::from_config(&config)?;

    let plan = services.planner().plan(&request).await?;

    if json {
        println!("{}", plan.to_json()?);
    } else {
        println!("{}", plan);
        println!("Plugin downloads:");
        for (path, url) in plan.plugin_downloads() {
            println!("  {} <- {}", path, url);
        }
    }
    Ok(())
}
