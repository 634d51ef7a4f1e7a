use anyhow::{Result, bail};
use log::debug;

use super::config::Config;
use super::services::Services;

/// Print the projects whose name is close to `name`, one `owner/name` per line
#[tracing::instrument(skip(config))]
pub async fn search(config: Config, name: &str) -> Result<()> {
    debug!("Searching projects for '{}'", name);
    let services = Services::from_config(&config)?;

    let projects = services.directory.search(name).await?;
    if projects.is_empty() {
        bail!("No projects found for '{}'", name);
    }

    for project in projects {
        println!("{}", project.full_name());
    }
    Ok(())
}
