use anyhow::{Result, bail};
use log::debug;

use crate::catalog::BuildVersion;
use crate::resolve::{Listed, VersionChoice, VersionQuery, resolve_server_version};

use super::config::Config;
use super::services::Services;

fn format_version_line(listed: &Listed<BuildVersion>) -> String {
    if listed.latest {
        format!(" - {} (latest)", listed.item)
    } else {
        format!(" - {}", listed.item)
    }
}

/// Resolve a server version and print its latest build and download link
#[tracing::instrument(skip(config))]
pub async fn paper(config: Config, version: Option<&str>) -> Result<()> {
    let query = VersionQuery::from_option(version);
    debug!("Resolving server version {:?}", query);
    let services = Services::from_config(&config)?;

    let version = match resolve_server_version(&services.builds, &query).await? {
        VersionChoice::Version(version) => version,
        VersionChoice::Listing(listing) => {
            println!("Paper versions:");
            for listed in &listing {
                println!("{}", format_version_line(listed));
            }
            return Ok(());
        }
        VersionChoice::Invalid(label) => bail!("Paper version '{}' is not valid", label),
    };

    if !services.builds.is_valid(&version).await? {
        bail!("Paper version '{}' has no builds", version);
    }
    let build = services.builds.latest_build(&version).await?;
    let url = services.builds.download_location(&version)?;

    println!("Paper {} build {}", version, build);
    println!("{}", url);
    Ok(())
}
