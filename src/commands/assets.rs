use anyhow::{Result, bail};
use log::debug;

use crate::provider::Project;
use crate::resolve::{ReleaseChoice, VersionQuery, resolve_release};

use super::config::Config;
use super::releases::print_listing;
use super::services::Services;

/// Resolve a version of a project and print its jars with their links
#[tracing::instrument(skip(config))]
pub async fn assets(config: Config, project_str: &str, version: Option<&str>) -> Result<()> {
    let project = project_str.parse::<Project>()?;
    let query = VersionQuery::from_option(version);
    debug!("Resolving {:?} of {}", query, project);
    let services = Services::from_config(&config)?;

    let release = match resolve_release(&services.releases, &project, &query).await? {
        ReleaseChoice::Release(release) => release,
        ReleaseChoice::Listing(listing) => {
            print_listing(&project, &listing);
            return Ok(());
        }
        ReleaseChoice::Cancelled => {
            println!("Cancelled");
            return Ok(());
        }
        ReleaseChoice::NoLatest => bail!("{} doesn't have a latest release", project.name),
        ReleaseChoice::UnknownTag(tag) => {
            bail!("{} version '{}' is not valid", project.name, tag)
        }
        ReleaseChoice::NoReleases => bail!("No releases found for {}", project.name),
    };

    let jars = services.releases.installable_assets(&release).await?;
    if jars.is_empty() {
        bail!(
            "No jars found for '{}' version '{}'",
            project.full_name(),
            release.tag
        );
    }

    println!("{} {}", project.name, release.tag);
    for (i, jar) in jars.iter().enumerate() {
        println!("{}) {}", i + 1, jar.name);
        println!("   {}", jar.download_url);
    }
    Ok(())
}
