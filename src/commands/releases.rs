use anyhow::{Result, bail};
use log::debug;

use crate::provider::{Project, Release};
use crate::resolve::{Listed, ReleaseChoice, VersionQuery, resolve_release};

use super::config::Config;
use super::services::Services;

/// One line of a release listing, e.g. ` - 2.8.0-pre1 (prerelease)`
pub(crate) fn format_release_line(listed: &Listed<Release>) -> String {
    let mut line = format!(" - {}", listed.item.tag);
    if listed.latest {
        line.push_str(" (latest)");
    }
    if listed.item.prerelease {
        line.push_str(" (prerelease)");
    }
    line
}

pub(crate) fn print_listing(project: &Project, listing: &[Listed<Release>]) {
    println!("{} versions:", project.name);
    for listed in listing {
        println!("{}", format_release_line(listed));
    }
}

/// List every release of a project, oldest first
#[tracing::instrument(skip(config))]
pub async fn releases(config: Config, project_str: &str) -> Result<()> {
    let project = project_str.parse::<Project>()?;
    debug!("Listing releases of {}", project);
    let services = Services::from_config(&config)?;

    match resolve_release(&services.releases, &project, &VersionQuery::List).await? {
        ReleaseChoice::Listing(listing) => print_listing(&project, &listing),
        _ => bail!("No releases found for {}", project),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(tag: &str, latest: bool, prerelease: bool) -> Listed<Release> {
        Listed {
            item: Release {
                project: Project::new("SkriptLang", "Skript"),
                id: 1,
                name: None,
                tag: tag.to_string(),
                url: String::new(),
                draft: false,
                prerelease,
            },
            latest,
        }
    }

    #[test]
    fn test_format_release_line() {
        assert_eq!(format_release_line(&listed("2.7.2", false, false)), " - 2.7.2");
        assert_eq!(
            format_release_line(&listed("2.7.3", true, false)),
            " - 2.7.3 (latest)"
        );
        assert_eq!(
            format_release_line(&listed("2.8.0-pre1", false, true)),
            " - 2.8.0-pre1 (prerelease)"
        );
    }
}
