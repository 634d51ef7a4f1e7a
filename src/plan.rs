//! Resolving a whole server setup: server build, Skript and its addons.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};
use serde::Serialize;

use crate::catalog::{BuildCatalog, BuildVersion, ProjectDirectory, ReleaseCatalog};
use crate::provider::{Project, Release};
use crate::resolve::{
    ReleaseChoice, VersionChoice, VersionQuery, resolve_release, resolve_server_version,
    select_asset, select_project,
};

/// Where Skript itself is published.
pub const SKRIPT_OWNER: &str = "SkriptLang";
pub const SKRIPT_NAME: &str = "Skript";

pub fn skript_project() -> Project {
    Project::new(SKRIPT_OWNER, SKRIPT_NAME)
}

/// A plugin jar picked for installation.
///
/// Two addons are the same addon when their names match, whatever the
/// version.
#[derive(Debug, Clone, Serialize)]
pub struct Addon {
    pub name: String,
    pub version: String,
    pub download_url: String,
}

impl Addon {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            download_url: download_url.into(),
        }
    }

    pub fn name_and_version(&self) -> String {
        format!("{} {}", self.name, self.version)
    }

    /// File name the jar is saved under.
    pub fn file_name(&self) -> String {
        format!("{}-{}.jar", self.name, self.version)
    }
}

impl PartialEq for Addon {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Addon {}

impl Hash for Addon {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// An addon as requested on the command line.
///
/// Written `name[:N][@version][#J]` or `owner/name[@version][#J]`. `:N` picks
/// the N-th project when the name matches several, `#J` the J-th jar when the
/// release ships several. Both are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonSpec {
    pub name: String,
    pub version: Option<String>,
    pub project_pick: Option<usize>,
    pub jar_pick: Option<usize>,
}

impl AddonSpec {
    /// The exact project when the owner is given.
    pub fn project(&self) -> Option<Project> {
        self.name.parse().ok()
    }

    pub fn query(&self) -> VersionQuery {
        VersionQuery::from_option(self.version.as_deref())
    }
}

impl fmt::Display for AddonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(pick) = self.project_pick {
            write!(f, ":{}", pick)?;
        }
        if let Some(version) = &self.version {
            write!(f, "@{}", version)?;
        }
        if let Some(pick) = self.jar_pick {
            write!(f, "#{}", pick)?;
        }
        Ok(())
    }
}

/// A 1-based index written after `marker` in `spec`.
fn parse_pick(spec: &str, marker: char, index: &str) -> Result<usize> {
    match index.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => bail!(
            "Invalid addon '{}': index after {} must be a positive number.",
            spec,
            marker
        ),
    }
}

impl FromStr for AddonSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (rest, jar_pick) = match s.rsplit_once('#') {
            Some((rest, index)) => (rest, Some(parse_pick(s, '#', index)?)),
            None => (s, None),
        };
        let (name, version) = match rest.rsplit_once('@') {
            Some((_, "")) => {
                bail!("Invalid addon '{}': version after @ cannot be empty.", s)
            }
            Some((name, version)) => (name, Some(version.to_string())),
            None => (rest, None),
        };
        let (name, project_pick) = match name.rsplit_once(':') {
            Some((name, index)) => (name, Some(parse_pick(s, ':', index)?)),
            None => (name, None),
        };

        if name.is_empty() {
            bail!("Invalid addon '{}': name cannot be empty.", s);
        }
        if name.contains('/') {
            name.parse::<Project>()
                .with_context(|| format!("Invalid addon '{}'", s))?;
            if project_pick.is_some() {
                bail!("Invalid addon '{}': ':N' only applies to a search by name.", s);
            }
        }

        Ok(AddonSpec {
            name: name.to_string(),
            version,
            project_pick,
            jar_pick,
        })
    }
}

/// Everything needed to lay out a server, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupPlan {
    pub server_name: String,
    pub server_version: String,
    pub server_build: u32,
    pub server_download: String,
    pub skript: Addon,
    pub addons: Vec<Addon>,
}

impl SetupPlan {
    /// Add an addon unless one with the same name is already planned.
    /// Returns whether it was added.
    pub fn add_addon(&mut self, addon: Addon) -> bool {
        if self.addons.contains(&addon) {
            return false;
        }
        self.addons.push(addon);
        true
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Where each plugin jar goes in the server directory, with its source.
    /// Skript comes first, then the addons in plan order.
    pub fn plugin_downloads(&self) -> Vec<(String, &str)> {
        std::iter::once(&self.skript)
            .chain(&self.addons)
            .map(|a| (format!("plugins/{}", a.file_name()), a.download_url.as_str()))
            .collect()
    }
}

impl fmt::Display for SetupPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addons: Vec<String> = self.addons.iter().map(Addon::name_and_version).collect();
        writeln!(f, "Server setup summary")?;
        writeln!(f, " - Server name: {}", self.server_name)?;
        writeln!(
            f,
            " - Paper version: {} (build {})",
            self.server_version, self.server_build
        )?;
        writeln!(f, " - Skript version: {}", self.skript.version)?;
        write!(f, " - Skript addons: [{}]", addons.join(", "))
    }
}

/// What to plan.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    pub server_name: String,
    pub server_version: VersionQuery,
    pub skript_version: VersionQuery,
    /// Which Skript jar to take when a release ships several
    pub skript_jar: Option<usize>,
    pub addons: Vec<AddonSpec>,
}

/// Resolves [`PlanRequest`]s against the catalogs.
pub struct Planner<'a> {
    directory: &'a ProjectDirectory,
    releases: &'a ReleaseCatalog,
    builds: &'a BuildCatalog,
}

impl<'a> Planner<'a> {
    pub fn new(
        directory: &'a ProjectDirectory,
        releases: &'a ReleaseCatalog,
        builds: &'a BuildCatalog,
    ) -> Self {
        Self {
            directory,
            releases,
            builds,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn plan(&self, request: &PlanRequest) -> Result<SetupPlan> {
        let server_name = request.server_name.trim();
        if server_name.is_empty() {
            bail!("Server name cannot be empty");
        }

        let version = self.server_version(&request.server_version).await?;
        let server_build = self.builds.latest_build(&version).await?;
        let server_download = self.builds.download_location(&version)?;
        info!("Using server {} build {}", version, server_build);

        let skript = self
            .addon(
                &skript_project(),
                &request.skript_version,
                request.skript_jar,
                "pick one with --skript-jar",
            )
            .await?;

        let mut plan = SetupPlan {
            server_name: server_name.to_string(),
            server_version: version.label,
            server_build,
            server_download: server_download.to_string(),
            skript,
            addons: Vec::new(),
        };

        for spec in &request.addons {
            let project = self.project(spec).await?;
            let hint = format!("append '#N' to '{}' to pick one", spec);
            let addon = self
                .addon(&project, &spec.query(), spec.jar_pick, &hint)
                .await?;
            if !plan.add_addon(addon) {
                debug!("Addon {} is already planned, keeping the first", project.name);
            }
        }

        Ok(plan)
    }

    async fn server_version(&self, query: &VersionQuery) -> Result<BuildVersion> {
        let version = match resolve_server_version(self.builds, query).await? {
            VersionChoice::Version(version) => version,
            VersionChoice::Invalid(label) => bail!("Paper version '{}' is not valid", label),
            VersionChoice::Listing(_) => bail!("A server version is required, not a listing"),
        };
        // the latest version is not checked by resolution
        if !self.builds.is_valid(&version).await? {
            bail!("Paper version '{}' has no builds", version);
        }
        Ok(version)
    }

    async fn project(&self, spec: &AddonSpec) -> Result<Project> {
        if let Some(project) = spec.project() {
            return Ok(project);
        }

        let candidates = self.directory.search(&spec.name).await?;
        let project = select_project(&candidates, spec.project_pick)
            .with_context(|| {
                format!(
                    "Addon '{}' is ambiguous, use 'owner/name' or append ':N' to the name",
                    spec.name
                )
            })?
            .ok_or_else(|| anyhow!("No projects found for '{}'", spec.name))?;
        info!("Selected project {} for '{}'", project, spec.name);
        Ok(project.clone())
    }

    async fn release(&self, project: &Project, query: &VersionQuery) -> Result<Release> {
        match resolve_release(self.releases, project, query).await? {
            ReleaseChoice::Release(release) => Ok(release),
            ReleaseChoice::NoLatest => bail!("{} doesn't have a latest release", project),
            ReleaseChoice::UnknownTag(tag) => {
                bail!("{} version '{}' is not valid", project, tag)
            }
            ReleaseChoice::NoReleases => bail!("No releases found for {}", project),
            ReleaseChoice::Listing(_) => bail!("A version of {} is required, not a listing", project),
            ReleaseChoice::Cancelled => bail!("Picking a version of {} was cancelled", project),
        }
    }

    async fn addon(
        &self,
        project: &Project,
        query: &VersionQuery,
        jar_pick: Option<usize>,
        pick_hint: &str,
    ) -> Result<Addon> {
        let release = self.release(project, query).await?;
        let assets = self.releases.installable_assets(&release).await?;
        let asset = select_asset(&assets, jar_pick)
            .with_context(|| {
                format!("{} {} has several jars, {}", project, release.tag, pick_hint)
            })?
            .ok_or_else(|| {
                anyhow!(
                    "No jars found for '{}' version '{}'",
                    project.full_name(),
                    release.tag
                )
            })?;
        Ok(Addon::new(
            project.name.clone(),
            release.tag.clone(),
            asset.download_url.clone(),
        ))
    }
}
