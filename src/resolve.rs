//! Turning user-supplied version tokens and picks into concrete entities.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::catalog::{BuildCatalog, BuildVersion, ReleaseCatalog};
use crate::provider::{Asset, Project, Release};

/// Token that lists every version instead of picking one.
pub const LIST_VERSIONS: &str = "-versions";
/// Token that abandons a cancellable pick.
pub const CANCEL: &str = "-cancel";

/// What the user asked for when prompted for a version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionQuery {
    /// Blank or "latest"
    #[default]
    Latest,
    /// List every version
    List,
    /// Give up on this pick
    Cancel,
    /// A specific tag or version label
    Exact(String),
}

impl FromStr for VersionQuery {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s.is_empty() || s.eq_ignore_ascii_case("latest") {
            VersionQuery::Latest
        } else if s == LIST_VERSIONS {
            VersionQuery::List
        } else if s == CANCEL {
            VersionQuery::Cancel
        } else {
            VersionQuery::Exact(s.to_string())
        })
    }
}

impl VersionQuery {
    /// Parse an optional token, `None` meaning latest.
    pub fn from_option(token: Option<&str>) -> Self {
        match token {
            Some(token) => token.parse().unwrap_or_default(),
            None => VersionQuery::Latest,
        }
    }
}

/// One line of a version listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listed<T> {
    pub item: T,
    pub latest: bool,
}

/// Outcome of resolving a release token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseChoice {
    Release(Release),
    /// The project has no final release
    NoLatest,
    /// No release carries this tag
    UnknownTag(String),
    /// Every release, oldest first
    Listing(Vec<Listed<Release>>),
    /// Listing was asked for but there is nothing to list
    NoReleases,
    Cancelled,
}

/// Outcome of resolving a server version token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionChoice {
    Version(BuildVersion),
    /// Every version, oldest first
    Listing(Vec<Listed<BuildVersion>>),
    /// Version without any build
    Invalid(String),
}

/// Resolve `query` against the releases of `project`.
#[tracing::instrument(skip(catalog))]
pub async fn resolve_release(
    catalog: &ReleaseCatalog,
    project: &Project,
    query: &VersionQuery,
) -> Result<ReleaseChoice> {
    let choice = match query {
        VersionQuery::Latest => match catalog.latest_release(project).await? {
            Some(release) => ReleaseChoice::Release(release),
            None => ReleaseChoice::NoLatest,
        },
        VersionQuery::Exact(tag) => match catalog.release(project, tag).await? {
            Some(release) => ReleaseChoice::Release(release),
            None => ReleaseChoice::UnknownTag(tag.clone()),
        },
        VersionQuery::List => {
            let releases = catalog.releases(project).await?;
            if releases.is_empty() {
                return Ok(ReleaseChoice::NoReleases);
            }
            let latest = catalog.latest_release(project).await?;
            ReleaseChoice::Listing(
                releases
                    .iter()
                    .rev()
                    .map(|release| Listed {
                        latest: latest.as_ref() == Some(release),
                        item: release.clone(),
                    })
                    .collect(),
            )
        }
        VersionQuery::Cancel => ReleaseChoice::Cancelled,
    };
    Ok(choice)
}

/// Resolve `query` against the versions of the build server.
#[tracing::instrument(skip(builds))]
pub async fn resolve_server_version(
    builds: &BuildCatalog,
    query: &VersionQuery,
) -> Result<VersionChoice> {
    match query {
        VersionQuery::Latest => Ok(VersionChoice::Version(builds.latest_version().await?)),
        VersionQuery::List => {
            let versions = builds.versions().await?;
            let latest = versions.last().cloned();
            Ok(VersionChoice::Listing(
                versions
                    .iter()
                    .map(|version| Listed {
                        latest: latest.as_ref() == Some(version),
                        item: version.clone(),
                    })
                    .collect(),
            ))
        }
        VersionQuery::Exact(label) => {
            let version = builds.version(label);
            if builds.is_valid(&version).await? {
                Ok(VersionChoice::Version(version))
            } else {
                Ok(VersionChoice::Invalid(label.clone()))
            }
        }
        VersionQuery::Cancel => Ok(VersionChoice::Invalid(CANCEL.to_string())),
    }
}

/// Several candidates matched and no usable index was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousChoice {
    pub what: &'static str,
    pub candidates: Vec<String>,
    pub index: Option<usize>,
}

impl fmt::Display for AmbiguousChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(
                f,
                "Invalid {} index {} (expected 1 to {})",
                self.what,
                index,
                self.candidates.len()
            )?,
            None => write!(f, "Multiple {}s found, pick one by index", self.what)?,
        }
        for (i, name) in self.candidates.iter().enumerate() {
            write!(f, "\n  {}) {}", i + 1, name)?;
        }
        Ok(())
    }
}

impl std::error::Error for AmbiguousChoice {}

fn select<'a, T>(
    items: &'a [T],
    index: Option<usize>,
    what: &'static str,
    label: impl Fn(&T) -> String,
) -> Result<Option<&'a T>> {
    match items {
        [] => Ok(None),
        [only] => Ok(Some(only)),
        _ => match index.and_then(|i| i.checked_sub(1)).and_then(|i| items.get(i)) {
            Some(item) => Ok(Some(item)),
            None => Err(AmbiguousChoice {
                what,
                candidates: items.iter().map(label).collect(),
                index,
            }
            .into()),
        },
    }
}

/// Pick a jar among a release's files. `index` is 1-based and only
/// consulted when there is more than one.
pub fn select_asset(assets: &[Asset], index: Option<usize>) -> Result<Option<&Asset>> {
    select(assets, index, "asset", |a| a.name.clone())
}

/// Pick a project among search results, same rules as [`select_asset`].
pub fn select_project(candidates: &[Project], index: Option<usize>) -> Result<Option<&Project>> {
    select(candidates, index, "project", Project::full_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ResolveError;
    use crate::provider::{MockBuildSource, MockReleaseSource};
    use reqwest::StatusCode;
    use std::sync::Arc;

    fn project() -> Project {
        Project::new("SkriptLang", "Skript")
    }

    fn release(id: u64, tag: &str, prerelease: bool) -> Release {
        Release {
            project: project(),
            id,
            name: None,
            tag: tag.to_string(),
            url: format!("https://github.com/SkriptLang/Skript/releases/tag/{}", tag),
            draft: false,
            prerelease,
        }
    }

    fn asset(name: &str) -> Asset {
        Asset {
            release_id: 1,
            name: name.to_string(),
            content_type: "application/java-archive".to_string(),
            download_url: format!("https://example.com/{}", name),
        }
    }

    /// Newest first, as the platform returns them.
    fn catalog_with(releases: Vec<Release>) -> ReleaseCatalog {
        let mut source = MockReleaseSource::new();
        source
            .expect_releases()
            .times(1)
            .returning(move |_| Ok(releases.clone()));
        source.expect_latest_release().never();
        ReleaseCatalog::new(Arc::new(source))
    }

    #[test]
    fn test_parse_version_query() {
        assert_eq!("".parse::<VersionQuery>().unwrap(), VersionQuery::Latest);
        assert_eq!("  ".parse::<VersionQuery>().unwrap(), VersionQuery::Latest);
        assert_eq!("LATEST".parse::<VersionQuery>().unwrap(), VersionQuery::Latest);
        assert_eq!("-versions".parse::<VersionQuery>().unwrap(), VersionQuery::List);
        assert_eq!("-cancel".parse::<VersionQuery>().unwrap(), VersionQuery::Cancel);
        assert_eq!(
            "2.7.3".parse::<VersionQuery>().unwrap(),
            VersionQuery::Exact("2.7.3".to_string())
        );
        assert_eq!(VersionQuery::from_option(None), VersionQuery::Latest);
        assert_eq!(
            VersionQuery::from_option(Some("1.20.4")),
            VersionQuery::Exact("1.20.4".to_string())
        );
    }

    #[tokio::test]
    async fn test_listing_is_oldest_first_with_markers() {
        let catalog = catalog_with(vec![
            release(3, "2.8.0-pre1", true),
            release(2, "2.7.3", false),
            release(1, "2.7.2", false),
        ]);

        let choice = resolve_release(&catalog, &project(), &VersionQuery::List)
            .await
            .unwrap();

        let ReleaseChoice::Listing(listing) = choice else {
            panic!("expected a listing, got {:?}", choice);
        };
        let lines: Vec<(&str, bool, bool)> = listing
            .iter()
            .map(|l| (l.item.tag.as_str(), l.latest, l.item.prerelease))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("2.7.2", false, false),
                ("2.7.3", true, false),
                ("2.8.0-pre1", false, true),
            ]
        );
    }

    #[tokio::test]
    async fn test_listing_without_releases() {
        let catalog = catalog_with(vec![]);
        let choice = resolve_release(&catalog, &project(), &VersionQuery::List)
            .await
            .unwrap();
        assert_eq!(choice, ReleaseChoice::NoReleases);
    }

    #[tokio::test]
    async fn test_exact_tag() {
        let catalog = catalog_with(vec![release(2, "2.7.3", false), release(1, "2.7.2", false)]);

        let found = resolve_release(
            &catalog,
            &project(),
            &VersionQuery::Exact("2.7.2".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(found, ReleaseChoice::Release(release(1, "2.7.2", false)));

        let missing = resolve_release(
            &catalog,
            &project(),
            &VersionQuery::Exact("9.9.9".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(missing, ReleaseChoice::UnknownTag("9.9.9".to_string()));
    }

    #[tokio::test]
    async fn test_latest_without_final_release() {
        let mut source = MockReleaseSource::new();
        source.expect_latest_release().returning(|_| {
            Err(ResolveError::upstream("http://x", StatusCode::NOT_FOUND, "").into())
        });
        let catalog = ReleaseCatalog::new(Arc::new(source));

        let choice = resolve_release(&catalog, &project(), &VersionQuery::Latest)
            .await
            .unwrap();
        assert_eq!(choice, ReleaseChoice::NoLatest);
    }

    #[tokio::test]
    async fn test_cancel() {
        let catalog = ReleaseCatalog::new(Arc::new(MockReleaseSource::new()));
        let choice = resolve_release(&catalog, &project(), &VersionQuery::Cancel)
            .await
            .unwrap();
        assert_eq!(choice, ReleaseChoice::Cancelled);
    }

    fn build_catalog() -> BuildCatalog {
        let mut source = MockBuildSource::new();
        source
            .expect_versions()
            .returning(|| Ok(vec!["1.20.1".to_string(), "1.20.2".to_string()]));
        source.expect_builds().returning(|version| match version {
            "1.20.1" | "1.20.2" => Ok(vec![1, 2]),
            _ => Err(ResolveError::upstream("http://x", StatusCode::NOT_FOUND, "").into()),
        });
        BuildCatalog::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_server_version_latest_and_exact() {
        let builds = build_catalog();

        let latest = resolve_server_version(&builds, &VersionQuery::Latest)
            .await
            .unwrap();
        assert_eq!(latest, VersionChoice::Version(BuildVersion::new("1.20.2")));

        let exact = resolve_server_version(&builds, &VersionQuery::Exact("1.20.1".to_string()))
            .await
            .unwrap();
        assert_eq!(exact, VersionChoice::Version(BuildVersion::new("1.20.1")));

        let invalid = resolve_server_version(&builds, &VersionQuery::Exact("1.7".to_string()))
            .await
            .unwrap();
        assert_eq!(invalid, VersionChoice::Invalid("1.7".to_string()));
    }

    #[tokio::test]
    async fn test_server_version_listing_flags_latest() {
        let builds = build_catalog();
        let choice = resolve_server_version(&builds, &VersionQuery::List)
            .await
            .unwrap();

        assert_eq!(
            choice,
            VersionChoice::Listing(vec![
                Listed {
                    item: BuildVersion::new("1.20.1"),
                    latest: false
                },
                Listed {
                    item: BuildVersion::new("1.20.2"),
                    latest: true
                },
            ])
        );
    }

    #[test]
    fn test_select_asset_none_and_single() {
        assert_eq!(select_asset(&[], Some(1)).unwrap(), None);

        let assets = vec![asset("Skript.jar")];
        assert_eq!(select_asset(&assets, None).unwrap(), Some(&assets[0]));
        assert_eq!(select_asset(&assets, Some(5)).unwrap(), Some(&assets[0]));
    }

    #[test]
    fn test_select_asset_by_index() {
        let assets = vec![asset("Skript.jar"), asset("Skript-sources.jar")];
        assert_eq!(select_asset(&assets, Some(2)).unwrap(), Some(&assets[1]));
    }

    #[test]
    fn test_select_asset_ambiguous() {
        let assets = vec![asset("Skript.jar"), asset("Skript-sources.jar")];

        let err = select_asset(&assets, None).unwrap_err();
        let ambiguous = err.downcast_ref::<AmbiguousChoice>().unwrap();
        assert_eq!(ambiguous.candidates, vec!["Skript.jar", "Skript-sources.jar"]);
        assert!(err.to_string().contains("1) Skript.jar"));

        let err = select_asset(&assets, Some(0)).unwrap_err();
        assert!(err.to_string().contains("Invalid asset index 0"));
        assert!(select_asset(&assets, Some(3)).is_err());
    }

    #[test]
    fn test_select_project() {
        let candidates = vec![Project::new("a", "SkBee"), Project::new("b", "skbee")];
        assert_eq!(
            select_project(&candidates, Some(2)).unwrap(),
            Some(&candidates[1])
        );

        let err = select_project(&candidates, None).unwrap_err();
        assert!(err.to_string().contains("2) b/skbee"));
    }
}
