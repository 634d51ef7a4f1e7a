//! Builds request URLs from a configured base and untrusted path segments.

use anyhow::{Result, anyhow};
use reqwest::Url;

use super::error::ResolveError;

/// Appends `segments` to the path of `base`, percent-encoding each one.
///
/// A segment never adds more than one path component: `/`, `?` and `#` are
/// escaped. Empty, `.` and `..` segments would be dropped or collapsed by URL
/// normalization, so they are refused with [`ResolveError::InvalidName`].
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    if let Some(bad) = segments
        .iter()
        .find(|s| matches!(**s, "" | "." | ".."))
    {
        return Err(ResolveError::InvalidName {
            name: bad.to_string(),
        }
        .into());
    }

    let mut url = Url::parse(base).map_err(|e| anyhow!("Invalid API URL '{}': {}", base, e))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("API URL '{}' cannot have a path", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
