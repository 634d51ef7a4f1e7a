//! Project search with a small tolerance for typos.

use std::sync::Arc;

use anyhow::Result;
use log::debug;

use crate::provider::{Project, ReleaseSource};
use crate::similarity::edit_distance;

/// Candidates must be strictly closer than this to the query.
pub const DEFAULT_MAX_DISTANCE: usize = 3;

/// Looks up projects by a free-text name.
pub struct ProjectDirectory {
    source: Arc<dyn ReleaseSource>,
    max_distance: usize,
}

impl ProjectDirectory {
    pub fn new(source: Arc<dyn ReleaseSource>) -> Self {
        Self::with_max_distance(source, DEFAULT_MAX_DISTANCE)
    }

    pub fn with_max_distance(source: Arc<dyn ReleaseSource>, max_distance: usize) -> Self {
        Self {
            source,
            max_distance,
        }
    }

    /// Projects whose name is within the distance threshold of `query`,
    /// in the order the platform ranked them. Every call queries upstream.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Project>> {
        let query = query.to_lowercase();
        let candidates = self.source.search(&query).await?;
        let total = candidates.len();

        let matches: Vec<Project> = candidates
            .into_iter()
            .filter(|project| {
                edit_distance(&query, &project.name.to_lowercase()) < self.max_distance
            })
            .collect();

        debug!(
            "Search for '{}' kept {} of {} candidates",
            query,
            matches.len(),
            total
        );
        Ok(matches)
    }
}
