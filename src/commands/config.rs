use std::time::Duration;

use crate::catalog::DEFAULT_MAX_DISTANCE;

pub const DEFAULT_GITHUB_URL: &str = "https://api.github.com";
pub const DEFAULT_PAPER_URL: &str = "https://papermc.io/api/v2";
pub const DEFAULT_LANGUAGE: &str = "java";
pub const USER_AGENT: &str = "sksetup-cli";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Hosting platform API base
    pub github_url: String,
    /// Build server API base
    pub paper_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Language filter added to project searches
    pub language: String,
    /// Search results must be strictly closer than this to the query
    pub max_distance: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_url: DEFAULT_GITHUB_URL.to_string(),
            paper_url: DEFAULT_PAPER_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            language: DEFAULT_LANGUAGE.to_string(),
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }
}

impl Config {
    /// Defaults, with the endpoints and timeout overridden where given.
    pub fn new(
        github_url: Option<String>,
        paper_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            github_url: github_url.unwrap_or(defaults.github_url),
            paper_url: paper_url.unwrap_or(defaults.paper_url),
            timeout: timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            ..defaults
        }
    }
}
