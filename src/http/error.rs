//! Error kinds for upstream catalog requests.
//!
//! Failures travel as `anyhow::Error`; code that applies a policy to a
//! particular kind (an empty release list on a non-success status, say)
//! recovers it with `downcast_ref::<ResolveError>()`.

use reqwest::StatusCode;

/// Errors raised while talking to an upstream catalog.
#[derive(Debug)]
pub enum ResolveError {
    /// The request never produced a response (connection refused, DNS, timeout).
    Transport { url: String, message: String },
    /// The server answered with a non-success status.
    Upstream {
        url: String,
        status: StatusCode,
        message: String,
    },
    /// A successful response did not have the expected shape.
    Malformed { url: String, message: String },
    /// The latest build was requested for a version without any builds.
    NoBuilds { version: String },
    /// A name that cannot be a single path segment (`.`, `..`, empty).
    InvalidName { name: String },
    /// A paged listing failed after its first page.
    Incomplete {
        url: String,
        page: usize,
        message: String,
    },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Transport { url, message } => {
                write!(f, "Failed to reach {}: {}", url, message)
            }
            ResolveError::Upstream {
                url,
                status,
                message,
            } => {
                write!(f, "{} returned HTTP {}: {}", url, status.as_u16(), message)
            }
            ResolveError::Malformed { url, message } => {
                write!(f, "Unexpected response from {}: {}", url, message)
            }
            ResolveError::NoBuilds { version } => {
                write!(f, "Version '{}' has no builds", version)
            }
            ResolveError::InvalidName { name } => {
                write!(f, "'{}' is not a valid name", name)
            }
            ResolveError::Incomplete { url, page, message } => {
                write!(f, "Listing {} failed at page {}: {}", url, page, message)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

impl ResolveError {
    pub fn transport(url: &str, error: impl std::fmt::Display) -> Self {
        ResolveError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    pub fn upstream(url: &str, status: StatusCode, body: &str) -> Self {
        ResolveError::Upstream {
            url: url.to_string(),
            status,
            message: describe_status(status, body),
        }
    }

    pub fn malformed(url: &str, error: impl std::fmt::Display) -> Self {
        ResolveError::Malformed {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Turns a non-success status into a message a user can act on.
pub fn describe_status(status: StatusCode, body: &str) -> String {
    match status {
        StatusCode::UNAUTHORIZED => "Authentication failed".to_string(),
        StatusCode::FORBIDDEN if body.to_lowercase().contains("rate limit") => {
            "API rate limit exceeded, try again later".to_string()
        }
        StatusCode::FORBIDDEN => "Access to this resource is forbidden".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "Too many requests, try again later".to_string(),
        StatusCode::NOT_FOUND => "The requested resource was not found".to_string(),
        _ => {
            let body = body.trim();
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                body.chars().take(200).collect()
            }
        }
    }
}

/// True when `error` carries a non-success status from upstream.
pub fn is_upstream(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<ResolveError>(),
        Some(ResolveError::Upstream { .. })
    )
}

/// True when the thing asked for does not exist upstream: either the server
/// refused the request or the name could never address a resource.
pub fn is_unresolvable(error: &anyhow::Error) -> bool {
    is_upstream(error)
        || matches!(
            error.downcast_ref::<ResolveError>(),
            Some(ResolveError::InvalidName { .. })
        )
}
