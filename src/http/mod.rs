mod client;
mod endpoint;
mod error;

pub use client::HttpClient;
pub use endpoint::endpoint;
pub use error::{ResolveError, describe_status, is_unresolvable, is_upstream};
