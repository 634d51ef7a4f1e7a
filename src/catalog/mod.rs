//! Cached catalogs built on top of the providers.
//!
//! - `directory` - fuzzy project search
//! - `releases` - release lists, latest release, jar assets
//! - `builds` - server versions and builds

mod builds;
mod directory;
mod releases;

pub use builds::{BuildCatalog, BuildVersion};
pub use directory::{DEFAULT_MAX_DISTANCE, ProjectDirectory};
pub use releases::{INSTALLABLE_CONTENT_TYPE, ReleaseCatalog, first_final};
