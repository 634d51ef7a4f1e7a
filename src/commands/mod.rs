pub mod config;
pub mod services;

mod assets;
mod paper;
mod plan;
mod releases;
mod search;

pub use assets::assets;
pub use paper::paper;
pub use plan::{PlanOptions, plan};
pub use releases::releases;
pub use search::search;
