//! Forest configuration.
//!
//! - [`ForestConfig`]: validated top-level configuration (`bon` builder)
//! - [`TreeParams`]: per-tree shape parameters
//! - [`BootstrapPolicy`]: per-tree subsample policy

mod forest;
mod params;

pub use forest::{ConfigError, ForestConfig, MAX_SUPPORTED_DEPTH};
pub use params::{BootstrapPolicy, TreeParams};
