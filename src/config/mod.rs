//! Configuration module for polyrun
//!
//! Provides layered loading of `polyrun.toml` and the serde model for
//! targets and custom toolchains.

pub mod loader;
pub mod model;

pub use loader::{find_project_config, load_config, load_config_file, LoadedConfig, CONFIG_FILE_NAME};
pub use model::*;
