//! Site configuration: where content and assets are read from and where the site is
//! published to.

#[allow(clippy::module_inception)]
mod config;
mod config_layer;

pub use config::{ConfigError, GardenerConfig, get_config_file_path};
pub use config_layer::ConfigLayer;
