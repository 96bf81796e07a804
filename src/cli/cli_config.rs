use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::config::ConfigLayer;

/// Publishes a site from a content directory and an assets directory.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// The root directory of the project
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Config file, relative to the project root unless absolute [default: gardener.yaml]
    #[clap(long, short)]
    pub config: Option<PathBuf>,

    /// Absolute path of the content directory
    #[clap(long)]
    pub content: Option<PathBuf>,

    /// Absolute path of the assets directory
    #[clap(long)]
    pub assets: Option<PathBuf>,

    /// Absolute path of the output directory
    #[clap(long)]
    pub dist: Option<PathBuf>,

    /// Delete the output directory before publishing
    #[clap(long)]
    pub clean: bool,
}

impl Cli {
    pub fn config_layer(&self) -> ConfigLayer {
        ConfigLayer {
            content_dir: self.content.clone(),
            assets_dir: self.assets.clone(),
            dist: self.dist.clone(),
        }
    }
}
