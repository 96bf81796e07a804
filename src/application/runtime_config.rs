use std::path::PathBuf;

use snafu::{ResultExt, Snafu};

use crate::application::data::LogLevel;
use crate::cli::Cli;
use crate::config::ConfigLayer;
use crate::ext::normalize_path;

/// Everything a run needs from the command line, with the project root made absolute.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub project_root: PathBuf,
    pub config_file: Option<PathBuf>,
    pub overrides: ConfigLayer,
    pub clean: bool,
    pub log_level: LogLevel,
}

impl TryFrom<Cli> for RuntimeConfig {
    type Error = RuntimeConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        // The only place the working directory is consulted
        let project_root = std::path::absolute(&cli.root).context(ProjectRootSnafu {
            path: cli.root.clone(),
        })?;

        Ok(Self {
            project_root: normalize_path(&project_root),
            overrides: cli.config_layer(),
            config_file: cli.config,
            clean: cli.clean,
            log_level: cli.log_level,
        })
    }
}

#[derive(Debug, Snafu)]
pub enum RuntimeConfigError {
    #[snafu(display("Failed to resolve the project root {}", path.display()))]
    ProjectRoot {
        path: PathBuf,
        source: std::io::Error,
    },
}
