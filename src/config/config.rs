use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use snafu::prelude::*;
use tracing::{debug, info};

use crate::config::ConfigLayer;
use crate::ext::{AsyncTryFrom, normalize_path, resolve_against};
use crate::filesystem::SourceDirs;

const CONFIG_FILE_NAME: &str = "gardener.yaml";

pub fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Fully resolved configuration. Every path in here is absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GardenerConfig {
    /// Destructive stages never touch anything outside of this directory
    pub project_root: PathBuf,
    pub content_dir: PathBuf,
    pub assets_dir: PathBuf,
    /// Output directory of the generated site
    pub dist: PathBuf,
}

impl GardenerConfig {
    /// `content`, `assets` and `dist` directly below the project root.
    pub fn defaults(project_root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let project_root = ensure_absolute("root", project_root.into())?;
        Ok(Self {
            content_dir: project_root.join("content"),
            assets_dir: project_root.join("assets"),
            dist: project_root.join("dist"),
            project_root,
        })
    }

    /// Applies a layer on top of this configuration. Every path the layer sets has to be
    /// absolute.
    pub fn merge(mut self, layer: &ConfigLayer) -> Result<Self, ConfigError> {
        if let Some(content_dir) = &layer.content_dir {
            self.content_dir = ensure_absolute("contentDir", content_dir.clone())?;
        }
        if let Some(assets_dir) = &layer.assets_dir {
            self.assets_dir = ensure_absolute("assetsDir", assets_dir.clone())?;
        }
        if let Some(dist) = &layer.dist {
            self.dist = ensure_absolute("dist", dist.clone())?;
        }
        Ok(self)
    }

    /// Resolves the configuration from defaults, the config file and the command line,
    /// in increasing order of precedence.
    ///
    /// Without an explicit `config_file`, `gardener.yaml` in the project root is used if
    /// it exists. A relative `config_file` is taken relative to the project root.
    pub async fn load(
        project_root: &Path,
        config_file: Option<&Path>,
        overrides: &ConfigLayer,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::defaults(project_root)?;

        let file_layer = match config_file {
            Some(path) => {
                let path = resolve_against(project_root, path);
                Some(ConfigLayer::async_try_from(path.as_path()).await?)
            }
            None => {
                let path = get_config_file_path(project_root);
                match ConfigLayer::async_try_from(path.as_path()).await {
                    Ok(layer) => Some(layer),
                    Err(ConfigError::ReadError { source, .. })
                        if source.kind() == ErrorKind::NotFound =>
                    {
                        debug!("No {} found, using defaults", path.display());
                        None
                    }
                    Err(err) => return Err(err),
                }
            }
        };

        let mut config = defaults;
        if let Some(layer) = &file_layer {
            config = config.merge(layer)?;
        }
        config = config.merge(overrides)?;

        info!(
            "Using content {}, assets {}, output {}",
            config.content_dir.display(),
            config.assets_dir.display(),
            config.dist.display()
        );
        Ok(config)
    }

    pub fn source_dirs(&self) -> SourceDirs {
        SourceDirs {
            content_dir: self.content_dir.clone(),
            assets_dir: self.assets_dir.clone(),
        }
    }
}

fn ensure_absolute(key: &'static str, path: PathBuf) -> Result<PathBuf, ConfigError> {
    ensure!(path.is_absolute(), RelativePathSnafu { key, path });
    Ok(normalize_path(&path))
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("Expected absolute path for '{}', but got: {}", key, path.display()))]
    RelativePath { key: &'static str, path: PathBuf },
    #[snafu(display("Failed to read the config file: {}", file_path.display()))]
    ReadError {
        file_path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Config file is not valid UTF-8: {}", file_path.display()))]
    Utf8Error {
        file_path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Section '{}' should be a map", key))]
    SectionNotMap { key: &'static str },
    #[snafu(display("'{}' should be a string", key))]
    NotAString { key: &'static str },
}
