use std::borrow::Cow;
use std::path::{Path, PathBuf};

use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::config::ConfigError;
use crate::config::config::{
    NotAStringSnafu, ParseSnafu, ReadSnafu, SectionNotMapSnafu, TopLevelNotMapSnafu, Utf8Snafu,
};
use crate::ext::{AsyncTryFrom, BestEffortPathExt};

/// One source of path settings (config file or command line). Unset fields fall
/// through to the next layer down.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigLayer {
    pub content_dir: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub dist: Option<PathBuf>,
}

impl ConfigLayer {
    fn lookup<'a, 'input>(
        map: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
        key: &str,
    ) -> Option<&'a Yaml<'input>> {
        map.get(&Yaml::Value(Scalar::String(Cow::Owned(key.to_string()))))
    }

    fn path_entry(
        map: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
    ) -> Result<Option<PathBuf>, ConfigError> {
        match Self::lookup(map, key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(PathBuf::from(s)))
                .context(NotAStringSnafu { key }),
        }
    }
}

impl TryFrom<&str> for ConfigLayer {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first() else {
            debug!("Config file is empty, using defaults");
            return Ok(ConfigLayer::default());
        };

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let (content_dir, assets_dir) = match Self::lookup(top_level, "src") {
            None => (None, None),
            Some(src) => {
                let src = src
                    .as_mapping()
                    .context(SectionNotMapSnafu { key: "src" })?;
                (
                    Self::path_entry(src, "contentDir")?,
                    Self::path_entry(src, "assetsDir")?,
                )
            }
        };
        let dist = Self::path_entry(top_level, "dist")?;

        Ok(ConfigLayer {
            content_dir,
            assets_dir,
            dist,
        })
    }
}

impl AsyncTryFrom<&Path> for ConfigLayer {
    type Error = ConfigError;

    async fn async_try_from(path: &Path) -> Result<Self, Self::Error> {
        debug!("Reading config file: {}", path.best_effort_path_display());
        let bytes = compio::fs::read(path).await.context(ReadSnafu {
            file_path: path.to_path_buf(),
        })?;
        let contents = String::from_utf8(bytes).context(Utf8Snafu {
            file_path: path.to_path_buf(),
        })?;
        contents.as_str().try_into()
    }
}
