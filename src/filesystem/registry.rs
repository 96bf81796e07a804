use std::path::PathBuf;

use futures::future::join;
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::{debug, error, info};

use crate::filesystem::{BuildError, Node, build_tree};

/// The two source trees of a site. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    pub content: Node,
    pub assets: Node,
}

/// Absolute roots of the two source trees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDirs {
    pub content_dir: PathBuf,
    pub assets_dir: PathBuf,
}

/// Builds the [`Registry`] and guards access to it until the build has completed.
#[derive(Debug)]
pub struct RegistryInitializer {
    dirs: SourceDirs,
    registry: Option<Registry>,
}

impl RegistryInitializer {
    pub fn new(dirs: SourceDirs) -> Self {
        Self {
            dirs,
            registry: None,
        }
    }

    /// Builds the content and assets trees.
    ///
    /// The scan itself is synchronous, so the trees are built one after the other. Both
    /// are always attempted; the initialization fails if either of them fails, reporting
    /// the content error first.
    pub async fn initialize(&mut self) -> Result<(), RegistryError> {
        debug!(
            "Initializing registry from {} and {}",
            self.dirs.content_dir.display(),
            self.dirs.assets_dir.display()
        );
        let (content, assets) = join(
            async { build_tree(&self.dirs.content_dir) },
            async { build_tree(&self.dirs.assets_dir) },
        )
        .await;

        if let Err(err) = &content {
            error!("Failed to build content tree: {err}");
        }
        if let Err(err) = &assets {
            error!("Failed to build assets tree: {err}");
        }

        let content = content.context(ContentTreeSnafu {
            root: self.dirs.content_dir.clone(),
        })?;
        let assets = assets.context(AssetsTreeSnafu {
            root: self.dirs.assets_dir.clone(),
        })?;

        info!(
            "Registry ready: {} content nodes, {} asset nodes",
            content.count(),
            assets.count()
        );
        self.registry = Some(Registry { content, assets });
        Ok(())
    }

    /// Returns the built registry, or [`RegistryError::NotInitialized`] before
    /// [`RegistryInitializer::initialize`] has succeeded.
    pub fn registry(&self) -> Result<&Registry, RegistryError> {
        self.registry.as_ref().context(NotInitializedSnafu)
    }

    pub fn into_registry(self) -> Result<Registry, RegistryError> {
        self.registry.context(NotInitializedSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum RegistryError {
    #[snafu(display("Registry not generated yet"))]
    NotInitialized,
    #[snafu(display("Failed to build the content tree rooted at {}", root.display()))]
    ContentTree { root: PathBuf, source: BuildError },
    #[snafu(display("Failed to build the assets tree rooted at {}", root.display()))]
    AssetsTree { root: PathBuf, source: BuildError },
}
