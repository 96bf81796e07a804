use std::path::{Path, PathBuf};

use futures::future::ready;
use snafu::{OptionExt, ResultExt};
use tracing::{debug, info};

use crate::filesystem::{Draft, Node, VisitFlow, Visitor, map_node, visit_node};
use crate::pipeline::{
    Chain, CopyFileSnafu, CreateDirectorySnafu, OutsideSourceDirSnafu, Stage, StageError,
    StageExt,
};

/// Where an asset ends up in the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDestination {
    pub dest_path: PathBuf,
}

pub type AssetNode = Node<AssetDestination>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapToAssetNodeConfig {
    /// Directory the asset tree was built from
    pub assets_dir: PathBuf,
    /// Directory the assets are published to
    pub dest_dir: PathBuf,
}

/// Attaches a destination path to every node of an asset tree.
///
/// A node at `assets_dir/x/y` gets `dest_dir/x/y`; the root itself maps to `dest_dir`.
#[derive(Debug, Clone)]
pub struct MapToAssetNode {
    config: MapToAssetNodeConfig,
}

impl MapToAssetNode {
    pub fn new(config: MapToAssetNodeConfig) -> Self {
        Self { config }
    }

    fn to_asset_node(&self, draft: Draft<(), AssetDestination>) -> Result<AssetNode, StageError> {
        let rel = draft
            .info
            .path
            .strip_prefix(&self.config.assets_dir)
            .ok()
            .context(OutsideSourceDirSnafu {
                path: draft.info.path.clone(),
                root: self.config.assets_dir.clone(),
            })?;
        let dest_path = destination(&self.config.dest_dir, rel);
        Ok(draft.finish(AssetDestination { dest_path }))
    }
}

fn destination(dest_dir: &Path, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        dest_dir.to_path_buf()
    } else {
        dest_dir.join(rel)
    }
}

impl Stage for MapToAssetNode {
    type Input = Node;
    type Output = AssetNode;

    fn name(&self) -> &str {
        "map-to-asset-node"
    }

    async fn run(&self, root: Node) -> Result<AssetNode, StageError> {
        map_node(&root, &|draft: Draft<(), AssetDestination>| {
            ready(self.to_asset_node(draft))
        })
        .await
    }
}

/// Copies every asset to its destination path, creating directories on the way.
#[derive(Debug, Clone, Default)]
pub struct CopyAssets;

impl CopyAssets {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for CopyAssets {
    type Input = AssetNode;
    type Output = AssetNode;

    fn name(&self) -> &str {
        "copy-assets"
    }

    async fn run(&self, tree: AssetNode) -> Result<AssetNode, StageError> {
        let mut copier = AssetCopier::default();
        visit_node(&tree, &mut copier).await?;
        info!(
            "Copied {} asset file(s) into {} director(ies)",
            copier.files, copier.directories
        );
        Ok(tree)
    }
}

#[derive(Debug, Default)]
struct AssetCopier {
    files: usize,
    directories: usize,
}

impl Visitor<AssetDestination> for AssetCopier {
    type Error = StageError;

    async fn visit(
        &mut self,
        node: &AssetNode,
        _parent: Option<&AssetNode>,
    ) -> Result<VisitFlow, StageError> {
        let target = &node.payload.dest_path;

        if node.is_directory() {
            debug!("Creating directory {}", target.display());
            compio::fs::create_dir_all(target)
                .await
                .context(CreateDirectorySnafu {
                    path: target.clone(),
                })?;
            self.directories += 1;
            return Ok(VisitFlow::Continue);
        }

        if let Some(parent) = target.parent() {
            compio::fs::create_dir_all(parent)
                .await
                .context(CreateDirectorySnafu {
                    path: parent.to_path_buf(),
                })?;
        }

        debug!("Copying {} to {}", node.path().display(), target.display());
        let bytes = compio::fs::read(node.path()).await.context(CopyFileSnafu {
            from: node.path().to_path_buf(),
            to: target.clone(),
        })?;
        compio::fs::write(target, bytes)
            .await
            .0
            .context(CopyFileSnafu {
                from: node.path().to_path_buf(),
                to: target.clone(),
            })?;
        self.files += 1;

        Ok(VisitFlow::Continue)
    }
}

/// Default asset chain: attach destinations under `dest_dir`, then copy.
pub fn default_asset_stages(
    assets_dir: impl Into<PathBuf>,
    dest_dir: impl Into<PathBuf>,
) -> Chain<MapToAssetNode, CopyAssets> {
    MapToAssetNode::new(MapToAssetNodeConfig {
        assets_dir: assets_dir.into(),
        dest_dir: dest_dir.into(),
    })
    .then(CopyAssets::new())
}
