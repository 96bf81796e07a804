use std::path::PathBuf;

use snafu::{OptionExt, ResultExt};
use tracing::debug;

use crate::filesystem::{Node, VisitFlow, Visitor, visit_node};
use crate::pipeline::{CreateDirectorySnafu, OutsideSourceDirSnafu, Stage, StageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDirectoriesConfig {
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Mirrors the directory structure of the content tree into the output directory.
///
/// Page rendering is left to stages appended after this one; they can rely on every
/// output directory already existing.
#[derive(Debug, Clone)]
pub struct ProcessDirectories {
    config: ProcessDirectoriesConfig,
}

impl ProcessDirectories {
    pub fn new(config: ProcessDirectoriesConfig) -> Self {
        Self { config }
    }
}

impl Stage for ProcessDirectories {
    type Input = Node;
    type Output = Node;

    fn name(&self) -> &str {
        "process-directories"
    }

    async fn run(&self, root: Node) -> Result<Node, StageError> {
        visit_node(&root, &mut DirectoryMirror { config: &self.config }).await?;
        Ok(root)
    }
}

struct DirectoryMirror<'a> {
    config: &'a ProcessDirectoriesConfig,
}

impl Visitor<()> for DirectoryMirror<'_> {
    type Error = StageError;

    async fn visit(&mut self, node: &Node, _parent: Option<&Node>) -> Result<VisitFlow, StageError> {
        if !node.is_directory() {
            return Ok(VisitFlow::Continue);
        }

        let rel = node
            .path()
            .strip_prefix(&self.config.content_dir)
            .ok()
            .context(OutsideSourceDirSnafu {
                path: node.path().to_path_buf(),
                root: self.config.content_dir.clone(),
            })?;
        let dest = self.config.output_dir.join(rel);

        debug!("Creating output directory {}", dest.display());
        compio::fs::create_dir_all(&dest)
            .await
            .context(CreateDirectorySnafu { path: dest.clone() })?;

        Ok(VisitFlow::Continue)
    }
}

/// Default content chain. Rendering stages are expected to be appended by the caller.
pub fn default_content_stages(
    content_dir: impl Into<PathBuf>,
    output_dir: impl Into<PathBuf>,
) -> ProcessDirectories {
    ProcessDirectories::new(ProcessDirectoriesConfig {
        content_dir: content_dir.into(),
        output_dir: output_dir.into(),
    })
}
