use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::PathBuf;

use snafu::ResultExt;
use tracing::{debug, info};

use crate::filesystem::{Node, ensure_inside_root};
use crate::pipeline::{DeleteFolderSnafu, Stage, StageError, UnsafeDeleteSnafu};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFolderConfig {
    /// Folder to remove, must be absolute
    pub dir: PathBuf,
    /// Nothing outside of this directory is ever deleted
    pub project_root: PathBuf,
}

/// Removes a folder before the rest of the pipeline runs, passing the tree through.
///
/// The folder has to be absolute and strictly below the project root once symbolic
/// links are resolved, otherwise the stage fails without touching the filesystem. A folder that does not exist is not an error.
#[derive(Debug, Clone)]
pub struct DeleteFolder<P = ()> {
    config: DeleteFolderConfig,
    _marker: PhantomData<fn(P) -> P>,
}

impl<P> DeleteFolder<P> {
    pub fn new(config: DeleteFolderConfig) -> Self {
        Self {
            config,
            _marker: PhantomData,
        }
    }
}

impl<P> Stage for DeleteFolder<P> {
    type Input = Node<P>;
    type Output = Node<P>;

    fn name(&self) -> &str {
        "delete-folder"
    }

    async fn run(&self, root: Node<P>) -> Result<Node<P>, StageError> {
        let target = ensure_inside_root(&self.config.project_root, &self.config.dir)
            .context(UnsafeDeleteSnafu)?;

        match std::fs::remove_dir_all(&target) {
            Ok(()) => info!("Deleted folder {}", target.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("Folder {} does not exist, nothing to delete", target.display());
            }
            Err(err) => return Err(err).context(DeleteFolderSnafu { path: target }),
        }

        Ok(root)
    }
}
