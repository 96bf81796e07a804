use std::fs;
use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::filesystem::{Node, NodeInfo};

/// Builds a tree rooted at `root`.
///
/// Entries are inspected without following links. A symbolic link anywhere in the tree
/// aborts the build; no partial tree is returned. Siblings keep the order in which the
/// directory listing yields them.
pub fn build_tree(root: &Path) -> Result<Node, BuildError> {
    ensure!(
        root.is_absolute(),
        InvalidRootSnafu {
            path: root.to_path_buf()
        }
    );
    let name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context(InvalidRootSnafu {
            path: root.to_path_buf(),
        })?;

    debug!("Building tree for {}", root.display());
    let tree = build_node(NodeInfo::root(root.to_path_buf(), name))?;
    debug!(
        "Built tree for {} with {} nodes",
        root.display(),
        tree.count()
    );
    Ok(tree)
}

fn build_node(info: NodeInfo) -> Result<Node, BuildError> {
    let metadata = fs::symlink_metadata(&info.path).context(IoSnafu {
        path: info.path.clone(),
    })?;
    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        return SymlinkUnsupportedSnafu { path: info.path }.fail();
    }

    if file_type.is_dir() {
        let entries = fs::read_dir(&info.path).context(IoSnafu {
            path: info.path.clone(),
        })?;

        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.context(IoSnafu {
                path: info.path.clone(),
            })?;
            children.push(build_node(info.child_entry(&entry.file_name()))?);
        }
        return Ok(Node::directory(info, children, ()));
    }

    if file_type.is_file() {
        return Ok(Node::file(info, ()));
    }

    UnsupportedEntrySnafu { path: info.path }.fail()
}

#[derive(Debug, Snafu)]
pub enum BuildError {
    #[snafu(display("Symlinks are not supported: {}", path.display()))]
    SymlinkUnsupported { path: PathBuf },
    #[snafu(display("Unsupported filesystem entry (neither file nor directory): {}", path.display()))]
    UnsupportedEntry { path: PathBuf },
    #[snafu(display("Tree root must be an absolute path with a file name: {}", path.display()))]
    InvalidRoot { path: PathBuf },
    #[snafu(display("Failed to read {}", path.best_effort_path_display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
