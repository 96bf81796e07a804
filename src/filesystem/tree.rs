use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Metadata shared by every node shape, regardless of the payload a stage attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Base name of the entry
    pub name: String,
    /// Absolute path of the entry
    pub path: PathBuf,
    /// Absolute path of the containing directory
    pub parent_path: PathBuf,
    /// Path relative to the parent of the tree root, so it always starts with the root's name
    pub rel_path: PathBuf,
}

/// Represents the type of a filesystem node.
///
/// Only directories carry children. An empty directory still has an (empty) children
/// list, a file never has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind<P> {
    File,
    Directory { children: Vec<Node<P>> },
}

/// One entry of a source tree together with a stage-specific payload.
///
/// The plain tree produced by the builder is `Node<()>`. Stages that widen the node
/// (e.g. attaching a destination path) produce a new tree with a different `P`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<P = ()> {
    pub info: NodeInfo,
    pub kind: NodeKind<P>,
    pub payload: P,
}

impl<P> Node<P> {
    pub fn file(info: NodeInfo, payload: P) -> Self {
        Node {
            info,
            kind: NodeKind::File,
            payload,
        }
    }

    pub fn directory(info: NodeInfo, children: Vec<Node<P>>, payload: P) -> Self {
        Node {
            info,
            kind: NodeKind::Directory { children },
            payload,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn path(&self) -> &Path {
        &self.info.path
    }

    pub fn parent_path(&self) -> &Path {
        &self.info.parent_path
    }

    pub fn rel_path(&self) -> &Path {
        &self.info.rel_path
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Children of a directory, `None` for files.
    pub fn children(&self) -> Option<&[Node<P>]> {
        match &self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File => None,
        }
    }

    /// Finds a direct child by its base name
    pub fn child(&self, name: &str) -> Option<&Node<P>> {
        self.children()?.iter().find(|child| child.name() == name)
    }

    /// Number of nodes in this subtree, including the node itself.
    pub fn count(&self) -> usize {
        1 + self
            .children()
            .map(|children| children.iter().map(Node::count).sum())
            .unwrap_or(0)
    }
}

impl NodeInfo {
    /// Info for the root of a tree. The root's `rel_path` is just its own name.
    pub fn root(path: PathBuf, name: String) -> Self {
        let parent_path = path.parent().map(Path::to_path_buf).unwrap_or_default();
        NodeInfo {
            rel_path: PathBuf::from(&name),
            name,
            path,
            parent_path,
        }
    }

    /// Info for a direct child of the node described by `self`.
    pub fn child(&self, name: String) -> Self {
        NodeInfo {
            path: self.path.join(&name),
            parent_path: self.path.clone(),
            rel_path: self.rel_path.join(&name),
            name,
        }
    }

    /// Info for a directory entry named `file_name`.
    ///
    /// Paths keep the raw name so they stay valid on disk; only `name` is lossily
    /// converted when the entry name is not UTF-8.
    pub fn child_entry(&self, file_name: &OsStr) -> Self {
        NodeInfo {
            name: file_name.to_string_lossy().into_owned(),
            path: self.path.join(file_name),
            parent_path: self.path.clone(),
            rel_path: self.rel_path.join(file_name),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::small_tree;
    use super::*;

    #[test]
    fn root_rel_path_is_its_own_name() {
        let info = NodeInfo::root(PathBuf::from("/srv/site/content"), "content".into());
        assert_eq!(info.rel_path, PathBuf::from("content"));
        assert_eq!(info.parent_path, PathBuf::from("/srv/site"));
    }

    #[test]
    fn child_info_extends_parent_paths() {
        let root = NodeInfo::root(PathBuf::from("/srv/site/content"), "content".into());
        let sub = root.child("sub".into());
        let leaf = sub.child("bar.md".into());

        assert_eq!(leaf.path, PathBuf::from("/srv/site/content/sub/bar.md"));
        assert_eq!(leaf.parent_path, PathBuf::from("/srv/site/content/sub"));
        assert_eq!(leaf.rel_path, PathBuf::from("content/sub/bar.md"));
    }

    #[test]
    fn child_entry_matches_child_for_utf8_names() {
        let root = NodeInfo::root(PathBuf::from("/srv/site/content"), "content".into());
        assert_eq!(
            root.child_entry(OsStr::new("post.md")),
            root.child("post.md".into())
        );
    }

    #[cfg(unix)]
    #[test]
    fn child_entry_keeps_raw_bytes_in_paths() {
        use std::os::unix::ffi::OsStrExt;

        let root = NodeInfo::root(PathBuf::from("/srv/site/content"), "content".into());
        let raw = OsStr::from_bytes(b"caf\xe9.md");
        let info = root.child_entry(raw);

        assert_eq!(info.name, "caf\u{FFFD}.md");
        assert_eq!(info.path.file_name(), Some(raw));
        assert_eq!(info.rel_path, Path::new("content").join(raw));
    }

    #[test]
    fn files_have_no_children_and_empty_directories_do() {
        let root = NodeInfo::root(PathBuf::from("/x"), "x".into());
        let file = Node::file(root.child("f".into()), ());
        let dir: Node = Node::directory(root.child("d".into()), Vec::new(), ());

        assert!(file.children().is_none());
        assert!(!file.is_directory());
        assert_eq!(dir.children().map(<[_]>::len), Some(0));
        assert!(dir.is_directory());
    }

    #[test]
    fn count_and_child_lookup() {
        let tree = small_tree();
        assert_eq!(tree.count(), 4);
        assert_eq!(
            tree.child("b").and_then(|b| b.child("c")).map(Node::name),
            Some("c")
        );
        assert!(tree.child("missing").is_none());
    }
}
