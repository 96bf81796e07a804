//! Source tree representation and the primitives that walk and transform it.
//!
//! A tree is built once per source directory, then handed through stages that
//! either visit it (side effects only) or map it into a new tree whose nodes may
//! carry a different payload.

mod builder;
mod path_guard;
mod registry;
mod traversal;
mod tree;

pub use builder::{BuildError, build_tree};
pub use path_guard::{PathGuardError, ensure_inside_root};
pub use registry::{Registry, RegistryError, RegistryInitializer, SourceDirs};
pub use traversal::{
    Draft, MAP_CONCURRENCY, VisitFlow, Visitor, map_node, visit_node, visit_registry,
};
pub use tree::{Node, NodeInfo, NodeKind};
