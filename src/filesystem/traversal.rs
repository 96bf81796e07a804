use std::convert::Infallible;
use std::future::Future;

use derive_more::Display;
use futures::future::LocalBoxFuture;
use futures::{FutureExt, StreamExt, TryStreamExt, stream};

use crate::filesystem::{Node, NodeInfo, NodeKind, Registry};

/// Upper bound of sibling subtrees mapped at the same time within one directory.
pub const MAP_CONCURRENCY: usize = 16;

/// What a visitor wants the walk to do after it has seen a node.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitFlow {
    #[default]
    Continue,
    /// Do not descend into the children of the current node. Siblings are still visited.
    SkipChildren,
}

impl From<()> for VisitFlow {
    fn from(_: ()) -> Self {
        VisitFlow::Continue
    }
}

impl From<bool> for VisitFlow {
    fn from(descend: bool) -> Self {
        if descend {
            VisitFlow::Continue
        } else {
            VisitFlow::SkipChildren
        }
    }
}

/// Called once per node by [`visit_node`].
///
/// Visitors may perform side effects such as writing files; each call completes
/// before the next one starts.
pub trait Visitor<P> {
    type Error;

    async fn visit(
        &mut self,
        node: &Node<P>,
        parent: Option<&Node<P>>,
    ) -> Result<VisitFlow, Self::Error>;
}

/// Plain closures are infallible synchronous visitors.
impl<P, F, R> Visitor<P> for F
where
    F: FnMut(&Node<P>, Option<&Node<P>>) -> R,
    R: Into<VisitFlow>,
{
    type Error = Infallible;

    async fn visit(
        &mut self,
        node: &Node<P>,
        parent: Option<&Node<P>>,
    ) -> Result<VisitFlow, Self::Error> {
        Ok((self)(node, parent).into())
    }
}

/// Walks the tree depth-first, parent before children, strictly sequentially.
///
/// Returning [`VisitFlow::SkipChildren`] prunes only the subtree of the current node.
/// The first visitor error aborts the walk.
pub async fn visit_node<P, V>(node: &Node<P>, visitor: &mut V) -> Result<(), V::Error>
where
    V: Visitor<P>,
{
    visit_inner(node, None, visitor).await
}

fn visit_inner<'a, P, V>(
    node: &'a Node<P>,
    parent: Option<&'a Node<P>>,
    visitor: &'a mut V,
) -> LocalBoxFuture<'a, Result<(), V::Error>>
where
    P: 'a,
    V: Visitor<P> + 'a,
{
    async move {
        if visitor.visit(node, parent).await? == VisitFlow::SkipChildren {
            return Ok(());
        }
        if let Some(children) = node.children() {
            for child in children {
                visit_inner(child, Some(node), &mut *visitor).await?;
            }
        }
        Ok(())
    }
    .boxed_local()
}

/// Visits the content tree, then the assets tree once the content walk has finished.
pub async fn visit_registry<V>(registry: &Registry, visitor: &mut V) -> Result<(), V::Error>
where
    V: Visitor<()>,
{
    visit_node(&registry.content, visitor).await?;
    visit_node(&registry.assets, visitor).await
}

/// A shallow copy of a node handed to a [`map_node`] mapper.
///
/// It carries the node's own info and payload plus its children, which have already
/// been mapped to the output type.
#[derive(Debug, Clone)]
pub struct Draft<P, Q> {
    pub info: NodeInfo,
    pub payload: P,
    children: Option<Vec<Node<Q>>>,
}

impl<P, Q> Draft<P, Q> {
    pub fn is_directory(&self) -> bool {
        self.children.is_some()
    }

    pub fn children(&self) -> Option<&[Node<Q>]> {
        self.children.as_deref()
    }

    /// Assembles the output node with the given payload.
    pub fn finish(self, payload: Q) -> Node<Q> {
        let kind = match self.children {
            Some(children) => NodeKind::Directory { children },
            None => NodeKind::File,
        };
        Node {
            info: self.info,
            kind,
            payload,
        }
    }
}

/// Produces a new tree by applying `mapper` bottom-up.
///
/// Children of a directory are mapped (concurrently, at most [`MAP_CONCURRENCY`] at a
/// time) before the directory itself. The input tree is only borrowed and never
/// modified. The first mapper error aborts the whole mapping.
pub async fn map_node<P, Q, E, F, Fut>(node: &Node<P>, mapper: &F) -> Result<Node<Q>, E>
where
    P: Clone,
    F: Fn(Draft<P, Q>) -> Fut,
    Fut: Future<Output = Result<Node<Q>, E>>,
{
    map_inner(node, mapper).await
}

fn map_inner<'a, P, Q, E, F, Fut>(
    node: &'a Node<P>,
    mapper: &'a F,
) -> LocalBoxFuture<'a, Result<Node<Q>, E>>
where
    P: Clone + 'a,
    Q: 'a,
    E: 'a,
    F: Fn(Draft<P, Q>) -> Fut + 'a,
    Fut: Future<Output = Result<Node<Q>, E>> + 'a,
{
    async move {
        let children = match node.children() {
            Some(children) => Some(
                stream::iter(children.iter().map(|child| map_inner(child, mapper)))
                    .buffered(MAP_CONCURRENCY)
                    .try_collect::<Vec<_>>()
                    .await?,
            ),
            None => None,
        };

        let draft = Draft {
            info: node.info.clone(),
            payload: node.payload.clone(),
            children,
        };
        mapper(draft).await
    }
    .boxed_local()
}
