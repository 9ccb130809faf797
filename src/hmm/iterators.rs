//!
//! Extension to `petgraph` basic iterators for `StableDiGraph`
//!
use petgraph::stable_graph::{EdgeIndex, Edges, NodeIndex, NodeReferences, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoNodeReferences};
use petgraph::{Directed, Direction};

/// Iterator struct for `nodes()`
/// (with `NodeReferences` of petgraph)
///
pub struct NodesIterator<'a, N: 'a> {
    nodes: NodeReferences<'a, N>,
}

impl<'a, N> NodesIterator<'a, N> {
    /// Create NodesIterator from the reference of StableDiGraph
    pub fn new<E>(graph: &'a StableDiGraph<N, E>) -> Self {
        NodesIterator {
            nodes: graph.node_references(),
        }
    }
}

impl<'a, N> Iterator for NodesIterator<'a, N> {
    type Item = (NodeIndex, &'a N);
    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.next()
    }
}

/// Iterator for `childs()`
pub struct ChildEdges<'a, E: 'a> {
    edges: Edges<'a, E, Directed>,
}

impl<'a, E> ChildEdges<'a, E> {
    /// Create ChildEdges from the reference of StableDiGraph
    pub fn new<N>(graph: &'a StableDiGraph<N, E>, node: NodeIndex) -> Self {
        ChildEdges {
            edges: graph.edges_directed(node, Direction::Outgoing),
        }
    }
}

impl<'a, E> Iterator for ChildEdges<'a, E> {
    type Item = (EdgeIndex, NodeIndex, &'a E);
    fn next(&mut self) -> Option<Self::Item> {
        // er.source() = the given node
        // er.target() = child
        self.edges
            .next()
            .map(|er| (er.id(), er.target(), er.weight()))
    }
}

/// Iterator for `parents()`
pub struct ParentEdges<'a, E: 'a> {
    edges: Edges<'a, E, Directed>,
}

impl<'a, E> ParentEdges<'a, E> {
    /// Create ParentEdges from the reference of StableDiGraph
    pub fn new<N>(graph: &'a StableDiGraph<N, E>, node: NodeIndex) -> Self {
        ParentEdges {
            edges: graph.edges_directed(node, Direction::Incoming),
        }
    }
}

impl<'a, E> Iterator for ParentEdges<'a, E> {
    type Item = (EdgeIndex, NodeIndex, &'a E);
    fn next(&mut self) -> Option<Self::Item> {
        // er.source() = parent
        // er.target() = the given node
        self.edges
            .next()
            .map(|er| (er.id(), er.source(), er.weight()))
    }
}
