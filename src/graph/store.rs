// SPDX-License-Identifier: MIT

//! In-memory workflow graph
//!
//! `WorkflowGraph` is the single write path for nodes and edges. Mutations are
//! synchronous; the engine shares the graph behind a `tokio::sync::RwLock`
//! (see [`SharedGraph`]).

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::{Edge, EdgeId, Node, NodeId, NodeKind, NodeUpdate};
use crate::error::GraphError;

/// Graph shared between an editor and the engine
pub type SharedGraph = Arc<RwLock<WorkflowGraph>>;

/// Immutable copy of the graph taken at the start of a run
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges leaving `id`, in insertion order
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// Edges entering `id`, in insertion order
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == id)
    }
}

/// Nodes and edges of one workflow
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_id: u64,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the graph for sharing with the engine
    pub fn into_shared(self) -> SharedGraph {
        Arc::new(RwLock::new(self))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Append a node.
    ///
    /// # Errors
    /// [`GraphError::DuplicateId`] if the id is already taken.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.contains(&node.id) {
            return Err(GraphError::DuplicateId(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Create a node with a fresh `node-N` id and return the id
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = loop {
            let candidate = format!("node-{}", self.next_id);
            self.next_id += 1;
            if !self.contains(&candidate) {
                break candidate;
            }
        };
        self.nodes.push(Node::new(id.clone(), kind));
        id
    }

    /// Shallow-merge `update` into the node's mutable fields.
    ///
    /// Returns `false` (and changes nothing) if the node no longer exists;
    /// the engine relies on this when a node is deleted mid-run. A config
    /// update whose type differs from the node's type is ignored.
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            log::debug!("Ignoring update for missing node {}", id);
            return false;
        };

        if let Some(kind) = update.kind {
            if kind.node_type() == node.node_type() {
                node.kind = kind;
            } else {
                log::warn!(
                    "Ignoring config update for node {}: type {} cannot become {}",
                    id,
                    node.node_type(),
                    kind.node_type()
                );
            }
        }
        if let Some(output) = update.output {
            node.output = output;
        }
        if let Some(status) = update.status {
            node.status = status;
        }
        if let Some(error) = update.error {
            node.error = error;
        }
        true
    }

    /// Remove a node and every edge touching it
    pub fn delete_node(&mut self, id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        self.edges.retain(|e| e.source != id && e.target != id);
        Some(self.nodes.remove(index))
    }

    /// Connect `source` → `target`, replacing any edge already entering
    /// `target`.
    ///
    /// # Errors
    /// [`GraphError::InvalidEndpoint`] if either node is missing.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<EdgeId, GraphError> {
        for endpoint in [source, target] {
            if !self.contains(endpoint) {
                return Err(GraphError::InvalidEndpoint(endpoint.to_string()));
            }
        }

        if let Some(index) = self.edges.iter().position(|e| e.target == target) {
            let replaced = self.edges.remove(index);
            log::debug!(
                "Replacing edge {} -> {} with {} -> {}",
                replaced.source,
                replaced.target,
                source,
                target
            );
        }

        // node ids are free-form, so `e{source}-{target}` can collide
        let mut edge = Edge::new(source, target);
        let base = edge.id.clone();
        let mut suffix = 1;
        while self.edges.iter().any(|e| e.id == edge.id) {
            edge.id = format!("{}#{}", base, suffix);
            suffix += 1;
        }
        let id = edge.id.clone();
        self.edges.push(edge);
        Ok(id)
    }

    /// Remove an edge by id; no-op if absent
    pub fn disconnect(&mut self, edge_id: &str) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.id == edge_id)?;
        Some(self.edges.remove(index))
    }

    /// Remove all nodes and edges
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// Ids of nodes with no incoming edge
    pub fn roots(&self) -> Vec<NodeId> {
        let targets: HashSet<&str> = self.edges.iter().map(|e| e.target.as_str()).collect();
        self.nodes
            .iter()
            .filter(|n| !targets.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{NodeStatus, NodeType};

    fn graph_with(ids: &[&str]) -> WorkflowGraph {
        let mut graph = WorkflowGraph::new();
        for id in ids {
            graph.add_node(Node::new(*id, NodeKind::Results)).unwrap();
        }
        graph
    }

    #[test]
    fn test_add_duplicate_node_fails() {
        let mut graph = graph_with(&["a"]);
        let err = graph.add_node(Node::new("a", NodeKind::Results)).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateId(id) if id == "a"));
        assert_eq!(graph.nodes().len(), 1);
    }

    #[test]
    fn test_create_node_skips_taken_ids() {
        let mut graph = graph_with(&["node-0"]);
        let id = graph.create_node(NodeKind::Results);
        assert_eq!(id, "node-1");
        assert_eq!(graph.create_node(NodeKind::Results), "node-2");
    }

    #[test]
    fn test_connect_replaces_existing_incoming_edge() {
        let mut graph = graph_with(&["s", "s2", "n"]);
        graph.connect("s", "n").unwrap();
        graph.connect("s2", "n").unwrap();

        let incoming: Vec<_> = graph.edges().iter().filter(|e| e.target == "n").collect();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].source, "s2");
    }

    #[test]
    fn test_connect_invalid_endpoint() {
        let mut graph = graph_with(&["a"]);
        let err = graph.connect("a", "ghost").unwrap_err();
        assert!(matches!(err, GraphError::InvalidEndpoint(id) if id == "ghost"));
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_delete_node_cascades_edges() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.connect("a", "b").unwrap();
        graph.connect("b", "c").unwrap();

        assert!(graph.delete_node("b").is_some());
        assert!(graph.edges().is_empty());
        assert_eq!(graph.nodes().len(), 2);
        assert!(graph.delete_node("b").is_none());
    }

    #[test]
    fn test_update_missing_node_is_noop() {
        let mut graph = graph_with(&["a"]);
        assert!(!graph.update_node("ghost", NodeUpdate::running()));
        assert_eq!(graph.node("a").unwrap().status, NodeStatus::Idle);
    }

    #[test]
    fn test_update_merges_only_given_fields() {
        let mut graph = graph_with(&["a"]);
        graph.update_node("a", NodeUpdate::failed("boom"));
        graph.update_node(
            "a",
            NodeUpdate {
                status: Some(NodeStatus::Idle),
                ..Default::default()
            },
        );

        let node = graph.node("a").unwrap();
        assert_eq!(node.status, NodeStatus::Idle);
        assert_eq!(node.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_update_cannot_change_node_type() {
        let mut graph = graph_with(&["a"]);
        let train = NodeKind::default_for(NodeType::Train);
        graph.update_node("a", NodeUpdate::config(train));
        assert_eq!(graph.node("a").unwrap().kind, NodeKind::Results);
    }

    #[test]
    fn test_disconnect_and_clear() {
        let mut graph = graph_with(&["a", "b"]);
        let edge_id = graph.connect("a", "b").unwrap();
        assert!(graph.disconnect("missing").is_none());
        assert!(graph.disconnect(&edge_id).is_some());
        assert!(graph.edges().is_empty());

        graph.clear();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_edge_ids_stay_unique_when_node_ids_contain_dashes() {
        let mut graph = graph_with(&["a-b", "c", "a", "b-c"]);
        let first = graph.connect("a-b", "c").unwrap();
        let second = graph.connect("a", "b-c").unwrap();
        assert_eq!(first, "ea-b-c");
        assert_ne!(first, second);

        let removed = graph.disconnect(&second).unwrap();
        assert_eq!((removed.source.as_str(), removed.target.as_str()), ("a", "b-c"));
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].source, "a-b");
    }

    #[test]
    fn test_roots() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.connect("a", "b").unwrap();
        assert_eq!(graph.roots(), vec!["a".to_string(), "c".to_string()]);
    }
}
