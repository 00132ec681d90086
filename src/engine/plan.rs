// SPDX-License-Identifier: MIT

//! Run planning
//!
//! Decides which nodes take part in a run and where traversal starts.

use std::collections::{HashMap, HashSet};

use crate::error::EngineError;
use crate::graph::{GraphSnapshot, NodeId};

/// What a run was asked to cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanScope {
    Whole,
    /// The node and its transitive upstream
    From(NodeId),
}

/// Execution set and roots of one run
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    scope: PlanScope,
    /// Members in snapshot order
    members: Vec<NodeId>,
    member_set: HashSet<NodeId>,
    roots: Vec<NodeId>,
}

impl ExecutionPlan {
    /// Plan a run over every node.
    ///
    /// # Errors
    /// `EmptyWorkflow`, `NoRootNodes` or `CyclicGraph`.
    pub fn whole(snapshot: &GraphSnapshot) -> Result<Self, EngineError> {
        if snapshot.nodes.is_empty() {
            return Err(EngineError::EmptyWorkflow);
        }
        let members = snapshot.nodes.iter().map(|n| n.id.clone()).collect();
        Self::build(snapshot, PlanScope::Whole, members)
    }

    /// Plan a run over `node_id` and its ancestors.
    ///
    /// # Errors
    /// `UnknownNode` if the node is not in the snapshot, otherwise as
    /// [`ExecutionPlan::whole`].
    pub fn from_node(snapshot: &GraphSnapshot, node_id: &str) -> Result<Self, EngineError> {
        if snapshot.node(node_id).is_none() {
            return Err(EngineError::UnknownNode(node_id.to_string()));
        }

        let upstream = ancestors(snapshot, node_id);
        let members = snapshot
            .nodes
            .iter()
            .filter(|n| n.id == node_id || upstream.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();
        Self::build(snapshot, PlanScope::From(node_id.to_string()), members)
    }

    fn build(
        snapshot: &GraphSnapshot,
        scope: PlanScope,
        members: Vec<NodeId>,
    ) -> Result<Self, EngineError> {
        let member_set: HashSet<NodeId> = members.iter().cloned().collect();

        // a root has no incoming edge whose source is also in the set
        let roots: Vec<NodeId> = members
            .iter()
            .filter(|id| !snapshot.incoming(id).any(|e| member_set.contains(&e.source)))
            .cloned()
            .collect();
        if roots.is_empty() {
            return Err(EngineError::NoRootNodes);
        }

        let stuck = unsorted_members(snapshot, &members, &member_set);
        if !stuck.is_empty() {
            return Err(EngineError::CyclicGraph(stuck));
        }

        log::debug!(
            "Planned {:?} run: {} nodes, roots {:?}",
            scope,
            members.len(),
            roots
        );

        Ok(Self {
            scope,
            members,
            member_set,
            roots,
        })
    }

    pub fn scope(&self) -> &PlanScope {
        &self.scope
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.member_set.contains(node_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Targets of `node_id`'s outgoing edges that lie in the execution set,
    /// in edge order
    pub fn children(&self, snapshot: &GraphSnapshot, node_id: &str) -> Vec<NodeId> {
        snapshot
            .outgoing(node_id)
            .filter(|e| self.contains(&e.target))
            .map(|e| e.target.clone())
            .collect()
    }

    /// Order in which nodes run if every step succeeds
    pub fn traversal_order(&self, snapshot: &GraphSnapshot) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.members.len());
        let mut visited = HashSet::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().cloned().collect();

        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            stack.extend(self.children(snapshot, &id).into_iter().rev());
            order.push(id);
        }
        order
    }
}

/// Every node reachable backwards from `node_id` through incoming edges
pub fn ancestors(snapshot: &GraphSnapshot, node_id: &str) -> HashSet<NodeId> {
    let mut found = HashSet::new();
    let mut stack = vec![node_id.to_string()];

    while let Some(current) = stack.pop() {
        for edge in snapshot.incoming(&current) {
            if found.insert(edge.source.clone()) {
                stack.push(edge.source.clone());
            }
        }
    }
    found
}

/// Kahn's algorithm restricted to the execution set; returns the members
/// that never reach in-degree zero (on or behind a cycle)
fn unsorted_members(
    snapshot: &GraphSnapshot,
    members: &[NodeId],
    member_set: &HashSet<NodeId>,
) -> Vec<NodeId> {
    let mut in_degree: HashMap<&str, usize> = members.iter().map(|id| (id.as_str(), 0)).collect();
    for edge in &snapshot.edges {
        if member_set.contains(&edge.source) {
            if let Some(degree) = in_degree.get_mut(edge.target.as_str()) {
                *degree += 1;
            }
        }
    }

    let mut ready: Vec<&str> = members
        .iter()
        .map(String::as_str)
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();
    let mut sorted: HashSet<&str> = HashSet::new();

    while let Some(id) = ready.pop() {
        sorted.insert(id);
        for edge in snapshot.edges.iter().filter(|e| e.source == id) {
            if let Some(degree) = in_degree.get_mut(edge.target.as_str()) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(edge.target.as_str());
                }
            }
        }
    }

    members
        .iter()
        .filter(|id| !sorted.contains(id.as_str()))
        .cloned()
        .collect()
}
