// SPDX-License-Identifier: MIT

//! Workflow loader - YAML file loading and parsing
//!
//! ```yaml
//! name: churn
//! nodes:
//!   - id: upload
//!     type: upload
//!     config: { file: data/churn.csv }
//!   - id: split
//!     type: split
//!     config: { ratio: 0.8, target_column: churned }
//! edges:
//!   - { source: upload, target: split }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::store::WorkflowGraph;
use super::types::{Node, NodeKind, NodeType};
use crate::error::GraphError;

/// Workflow file as written on disk
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

/// A node entry; `config` is decoded according to `type`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
}

/// A loaded workflow
#[derive(Debug)]
pub struct LoadedWorkflow {
    pub name: String,
    pub description: String,
    pub graph: WorkflowGraph,
}

/// Loads workflow definitions from YAML files
pub struct WorkflowLoader;

impl WorkflowLoader {
    /// Load a workflow file.
    ///
    /// Relative Upload file paths are resolved against the workflow file's
    /// directory.
    pub fn load_workflow<P: AsRef<Path>>(path: P) -> Result<LoadedWorkflow, GraphError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut file = Self::parse_yaml(&content)?;

        if let Some(base) = path.parent() {
            resolve_upload_paths(&mut file, base);
        }
        Self::build(file)
    }

    pub fn parse_yaml(content: &str) -> Result<WorkflowFile, GraphError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Build a graph from a parsed file, going through the normal mutation
    /// API so the edge invariants hold.
    pub fn build(file: WorkflowFile) -> Result<LoadedWorkflow, GraphError> {
        let mut graph = WorkflowGraph::new();

        for spec in file.nodes {
            let node_type = NodeType::parse(&spec.node_type)
                .ok_or_else(|| GraphError::UnknownNodeType(spec.node_type.clone()))?;
            let kind = NodeKind::from_config(node_type, spec.config).map_err(|e| {
                GraphError::InvalidConfig {
                    node: spec.id.clone(),
                    message: e.to_string(),
                }
            })?;
            graph.add_node(Node::new(spec.id, kind))?;
        }

        for edge in &file.edges {
            if graph.edges().iter().any(|e| e.target == edge.target) {
                log::warn!(
                    "Node {} has more than one incoming edge; keeping {} -> {}",
                    edge.target,
                    edge.source,
                    edge.target
                );
            }
            graph.connect(&edge.source, &edge.target)?;
        }

        log::info!(
            "Loaded workflow '{}': {} nodes, {} edges",
            file.name,
            graph.nodes().len(),
            graph.edges().len()
        );

        Ok(LoadedWorkflow {
            name: file.name,
            description: file.description,
            graph,
        })
    }
}

fn resolve_upload_paths(file: &mut WorkflowFile, base: &Path) {
    for spec in &mut file.nodes {
        if NodeType::parse(&spec.node_type) != Some(NodeType::Upload) {
            continue;
        }
        let Some(raw) = spec.config.get("file").and_then(|f| f.as_str()) else {
            continue;
        };
        let path = Path::new(raw);
        if path.is_relative() {
            let resolved = base.join(path).to_string_lossy().into_owned();
            spec.config["file"] = serde_json::Value::String(resolved);
        }
    }
}
