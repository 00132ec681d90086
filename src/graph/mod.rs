// SPDX-License-Identifier: MIT

//! Workflow graph model
//!
//! This module provides:
//! - `WorkflowGraph` - nodes and edges with the mutation API
//! - `NodeKind` - a node's type together with its typed config
//! - `StepOutput` - typed output records threaded between nodes
//! - `WorkflowLoader` - YAML workflow files

pub mod catalog;
pub mod loader;
mod output;
mod store;
mod types;

pub use loader::{LoadedWorkflow, WorkflowFile, WorkflowLoader};
pub use output::{
    CleanOutput, PreprocessOutput, ResultsOutput, SplitOutput, StepOutput, TrainOutput,
    UploadOutput,
};
pub use store::{GraphSnapshot, SharedGraph, WorkflowGraph};
pub use types::{
    CleanConfig, CleaningStrategy, Edge, EdgeId, ModelKind, Node, NodeId, NodeKind, NodeStatus,
    NodeType, NodeUpdate, PreprocessConfig, ScalerKind, SplitConfig, TaskKind, TrainConfig,
    UploadConfig,
};
