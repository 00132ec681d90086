// SPDX-License-Identifier: MIT

//! Typed error handling for mlpipe-rs
//!
//! Each layer has its own error type:
//! - `GraphError` for graph mutation and workflow loading
//! - `StepError` for a single step (dispatcher + remote client)
//! - `EngineError` for runs rejected before any node executes
//! - `ConfigError` for environment configuration

use std::time::Duration;
use thiserror::Error;

use crate::graph::NodeId;

/// Errors from graph mutation and workflow file loading
#[derive(Debug, Error)]
pub enum GraphError {
    /// A node with this id already exists
    #[error("Node '{0}' already exists")]
    DuplicateId(NodeId),

    /// An edge endpoint does not exist in the graph
    #[error("Cannot connect: node '{0}' does not exist")]
    InvalidEndpoint(NodeId),

    /// A workflow file names a node type outside the known set
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// A node config cannot be decoded into its typed record
    #[error("Invalid config for node '{node}': {message}")]
    InvalidConfig { node: NodeId, message: String },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors produced while executing one workflow step.
///
/// The display form of every variant is meant to be shown to the user as-is.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StepError {
    /// Missing or malformed argument detected before any network call
    #[error("❌ Invalid input: {0}")]
    InvalidArgument(String),

    /// The node has no upstream `pipeline_id`
    #[error("❌ Not connected! {0}")]
    NotConnected(String),

    /// A required per-type config field is absent
    #[error("❌ {0}")]
    MissingConfig(String),

    /// The remote call did not finish within the configured timeout
    #[error("❌ {operation} timed out after {timeout:?}. Is the processing service running?")]
    Timeout { operation: String, timeout: Duration },

    /// Transport failure (connection refused, DNS, reset, ...)
    #[error("❌ Network error during {operation}: {message}")]
    Network { operation: String, message: String },

    /// The service answered with a failure status
    #[error("❌ {message}")]
    Remote { status: u16, message: String },
}

impl StepError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_connected(message: impl Into<String>) -> Self {
        Self::NotConnected(message.into())
    }

    pub fn missing_config(message: impl Into<String>) -> Self {
        Self::MissingConfig(message.into())
    }

    /// Short machine-friendly name of the error category
    pub fn category(&self) -> &'static str {
        match self {
            StepError::InvalidArgument(_) => "InvalidArgument",
            StepError::NotConnected(_) => "NotConnected",
            StepError::MissingConfig(_) => "MissingConfig",
            StepError::Timeout { .. } => "Timeout",
            StepError::Network { .. } => "NetworkError",
            StepError::Remote { .. } => "RemoteError",
        }
    }
}

/// Reasons a run is rejected before any node state is touched
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Add some nodes to the workflow first!")]
    EmptyWorkflow,

    #[error("No root node found: every node has an incoming connection")]
    NoRootNodes,

    #[error("Node '{0}' does not exist")]
    UnknownNode(NodeId),

    #[error("Workflow contains a cycle through: {0:?}")]
    CyclicGraph(Vec<NodeId>),

    #[error("A workflow run is already in progress")]
    RunInProgress,
}

/// Configuration errors (bad env values)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid service URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme '{0}': expected http or https")]
    UnsupportedScheme(String),

    #[error("Invalid timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
}
