// SPDX-License-Identifier: MIT

//! Graph model type definitions
//!
//! A node carries its type and typed config together as a `NodeKind`, so the
//! type of a node cannot change without replacing its config wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::output::StepOutput;

/// Stable node identifier (`node-0`, `node-1`, ... unless supplied by a file)
pub type NodeId = String;

/// Edge identifier, `e{source}-{target}` with a `#N` suffix if that is taken
pub type EdgeId = String;

/// The closed set of workflow step types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Upload,
    Clean,
    Preprocess,
    Split,
    Train,
    Results,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Upload,
        NodeType::Clean,
        NodeType::Preprocess,
        NodeType::Split,
        NodeType::Train,
        NodeType::Results,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Upload => "upload",
            NodeType::Clean => "clean",
            NodeType::Preprocess => "preprocess",
            NodeType::Split => "split",
            NodeType::Train => "train",
            NodeType::Results => "results",
        }
    }

    /// Parse a type name. Accepts the editor's `ml`-prefixed names too
    /// (`mlUpload`, `mlTrain`, ...).
    pub fn parse(name: &str) -> Option<NodeType> {
        let lowered = name.trim().to_ascii_lowercase();
        let bare = lowered.strip_prefix("ml").unwrap_or(&lowered);
        NodeType::ALL.into_iter().find(|t| t.as_str() == bare)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Missing-value handling strategy for the Clean step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStrategy {
    #[default]
    DropRows,
    DropColumns,
    Mean,
    Median,
    Mode,
    ForwardFill,
    Constant,
}

impl CleaningStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CleaningStrategy::DropRows => "drop_rows",
            CleaningStrategy::DropColumns => "drop_columns",
            CleaningStrategy::Mean => "mean",
            CleaningStrategy::Median => "median",
            CleaningStrategy::Mode => "mode",
            CleaningStrategy::ForwardFill => "forward_fill",
            CleaningStrategy::Constant => "constant",
        }
    }
}

/// Scaling method for the Preprocess step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    /// Z-score
    #[default]
    Standardization,
    /// Min-max
    Normalization,
}

impl ScalerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalerKind::Standardization => "standardization",
            ScalerKind::Normalization => "normalization",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Classification,
    Regression,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Classification => "classification",
            TaskKind::Regression => "regression",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    LogisticRegression,
    DecisionTree,
    RandomForest,
    LinearRegression,
    RidgeRegression,
    LassoRegression,
    DecisionTreeRegressor,
    RandomForestRegressor,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::RandomForest => "random_forest",
            ModelKind::LinearRegression => "linear_regression",
            ModelKind::RidgeRegression => "ridge_regression",
            ModelKind::LassoRegression => "lasso_regression",
            ModelKind::DecisionTreeRegressor => "decision_tree_regressor",
            ModelKind::RandomForestRegressor => "random_forest_regressor",
        }
    }

    /// The task this model solves
    pub fn task(&self) -> TaskKind {
        match self {
            ModelKind::LogisticRegression | ModelKind::DecisionTree | ModelKind::RandomForest => {
                TaskKind::Classification
            }
            _ => TaskKind::Regression,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Dataset file to upload (CSV or Excel)
    pub file: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    pub strategy: CleaningStrategy,
    /// Columns to clean; empty means all columns
    pub columns: Vec<String>,
    /// Fill value for the `constant` strategy
    pub fill_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    #[serde(alias = "scaler_type")]
    pub scaler: ScalerKind,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    #[serde(alias = "split_ratio")]
    pub ratio: f64,
    pub target_column: Option<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            ratio: 0.8,
            target_column: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    #[serde(alias = "task_type")]
    pub task: TaskKind,
    #[serde(alias = "model_type")]
    pub model: ModelKind,
}

/// A node's type together with its typed config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum NodeKind {
    Upload(UploadConfig),
    Clean(CleanConfig),
    Preprocess(PreprocessConfig),
    Split(SplitConfig),
    Train(TrainConfig),
    Results,
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Upload(_) => NodeType::Upload,
            NodeKind::Clean(_) => NodeType::Clean,
            NodeKind::Preprocess(_) => NodeType::Preprocess,
            NodeKind::Split(_) => NodeType::Split,
            NodeKind::Train(_) => NodeType::Train,
            NodeKind::Results => NodeType::Results,
        }
    }

    /// Default config for a node type
    pub fn default_for(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Upload => NodeKind::Upload(UploadConfig::default()),
            NodeType::Clean => NodeKind::Clean(CleanConfig::default()),
            NodeType::Preprocess => NodeKind::Preprocess(PreprocessConfig::default()),
            NodeType::Split => NodeKind::Split(SplitConfig::default()),
            NodeType::Train => NodeKind::Train(TrainConfig::default()),
            NodeType::Results => NodeKind::Results,
        }
    }

    /// Decode a loosely-typed config value for the given type.
    ///
    /// `null` (or a missing config) yields the type's defaults.
    pub fn from_config(
        node_type: NodeType,
        config: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        if config.is_null() {
            return Ok(Self::default_for(node_type));
        }
        Ok(match node_type {
            NodeType::Upload => NodeKind::Upload(serde_json::from_value(config)?),
            NodeType::Clean => NodeKind::Clean(serde_json::from_value(config)?),
            NodeType::Preprocess => NodeKind::Preprocess(serde_json::from_value(config)?),
            NodeType::Split => NodeKind::Split(serde_json::from_value(config)?),
            NodeType::Train => NodeKind::Train(serde_json::from_value(config)?),
            NodeType::Results => NodeKind::Results,
        })
    }
}

/// Execution status of a node.
///
/// `status` is tracked explicitly. A `Failed` node may still hold the `output`
/// of an earlier successful run; only a whole-graph reset clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeStatus::Idle => "idle",
            NodeStatus::Running => "running",
            NodeStatus::Succeeded => "succeeded",
            NodeStatus::Failed => "failed",
        };
        f.pad(s)
    }
}

/// A step in the workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Last successful result
    pub output: Option<StepOutput>,
    pub status: NodeStatus,
    /// Last failure message
    pub error: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            output: None,
            status: NodeStatus::Idle,
            error: None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }
}

/// Directed connection from `source`'s output to `target`'s input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("e{}-{}", source, target),
            source,
            target,
        }
    }
}

/// Partial update of a node's mutable fields.
///
/// `None` leaves a field untouched. For `output` and `error`, `Some(None)`
/// clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub kind: Option<NodeKind>,
    pub output: Option<Option<StepOutput>>,
    pub status: Option<NodeStatus>,
    pub error: Option<Option<String>>,
}

impl NodeUpdate {
    /// Clear output and error, back to `Idle`
    pub fn reset() -> Self {
        Self {
            output: Some(None),
            status: Some(NodeStatus::Idle),
            error: Some(None),
            ..Default::default()
        }
    }

    /// Enter `Running`, clearing the previous error
    pub fn running() -> Self {
        Self {
            status: Some(NodeStatus::Running),
            error: Some(None),
            ..Default::default()
        }
    }

    pub fn succeeded(output: StepOutput) -> Self {
        Self {
            output: Some(Some(output)),
            status: Some(NodeStatus::Succeeded),
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(NodeStatus::Failed),
            error: Some(Some(message.into())),
            ..Default::default()
        }
    }

    pub fn config(kind: NodeKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }
}
