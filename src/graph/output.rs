// SPDX-License-Identifier: MIT

//! Per-step output records
//!
//! Every variant carries the `pipeline_id` (and the dataset shape when known)
//! forward, so the next node can check its own preconditions from its
//! immediate input alone.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::types::CleaningStrategy;
use crate::client::types::{DatasetInfo, ModelInfo};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutput {
    pub pipeline_id: String,
    pub dataset_info: DatasetInfo,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanOutput {
    pub pipeline_id: String,
    pub dataset_info: Option<DatasetInfo>,
    pub missing_before: HashMap<String, u64>,
    pub missing_after: HashMap<String, u64>,
    pub rows_before: u64,
    pub rows_after: u64,
    pub cleaned_columns: Vec<String>,
    pub strategy: CleaningStrategy,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessOutput {
    pub pipeline_id: String,
    pub dataset_info: Option<DatasetInfo>,
    pub processed_columns: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOutput {
    pub pipeline_id: String,
    pub dataset_info: Option<DatasetInfo>,
    pub train_size: u64,
    pub test_size: u64,
    pub features: Vec<String>,
    pub target_column: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainOutput {
    pub pipeline_id: String,
    pub dataset_info: Option<DatasetInfo>,
    pub model_type: String,
    pub task_type: String,
    pub train_score: f64,
    pub test_score: f64,
    pub metrics: Map<String, Value>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsOutput {
    pub pipeline_id: String,
    pub dataset_info: Option<DatasetInfo>,
    pub model_info: ModelInfo,
    pub visualizations: Option<Value>,
    pub preprocessing: Option<Value>,
    pub split_info: Option<Value>,
    pub message: String,
}

/// Output of a successful step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepOutput {
    Upload(UploadOutput),
    Clean(CleanOutput),
    Preprocess(PreprocessOutput),
    Split(SplitOutput),
    Train(TrainOutput),
    Results(ResultsOutput),
}

impl StepOutput {
    pub fn pipeline_id(&self) -> &str {
        match self {
            StepOutput::Upload(o) => &o.pipeline_id,
            StepOutput::Clean(o) => &o.pipeline_id,
            StepOutput::Preprocess(o) => &o.pipeline_id,
            StepOutput::Split(o) => &o.pipeline_id,
            StepOutput::Train(o) => &o.pipeline_id,
            StepOutput::Results(o) => &o.pipeline_id,
        }
    }

    pub fn dataset_info(&self) -> Option<&DatasetInfo> {
        match self {
            StepOutput::Upload(o) => Some(&o.dataset_info),
            StepOutput::Clean(o) => o.dataset_info.as_ref(),
            StepOutput::Preprocess(o) => o.dataset_info.as_ref(),
            StepOutput::Split(o) => o.dataset_info.as_ref(),
            StepOutput::Train(o) => o.dataset_info.as_ref(),
            StepOutput::Results(o) => o.dataset_info.as_ref(),
        }
    }

    /// Human-readable summary line
    pub fn message(&self) -> &str {
        match self {
            StepOutput::Upload(o) => &o.message,
            StepOutput::Clean(o) => &o.message,
            StepOutput::Preprocess(o) => &o.message,
            StepOutput::Split(o) => &o.message,
            StepOutput::Train(o) => &o.message,
            StepOutput::Results(o) => &o.message,
        }
    }

    /// Metrics of the trained model, for Train and Results outputs
    pub fn metrics(&self) -> Option<&Map<String, Value>> {
        match self {
            StepOutput::Train(o) => Some(&o.metrics),
            StepOutput::Results(o) => Some(&o.model_info.metrics),
            _ => None,
        }
    }
}
